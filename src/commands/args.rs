use clap::Parser;
use std::ffi::OsString;

use super::CommandKind;
use crate::error::{Error, Result};

/// 引数を取らないコマンド（clear / help / list / delete）の引数。
#[derive(Parser, Debug)]
#[command(about = "Manage the pathclip buffer", long_about = None)]
pub struct NoArgs {
    #[arg(hide = true)]
    pub rest: Vec<OsString>,
}

impl NoArgs {
    /// 余分な位置引数があれば `Argument` エラーにする。
    pub fn ensure_empty(self, kind: CommandKind) -> Result<Self> {
        match self.rest.first() {
            None => Ok(self),
            Some(extra) => Err(Error::Argument(format!(
                "'{}' accepts no arguments (got '{}')",
                kind.name(),
                extra.to_string_lossy()
            ))),
        }
    }
}
