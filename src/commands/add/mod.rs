use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::buffer::Buffer;
use crate::commands::ProcessContext;
use crate::error::{Error, Result};

pub mod args;

use args::Args;

/// 選択対象の種別。
#[derive(Debug, PartialEq, Eq)]
pub enum Selection {
    File(PathBuf),
    Dir(PathBuf),
}

/// add / add-fresh を実行する。
///
/// `fresh` のときは保存済みの内容を読まずに上書きする。途中の引数でエラーになった場合は
/// 何も保存しない。
pub fn run(args: Args, fresh: bool, context: &ProcessContext) -> Result<()> {
    let mut buffer = if fresh {
        Buffer::empty(&context.buffer_path)
    } else {
        Buffer::load(&context.buffer_path)?
    };

    let paths = if args.paths.is_empty() {
        let cwd = std::env::current_dir()
            .map_err(|e| Error::io("cannot access current directory", ".", e))?;
        vec![cwd]
    } else {
        args.paths
    };

    for path in &paths {
        let selection = select(path)?;
        let name = match &selection {
            Selection::File(p) => display_name(p),
            Selection::Dir(p) => context.painter.dir(display_name(p)),
        };
        println!("{}", context.painter.ok(name));

        match selection {
            Selection::File(p) => buffer.insert_file(p),
            Selection::Dir(p) => buffer.insert_dir(p),
        };
    }

    buffer.persist()?;
    println!("Selected: {}", buffer.describe());
    Ok(())
}

/// パスを実体の絶対パスへ解決し、ファイルかディレクトリかを判定する。
pub fn select(path: &Path) -> Result<Selection> {
    let canonical = path.canonicalize().map_err(|e| match e.kind() {
        ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
        _ => Error::io("cannot access", path, e),
    })?;
    // 記録は TOML なので UTF-8 で表せないパスは保存できない
    if canonical.to_str().is_none() {
        return Err(Error::NonUtf8Path(canonical));
    }
    let meta = fs::metadata(&canonical).map_err(|e| Error::io("cannot stat", &canonical, e))?;

    debug!(path = %canonical.display(), is_dir = meta.is_dir(), "resolved selection");
    if meta.is_file() {
        Ok(Selection::File(canonical))
    } else if meta.is_dir() {
        Ok(Selection::Dir(canonical))
    } else {
        Err(Error::UnsupportedType(canonical))
    }
}

/// 確認表示用の名前。ルートのように名前を持たないパスはそのまま表示する。
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
