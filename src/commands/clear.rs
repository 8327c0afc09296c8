use tracing::warn;

use crate::buffer::Buffer;
use crate::commands::ProcessContext;
use crate::commands::args::NoArgs;
use crate::error::{Error, Result};

/// バッファを空にし、空にした内容を表示する。もともと空なら何も表示しない。
///
/// 記録が壊れていても消去は行う。
pub fn run(_args: NoArgs, context: &ProcessContext) -> Result<()> {
    let previous = match Buffer::load(&context.buffer_path) {
        Ok(buffer) => buffer.describe(),
        Err(Error::CorruptBuffer { path, reason }) => {
            warn!(path = %path.display(), %reason, "discarding corrupt buffer record");
            String::new()
        }
        Err(e) => return Err(e),
    };

    Buffer::empty(&context.buffer_path).persist()?;

    if !previous.is_empty() {
        println!("Cleared {previous}");
    }
    Ok(())
}
