use crate::buffer::Buffer;
use crate::commands::ProcessContext;
use crate::commands::args::NoArgs;
use crate::error::Result;

/// バッファの内容をディレクトリ、ファイルの順に表示する。
pub fn run(_args: NoArgs, context: &ProcessContext) -> Result<()> {
    let buffer = Buffer::load(&context.buffer_path)?;
    for line in render(&buffer, context) {
        println!("{line}");
    }
    Ok(())
}

fn render(buffer: &Buffer, context: &ProcessContext) -> Vec<String> {
    if buffer.is_empty() {
        return vec!["buffer is empty".to_string()];
    }

    buffer
        .dirs()
        .iter()
        .map(|dir| context.painter.dir(dir.display()))
        .chain(buffer.files().iter().map(|file| file.display().to_string()))
        .chain(std::iter::once(buffer.describe()))
        .collect()
}
