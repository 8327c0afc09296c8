use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::buffer::Buffer;
use crate::commands::ProcessContext;
use crate::commands::args::NoArgs;
use crate::commands::summary::TransferSummary;
use crate::error::{Error, Result};

/// 削除対象の種類。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalKind {
    File,
    RecursiveDirectory,
}

/// delete を実行する。削除できたエントリだけをバッファから外して保存する。
pub fn run(_args: NoArgs, context: &ProcessContext) -> Result<()> {
    let mut buffer = Buffer::load(&context.buffer_path)?;
    if buffer.is_empty() {
        return Err(Error::EmptySelection);
    }

    let mut summary = TransferSummary::for_buffer(&buffer);
    let result = delete_all(&mut buffer, context.config.delete.use_trash, &mut summary);

    let persisted = buffer.persist();
    println!("{}", summary.deleted_line());

    result.and(persisted)
}

/// ファイル、ディレクトリの順に削除する。最初のエラーで残りは処理しない。
pub fn delete_all(
    buffer: &mut Buffer,
    use_trash: bool,
    summary: &mut TransferSummary,
) -> Result<()> {
    let files: Vec<PathBuf> = buffer.files().iter().cloned().collect();
    for path in files {
        execute(RemovalKind::File, &path, use_trash)?;
        buffer.remove_file(&path);
        summary.files_done += 1;
    }

    let dirs: Vec<PathBuf> = buffer.dirs().iter().cloned().collect();
    for path in dirs {
        execute(RemovalKind::RecursiveDirectory, &path, use_trash)?;
        buffer.remove_dir(&path);
        summary.dirs_done += 1;
    }

    Ok(())
}

/// 処理種別に応じて実際の削除処理を実行する。
fn execute(kind: RemovalKind, path: &Path, use_trash: bool) -> Result<()> {
    debug!(?kind, path = %path.display(), use_trash, "remove");

    if use_trash {
        return trash::delete(path).map_err(|e| Error::Trash {
            path: path.to_path_buf(),
            reason: e.to_string(),
        });
    }

    let removed = match kind {
        RemovalKind::File => fs::remove_file(path),
        RemovalKind::RecursiveDirectory => fs::remove_dir_all(path),
    };
    removed.map_err(|e| Error::io("cannot remove", path, e))
}
