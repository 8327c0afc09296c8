use filetime::FileTime;
use std::fs;
#[cfg(unix)]
use std::os::unix::fs::MetadataExt;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// コピー対象の種別。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyKind {
    File,
    Directory,
}

/// 種別に応じたコピーを行う。
pub fn execute(kind: CopyKind, source: &Path, target: &Path) -> Result<()> {
    debug!(?kind, source = %source.display(), target = %target.display(), "copy");
    match kind {
        CopyKind::File => {
            ensure_not_same_file(source, target)?;
            unlink_symlink(target)?;
            copy_file(source, target)
        }
        CopyKind::Directory => {
            if target.starts_with(source) {
                return Err(Error::CopyIntoSelf {
                    from: source.to_path_buf(),
                    to: target.to_path_buf(),
                });
            }
            copy_dir_recursive(source, target)
        }
    }
}

/// 内容・パーミッション・タイムスタンプを保ってファイルをコピーする。
fn copy_file(source: &Path, target: &Path) -> Result<()> {
    fs::copy(source, target).map_err(|e| Error::io("cannot copy to", target, e))?;
    copy_times(source, target)
}

fn copy_times(source: &Path, target: &Path) -> Result<()> {
    let meta = fs::metadata(source).map_err(|e| Error::io("cannot stat", source, e))?;
    let atime = FileTime::from_last_access_time(&meta);
    let mtime = FileTime::from_last_modification_time(&meta);
    filetime::set_file_times(target, atime, mtime)
        .map_err(|e| Error::io("cannot set timestamps on", target, e))
}

/// ディレクトリを再帰的に走査し、配下を同構造でコピーする。
///
/// シンボリックリンクは辿らずリンクとして作り直す。`target` が既に存在する場合は
/// マージせず `AlreadyExists` で失敗する。
fn copy_dir_recursive(source: &Path, target: &Path) -> Result<()> {
    fs::create_dir(target).map_err(|e| Error::io("cannot create directory", target, e))?;

    let entries =
        fs::read_dir(source).map_err(|e| Error::io("cannot read directory", source, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| Error::io("error reading directory", source, e))?;
        let entry_path = entry.path();
        let target_path = target.join(entry.file_name());
        let file_type = entry
            .file_type()
            .map_err(|e| Error::io("cannot stat", &entry_path, e))?;

        if file_type.is_symlink() {
            copy_symlink(&entry_path, &target_path)?;
        } else if file_type.is_dir() {
            copy_dir_recursive(&entry_path, &target_path)?;
        } else if file_type.is_file() {
            copy_file(&entry_path, &target_path)?;
        } else {
            warn!(path = %entry_path.display(), "skipping special file");
        }
    }

    let meta = fs::metadata(source).map_err(|e| Error::io("cannot stat", source, e))?;
    fs::set_permissions(target, meta.permissions())
        .map_err(|e| Error::io("cannot set permissions on", target, e))?;
    copy_times(source, target)
}

fn copy_symlink(source: &Path, target: &Path) -> Result<()> {
    let link = fs::read_link(source).map_err(|e| Error::io("cannot read link", source, e))?;

    #[cfg(unix)]
    let created = std::os::unix::fs::symlink(&link, target);

    #[cfg(windows)]
    let created = if source.is_dir() {
        std::os::windows::fs::symlink_dir(&link, target)
    } else {
        std::os::windows::fs::symlink_file(&link, target)
    };

    created.map_err(|e| Error::io("cannot create symlink", target, e))
}

/// 上書き先がシンボリックリンクならリンク自体を消す。リンク先へは書き込まない。
fn unlink_symlink(target: &Path) -> Result<()> {
    match fs::symlink_metadata(target) {
        Ok(meta) if meta.file_type().is_symlink() => {
            fs::remove_file(target).map_err(|e| Error::io("cannot remove", target, e))
        }
        _ => Ok(()),
    }
}

/// コピー元と先が同一実体ならエラーにする（fs::copy は自分自身を切り詰めてしまう）。
fn ensure_not_same_file(source: &Path, target: &Path) -> Result<()> {
    let target_meta = match fs::metadata(target) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(Error::io("cannot access", target, e)),
    };
    let source_meta = fs::metadata(source).map_err(|e| Error::io("cannot access", source, e))?;

    #[cfg(unix)]
    let same = source_meta.dev() == target_meta.dev() && source_meta.ino() == target_meta.ino();

    #[cfg(not(unix))]
    let same = {
        let _ = (&source_meta, &target_meta);
        source.canonicalize().ok() == target.canonicalize().ok()
    };

    if same {
        return Err(Error::SameFile {
            from: source.to_path_buf(),
            to: target.to_path_buf(),
        });
    }
    Ok(())
}
