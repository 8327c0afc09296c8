//! Persisted selection buffer.
//!
//! The buffer is the only state shared between invocations: each command
//! builds its own [`Buffer`] from the record on disk, mutates the in-memory
//! sets, and writes the remainder back. There is no locking; the last writer
//! wins.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};

/// ディスク上の記録形式。
#[derive(Debug, Default, Serialize, Deserialize)]
struct Record {
    #[serde(default)]
    files: Vec<PathBuf>,
    #[serde(default)]
    dirs: Vec<PathBuf>,
}

/// 選択済みのファイル・ディレクトリ集合と、その保存先を保持する。
#[derive(Debug)]
pub struct Buffer {
    path: PathBuf,
    files: BTreeSet<PathBuf>,
    dirs: BTreeSet<PathBuf>,
}

impl Buffer {
    /// 保存済みの内容を読まずに空のバッファを作る。
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            files: BTreeSet::new(),
            dirs: BTreeSet::new(),
        }
    }

    /// 記録ファイルを読み込む。存在しなければ空として扱い、解析できなければ `CorruptBuffer` を返す。
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let mut buffer = Self::empty(path);

        if !buffer.path.exists() {
            debug!(path = %buffer.path.display(), "no buffer record, starting empty");
            return Ok(buffer);
        }

        let content = fs::read_to_string(&buffer.path)
            .map_err(|e| Error::io("cannot read buffer record", &buffer.path, e))?;
        let record: Record = toml::from_str(&content).map_err(|e| Error::CorruptBuffer {
            path: buffer.path.clone(),
            reason: e.to_string(),
        })?;

        buffer.files = record.files.into_iter().collect();
        buffer.dirs = record.dirs.into_iter().collect();

        if let Some(both) = buffer.files.intersection(&buffer.dirs).next() {
            return Err(Error::CorruptBuffer {
                path: buffer.path.clone(),
                reason: format!("'{}' is listed as both file and dir", both.display()),
            });
        }

        debug!(
            path = %buffer.path.display(),
            files = buffer.files.len(),
            dirs = buffer.dirs.len(),
            "loaded buffer"
        );
        Ok(buffer)
    }

    /// 現在の集合で記録ファイルを置き換える。
    ///
    /// 同じディレクトリに一時ファイルを書いてから rename するため、途中で落ちても
    /// 記録が切り詰められることはない。
    pub fn persist(&self) -> Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)
            .map_err(|e| Error::io("cannot create buffer directory", &parent, e))?;

        let record = Record {
            files: self.files.iter().cloned().collect(),
            dirs: self.dirs.iter().cloned().collect(),
        };
        let content = toml::to_string(&record).map_err(|e| Error::CorruptBuffer {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        let mut staged = tempfile::NamedTempFile::new_in(&parent)
            .map_err(|e| Error::io("cannot create temporary buffer record", &parent, e))?;
        staged
            .write_all(content.as_bytes())
            .map_err(|e| Error::io("cannot write buffer record", &self.path, e))?;
        staged
            .persist(&self.path)
            .map_err(|e| Error::io("cannot replace buffer record", &self.path, e.error))?;

        debug!(
            path = %self.path.display(),
            files = self.files.len(),
            dirs = self.dirs.len(),
            "persisted buffer"
        );
        Ok(())
    }

    /// 両方の集合を空にして保存する。
    pub fn clear(&mut self) -> Result<()> {
        self.files.clear();
        self.dirs.clear();
        self.persist()
    }

    /// 状態表示用の一行サマリーを返す。空なら空文字列。
    pub fn describe(&self) -> String {
        describe_counts(self.files.len(), self.dirs.len())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn files(&self) -> &BTreeSet<PathBuf> {
        &self.files
    }

    pub fn dirs(&self) -> &BTreeSet<PathBuf> {
        &self.dirs
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.dirs.is_empty()
    }

    /// ファイルとして登録する。同じパスがディレクトリ側にあれば取り除く。
    pub fn insert_file(&mut self, path: PathBuf) -> bool {
        self.dirs.remove(&path);
        self.files.insert(path)
    }

    /// ディレクトリとして登録する。同じパスがファイル側にあれば取り除く。
    pub fn insert_dir(&mut self, path: PathBuf) -> bool {
        self.files.remove(&path);
        self.dirs.insert(path)
    }

    pub fn remove_file(&mut self, path: &Path) -> bool {
        self.files.remove(path)
    }

    pub fn remove_dir(&mut self, path: &Path) -> bool {
        self.dirs.remove(path)
    }
}

/// 件数から "2 files and 1 dir" 形式の文字列を組み立てる。
pub fn describe_counts(files: usize, dirs: usize) -> String {
    match (files, dirs) {
        (0, 0) => String::new(),
        (f, 0) => plural(f, "file"),
        (0, d) => plural(d, "dir"),
        (f, d) => format!("{} and {}", plural(f, "file"), plural(d, "dir")),
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_record_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let buffer = Buffer::load(temp_dir.path().join("buffer.toml")).unwrap();

        assert!(buffer.is_empty());
        assert_eq!(buffer.describe(), "");
    }

    #[test]
    fn test_persist_then_load_restores_both_sets() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("buffer.toml");

        let mut buffer = Buffer::empty(&path);
        buffer.insert_file(PathBuf::from("/data/b.txt"));
        buffer.insert_file(PathBuf::from("/data/a.txt"));
        buffer.insert_dir(PathBuf::from("/data/photos"));
        buffer.persist().unwrap();

        let loaded = Buffer::load(&path).unwrap();
        assert_eq!(loaded.files(), buffer.files());
        assert_eq!(loaded.dirs(), buffer.dirs());
    }

    #[test]
    fn test_record_is_written_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("buffer.toml");

        let mut buffer = Buffer::empty(&path);
        buffer.insert_file(PathBuf::from("/z"));
        buffer.insert_file(PathBuf::from("/a"));
        buffer.persist().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let a = content.find("\"/a\"").unwrap();
        let z = content.find("\"/z\"").unwrap();
        assert!(a < z, "unsorted record: {content}");
    }

    #[test]
    fn test_load_tolerates_missing_keys() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("buffer.toml");
        fs::write(&path, "dirs = [\"/srv\"]\n").unwrap();

        let buffer = Buffer::load(&path).unwrap();
        assert!(buffer.files().is_empty());
        assert!(buffer.dirs().contains(Path::new("/srv")));
    }

    #[test]
    fn test_load_rejects_unparsable_record() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("buffer.toml");
        fs::write(&path, "files = 42\n").unwrap();

        let err = Buffer::load(&path).unwrap_err();
        assert!(matches!(err, Error::CorruptBuffer { .. }));
        // 壊れた記録はそのまま残す
        assert_eq!(fs::read_to_string(&path).unwrap(), "files = 42\n");
    }

    #[test]
    fn test_load_rejects_path_in_both_sets() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("buffer.toml");
        fs::write(&path, "files = [\"/x\"]\ndirs = [\"/x\"]\n").unwrap();

        assert!(matches!(
            Buffer::load(&path).unwrap_err(),
            Error::CorruptBuffer { .. }
        ));
    }

    #[test]
    fn test_insert_is_idempotent_and_exclusive() {
        let mut buffer = Buffer::empty("/unused");

        assert!(buffer.insert_file(PathBuf::from("/x")));
        assert!(!buffer.insert_file(PathBuf::from("/x")));
        assert_eq!(buffer.files().len(), 1);

        // 種別が変わったパスは片方の集合にだけ残る
        buffer.insert_dir(PathBuf::from("/x"));
        assert!(buffer.files().is_empty());
        assert_eq!(buffer.dirs().len(), 1);
    }

    #[test]
    fn test_clear_persists_empty_record() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("buffer.toml");

        let mut buffer = Buffer::empty(&path);
        buffer.insert_dir(PathBuf::from("/srv"));
        buffer.persist().unwrap();
        buffer.clear().unwrap();

        assert!(Buffer::load(&path).unwrap().is_empty());
    }

    #[test]
    fn test_describe_counts() {
        assert_eq!(describe_counts(0, 0), "");
        assert_eq!(describe_counts(1, 0), "1 file");
        assert_eq!(describe_counts(3, 0), "3 files");
        assert_eq!(describe_counts(0, 1), "1 dir");
        assert_eq!(describe_counts(2, 1), "2 files and 1 dir");
        assert_eq!(describe_counts(1, 4), "1 file and 4 dirs");
    }
}
