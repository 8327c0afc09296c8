use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// pathclip 全体で使う `Result` 型。
pub type Result<T> = std::result::Result<T, Error>;

/// コマンド実行中に発生しうるエラー種別。
#[derive(Error, Debug)]
pub enum Error {
    /// 引数の個数・形式がコマンドの受け付ける範囲外
    #[error("{0}")]
    Argument(String),

    #[error("cannot stat '{}': No such file or directory", .0.display())]
    NotFound(PathBuf),

    #[error("cannot select '{}': not a regular file or directory", .0.display())]
    UnsupportedType(PathBuf),

    #[error("cannot select '{}': name is not valid UTF-8", .0.display())]
    NonUtf8Path(PathBuf),

    #[error("buffer is empty")]
    EmptySelection,

    #[error("too many arguments: expected at most {max}, got {given}")]
    TooManyArguments { max: usize, given: usize },

    /// 上書き確認中に Ctrl-C / Ctrl-D が押された
    #[error("aborted")]
    Aborted,

    #[error("buffer record '{}' is corrupt: {reason}", .path.display())]
    CorruptBuffer { path: PathBuf, reason: String },

    #[error("target '{}' is not a directory", .0.display())]
    InvalidDestination(PathBuf),

    #[error("'{}' and '{}' are the same file", .from.display(), .to.display())]
    SameFile { from: PathBuf, to: PathBuf },

    #[error("cannot copy directory '{}' into itself, '{}'", .from.display(), .to.display())]
    CopyIntoSelf { from: PathBuf, to: PathBuf },

    #[error("cannot move '{}' to trash: {reason}", .path.display())]
    Trash { path: PathBuf, reason: String },

    #[error("unrecognized command '{0}'; try 'pathclip help'")]
    UnrecognizedCommand(String),

    #[error("{0}")]
    Config(String),

    #[error("could not determine home directory")]
    HomeDirUnavailable,

    #[error("{context} '{}': {source}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// パス付きの I/O エラーを組み立てる。
    pub fn io(context: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            context,
            path: path.into(),
            source,
        }
    }
}
