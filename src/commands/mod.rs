pub mod add;
pub mod args;
pub mod clear;
pub mod delete;
pub mod help;
pub mod list;
pub mod paste;
pub mod summary;

use clap::Parser;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::Painter;
use args::NoArgs;

/// argv[0] がこの名前のときは最初の引数でコマンドを選ぶ。
pub const MULTICALL_NAME: &str = "pathclip";

/// 起動名で選ばれる操作。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Add,
    AddFresh,
    Paste,
    PasteClear,
    Clear,
    Help,
    List,
    Delete,
}

impl CommandKind {
    pub const ALL: [Self; 8] = [
        Self::Add,
        Self::AddFresh,
        Self::Paste,
        Self::PasteClear,
        Self::Clear,
        Self::Help,
        Self::List,
        Self::Delete,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "add" => Some(Self::Add),
            "add-fresh" => Some(Self::AddFresh),
            "paste" => Some(Self::Paste),
            "paste-clear" => Some(Self::PasteClear),
            "clear" => Some(Self::Clear),
            "help" => Some(Self::Help),
            "list" => Some(Self::List),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::AddFresh => "add-fresh",
            Self::Paste => "paste",
            Self::PasteClear => "paste-clear",
            Self::Clear => "clear",
            Self::Help => "help",
            Self::List => "list",
            Self::Delete => "delete",
        }
    }

    /// 設定とバッファの場所を必要とするか。help は設定を読まずに実行する。
    pub fn needs_context(self) -> bool {
        !matches!(self, Self::Help)
    }

    /// help に表示する引数の書式と説明。
    pub fn usage(self) -> (&'static str, &'static str) {
        match self {
            Self::Add => ("[PATH]...", "add paths to the buffer (default: current directory)"),
            Self::AddFresh => ("[PATH]...", "replace the buffer with the given paths"),
            Self::Paste => ("[DIR]", "copy buffered paths into DIR, dropping copied entries"),
            Self::PasteClear => ("[DIR]", "paste, then clear the whole buffer"),
            Self::Clear => ("", "empty the buffer"),
            Self::Help => ("", "show this help"),
            Self::List => ("", "show buffered directories and files"),
            Self::Delete => ("", "delete buffered paths from the filesystem"),
        }
    }
}

/// 起動名と残りの引数。
#[derive(Debug, PartialEq, Eq)]
pub struct Invocation {
    pub kind: CommandKind,
    pub args: Vec<OsString>,
}

impl Invocation {
    /// argv から実行するコマンドを決定する。
    ///
    /// # 判定ルール
    /// 1. argv[0] のファイル名（拡張子なし）をコマンド名として扱う
    /// 2. それが `pathclip` なら最初の引数をコマンド名とする（引数なしは help）
    pub fn from_args(argv: impl IntoIterator<Item = OsString>) -> Result<Self> {
        let mut argv = argv.into_iter();
        let program = argv.next().unwrap_or_default();
        let name = Path::new(&program)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut args: Vec<OsString> = argv.collect();

        if name != MULTICALL_NAME {
            return CommandKind::from_name(&name)
                .map(|kind| Self { kind, args })
                .ok_or(Error::UnrecognizedCommand(name));
        }

        if args.is_empty() {
            return Ok(Self {
                kind: CommandKind::Help,
                args,
            });
        }

        let sub = args.remove(0).to_string_lossy().into_owned();
        let kind = match sub.as_str() {
            "-h" | "--help" => Some(CommandKind::Help),
            other => CommandKind::from_name(other),
        };
        kind.map(|kind| Self { kind, args })
            .ok_or(Error::UnrecognizedCommand(sub))
    }
}

/// コマンド実行に必要な設定と出力方法をまとめたコンテキスト。
pub struct ProcessContext {
    pub config: Config,
    pub buffer_path: PathBuf,
    pub painter: Painter,
}

impl ProcessContext {
    pub fn new(config: Config) -> Result<Self> {
        let buffer_path = config.buffer_path()?;
        let painter = Painter::new(config.color_enabled());
        Ok(Self {
            config,
            buffer_path,
            painter,
        })
    }

    #[cfg(test)]
    pub(crate) fn for_test(buffer_path: PathBuf) -> Self {
        Self {
            config: Config::default(),
            buffer_path,
            painter: Painter::new(false),
        }
    }
}

/// 設定を読まずに実行できるコマンドを実行する。該当しなければ `None`。
pub fn run_without_context(invocation: &Invocation) -> Option<Result<()>> {
    if invocation.kind.needs_context() {
        return None;
    }
    let argv = std::iter::once(OsString::from(invocation.kind.name()))
        .chain(invocation.args.iter().cloned());
    Some(NoArgs::parse_from(argv).ensure_empty(invocation.kind).and_then(help::run))
}

/// 選ばれたコマンドの引数を解析して実行する。
pub fn run(invocation: Invocation, context: &ProcessContext) -> Result<()> {
    if let Some(result) = run_without_context(&invocation) {
        return result;
    }

    let Invocation { kind, args } = invocation;
    let argv = std::iter::once(OsString::from(kind.name())).chain(args);

    match kind {
        CommandKind::Add => add::run(add::args::Args::parse_from(argv), false, context),
        CommandKind::AddFresh => add::run(add::args::Args::parse_from(argv), true, context),
        CommandKind::Paste => paste::run(paste::args::Args::parse_from(argv), false, context),
        CommandKind::PasteClear => paste::run(paste::args::Args::parse_from(argv), true, context),
        CommandKind::Clear => clear::run(NoArgs::parse_from(argv).ensure_empty(kind)?, context),
        CommandKind::Help => help::run(NoArgs::parse_from(argv).ensure_empty(kind)?),
        CommandKind::List => list::run(NoArgs::parse_from(argv).ensure_empty(kind)?, context),
        CommandKind::Delete => delete::run(NoArgs::parse_from(argv).ensure_empty(kind)?, context),
    }
}
