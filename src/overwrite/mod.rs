//! Interactive overwrite confirmation used while pasting.

use chrono::{DateTime, Local};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Stylize;
use crossterm::terminal;
use std::fs;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};

/// 上書き衝突に対する回答。大文字キーの回答は以降の衝突にも適用される。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwriteMode {
    ProceedOnce,
    SkipOnce,
    ProceedAlways,
    SkipAlways,
}

impl OverwriteMode {
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            'y' => Some(Self::ProceedOnce),
            'n' => Some(Self::SkipOnce),
            'Y' => Some(Self::ProceedAlways),
            'N' => Some(Self::SkipAlways),
            _ => None,
        }
    }

    pub fn key(self) -> char {
        match self {
            Self::ProceedOnce => 'y',
            Self::SkipOnce => 'n',
            Self::ProceedAlways => 'Y',
            Self::SkipAlways => 'N',
        }
    }

    /// 以降の衝突で再確認しない回答かどうか。
    pub fn is_sticky(self) -> bool {
        matches!(self, Self::ProceedAlways | Self::SkipAlways)
    }

    pub fn proceeds(self) -> bool {
        matches!(self, Self::ProceedOnce | Self::ProceedAlways)
    }
}

/// プロンプトで受け取った 1 打鍵。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Interrupt,
}

/// 打鍵の取得元。
pub trait KeySource {
    fn read_key(&mut self) -> Result<Key>;
}

/// raw モードの有効期間を表す。drop 時に必ず元の入力モードへ戻す。
pub struct RawModeGuard {
    _private: (),
}

impl RawModeGuard {
    pub fn acquire() -> Result<Self> {
        terminal::enable_raw_mode().map_err(|e| Error::io("cannot enable raw mode on", "stdin", e))?;
        Ok(Self { _private: () })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// 端末から raw モードで 1 文字ずつ読む。
pub struct TerminalKeys;

impl KeySource for TerminalKeys {
    fn read_key(&mut self) -> Result<Key> {
        let _raw = RawModeGuard::acquire()?;

        loop {
            let ev = event::read().map_err(|e| Error::io("cannot read keystroke from", "stdin", e))?;
            let Event::Key(KeyEvent {
                code,
                modifiers,
                kind,
                ..
            }) = ev
            else {
                continue;
            };
            if kind != KeyEventKind::Press {
                continue;
            }

            match code {
                KeyCode::Char('c') | KeyCode::Char('d')
                    if modifiers.contains(KeyModifiers::CONTROL) =>
                {
                    return Ok(Key::Interrupt);
                }
                KeyCode::Char(c) => return Ok(Key::Char(c)),
                _ => {}
            }
        }
    }
}

/// 端末でない入力（パイプ等）から行単位で回答を読む。EOF は中断扱い。
pub struct LineKeys<R> {
    reader: R,
}

impl<R: BufRead> LineKeys<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> KeySource for LineKeys<R> {
    fn read_key(&mut self) -> Result<Key> {
        loop {
            let mut line = String::new();
            let read = self
                .reader
                .read_line(&mut line)
                .map_err(|e| Error::io("cannot read answer from", "stdin", e))?;
            if read == 0 {
                return Ok(Key::Interrupt);
            }

            match line.trim().chars().next() {
                Some('\u{3}') | Some('\u{4}') => return Ok(Key::Interrupt),
                Some(c) => return Ok(Key::Char(c)),
                None => continue,
            }
        }
    }
}

/// 標準入力に応じた打鍵の取得元を選ぶ。
pub fn stdin_keys() -> Box<dyn KeySource> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        Box::new(TerminalKeys)
    } else {
        Box::new(LineKeys::new(stdin.lock()))
    }
}

/// 転送先の衝突ごとに上書き可否を判断し、"always" 系の回答を実行中保持する。
pub struct OverwriteResolver {
    keys: Box<dyn KeySource>,
    out: Box<dyn Write>,
    mode: Option<OverwriteMode>,
    color: bool,
}

impl OverwriteResolver {
    pub fn new(keys: Box<dyn KeySource>, out: Box<dyn Write>, color: bool) -> Self {
        Self {
            keys,
            out,
            mode: None,
            color,
        }
    }

    /// 対話端末（またはパイプされた標準入力）を相手にするリゾルバを作る。
    pub fn interactive(color: bool) -> Self {
        Self::new(stdin_keys(), Box::new(io::stderr()), color)
    }

    pub fn mode(&self) -> Option<OverwriteMode> {
        self.mode
    }

    /// 既存の `destination` を `source` で上書きしてよいかを決める。
    pub fn resolve(&mut self, source: &Path, destination: PathBuf) -> Result<(PathBuf, bool)> {
        if let Some(mode) = self.mode.filter(|m| m.is_sticky()) {
            debug!(destination = %destination.display(), ?mode, "sticky overwrite decision");
            return Ok((destination, mode.proceeds()));
        }

        self.show_comparison(source, &destination)?;

        let mode = loop {
            self.write_prompt("[y]es, [n]o, [Y]es to all, [N]o to all: ")?;
            match self.keys.read_key()? {
                Key::Interrupt => {
                    self.write_prompt("\n")?;
                    return Err(Error::Aborted);
                }
                Key::Char(c) => match OverwriteMode::from_key(c) {
                    Some(mode) => break mode,
                    None => self.write_prompt("\n")?,
                },
            }
        };
        self.write_prompt(&format!("{}\n", mode.key()))?;

        debug!(destination = %destination.display(), ?mode, "overwrite decision");
        self.mode = Some(mode);
        Ok((destination, mode.proceeds()))
    }

    fn show_comparison(&mut self, source: &Path, destination: &Path) -> Result<()> {
        // 宛先はリンク自体を見る。リンク切れでも確認は出す
        let src = stat(fs::metadata(source), source);
        let dst = stat(fs::symlink_metadata(destination), destination);
        let src_time = src.as_ref().and_then(|m| m.modified().ok());
        let dst_time = dst.as_ref().and_then(|m| m.modified().ok());

        let src_line = format_stamp(src_time, src.as_ref().map(fs::Metadata::len));
        let dst_line = format_stamp(dst_time, dst.as_ref().map(fs::Metadata::len));
        let (src_line, dst_line) = match (self.color, src_time, dst_time) {
            (true, Some(s), Some(d)) if s > d => (src_line.bold().to_string(), dst_line),
            (true, Some(s), Some(d)) if d > s => (src_line, dst_line.bold().to_string()),
            _ => (src_line, dst_line),
        };

        let header = format!("overwrite '{}'?", destination.display());
        let header = if self.color {
            header.yellow().to_string()
        } else {
            header
        };
        self.write_prompt(&format!(
            "{header}\n  source: {src_line}\n  target: {dst_line}\n"
        ))
    }

    fn write_prompt(&mut self, text: &str) -> Result<()> {
        self.out
            .write_all(text.as_bytes())
            .and_then(|_| self.out.flush())
            .map_err(|e| Error::io("cannot write prompt to", "stderr", e))
    }
}

fn stat(meta: io::Result<fs::Metadata>, path: &Path) -> Option<fs::Metadata> {
    meta.map_err(|e| debug!(path = %path.display(), error = %e, "cannot stat for comparison"))
        .ok()
}

fn format_stamp(modified: Option<std::time::SystemTime>, len: Option<u64>) -> String {
    let time = match modified {
        Some(t) => DateTime::<Local>::from(t)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => "unknown time".to_string(),
    };
    match len {
        Some(len) => format!("{time}  {len} bytes"),
        None => format!("{time}  unknown size"),
    }
}

/// テスト用に決められた打鍵列を返す。
#[cfg(test)]
pub(crate) struct ScriptedKeys {
    keys: std::collections::VecDeque<Key>,
}

#[cfg(test)]
impl ScriptedKeys {
    pub(crate) fn new(keys: impl IntoIterator<Item = Key>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    pub(crate) fn chars(s: &str) -> Self {
        Self::new(s.chars().map(Key::Char))
    }
}

#[cfg(test)]
impl KeySource for ScriptedKeys {
    fn read_key(&mut self) -> Result<Key> {
        Ok(self.keys.pop_front().unwrap_or(Key::Interrupt))
    }
}
