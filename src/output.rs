use crossterm::style::Stylize;
use std::fmt::Display;

/// 色付き出力の有無を保持し、各種表示用の文字列を整形する。
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    color: bool,
}

impl Painter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn dir(&self, text: impl Display) -> String {
        if self.color {
            text.to_string().blue().bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn ok(&self, text: impl Display) -> String {
        if self.color {
            text.to_string().green().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn error(&self, text: impl Display) -> String {
        if self.color {
            text.to_string().red().to_string()
        } else {
            text.to_string()
        }
    }
}
