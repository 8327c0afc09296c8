use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../../config.example.toml");

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub buffer: BufferConfig,
    pub delete: DeleteConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteConfig {
    pub use_trash: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

impl Config {
    /// 設定ファイルを読み込み、実行時の設定を構築する。
    ///
    /// # 判定ルール
    /// 1. `PATHCLIP_CONFIG_PATH` または `~/.config/pathclip/config.toml` を使用
    /// 2. 設定ファイルが存在しない場合はデフォルト設定を作成
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|e| Error::io("failed to read config file", &config_path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config file: {e}")))?;
        config.validate()?;

        Ok(config)
    }

    /// 読み込んだ設定値の整合性を検証する。
    ///
    /// `buffer.path` には絶対パスのみを許可する。
    fn validate(&self) -> Result<()> {
        match &self.buffer.path {
            Some(path) if !path.is_absolute() => Err(Error::Config(format!(
                "invalid config: buffer.path must be an absolute path: {}",
                path.display()
            ))),
            _ => Ok(()),
        }
    }

    /// バッファ記録ファイルの配置先を決定する。
    ///
    /// # Priority
    /// 1. PATHCLIP_BUFFER_PATH environment variable
    /// 2. `buffer.path` in the config file
    /// 3. ~/.config/pathclip/buffer.toml
    pub fn buffer_path(&self) -> Result<PathBuf> {
        if let Ok(path) = std::env::var("PATHCLIP_BUFFER_PATH") {
            return Ok(PathBuf::from(path));
        }

        if let Some(path) = &self.buffer.path {
            return Ok(path.clone());
        }

        Ok(Self::config_dir()?.join("buffer.toml"))
    }

    /// 色付き出力を使うかどうか。`NO_COLOR` が設定されていれば常に無効。
    pub fn color_enabled(&self) -> bool {
        self.output.color && std::env::var_os("NO_COLOR").is_none()
    }

    /// Determines the path to the configuration file.
    ///
    /// # Priority
    /// 1. PATHCLIP_CONFIG_PATH environment variable (for testing and custom setups)
    /// 2. ~/.config/pathclip/config.toml (default location)
    fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("PATHCLIP_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        Ok(Self::config_dir()?.join("config.toml"))
    }

    fn config_dir() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().ok_or(Error::HomeDirUnavailable)?;
        Ok(home_dir.join(".config").join("pathclip"))
    }

    /// デフォルト設定ファイルを作成する。
    fn create_default_config(config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::io("failed to create config directory", parent, e))?;
        }

        fs::write(config_path, DEFAULT_CONFIG_TEMPLATE)
            .map_err(|e| Error::io("failed to write default config", config_path, e))
    }
}
