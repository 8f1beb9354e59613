use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::errors::AppError;

/// ログ出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            other => Err(AppError::Configuration(format!(
                "unknown log format: {other}"
            ))),
        }
    }
}

/// サーバ設定
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// API 以外のパスで配信する静的ファイルのディレクトリ
    pub static_dir: PathBuf,
    /// 起動時にデモ用カードを投入するか
    pub seed_demo_cards: bool,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            static_dir: PathBuf::from("public"),
            seed_demo_cards: true,
            log_format: LogFormat::Json,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 任意のキー参照関数から設定を構築（テスト用に環境変数を差し替え可能）
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Config::default();
        Ok(Config {
            host: lookup("KANBAN_HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "PORT", defaults.port)?,
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            seed_demo_cards: parse_flag(&lookup, "SEED_DEMO_CARDS", defaults.seed_demo_cards)?,
            log_format: parse_var(&lookup, "LOG_FORMAT", defaults.log_format)?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 値があればパースし、なければ既定値を返す
pub fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, AppError>
where
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Configuration(format!("invalid value for {key}: {raw}"))),
        None => Ok(default),
    }
}

/// 真偽値フラグ（1/0, true/false, yes/no, on/off）
pub fn parse_flag(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: bool,
) -> Result<bool, AppError> {
    match lookup(key) {
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(AppError::Configuration(format!(
                "invalid value for {key}: {raw}"
            ))),
        },
        None => Ok(default),
    }
}
