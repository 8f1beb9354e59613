use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// アプリケーション全体で使用される包括的なエラー型
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    // ドメインエラー
    #[error("Domain error: {0}")]
    Domain(#[from] domain::DomainError),

    // リクエスト・データ変換エラー
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ビジネスロジックエラー
    #[error("Resource not found: {0}")]
    NotFound(String),

    // 通信エラー
    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout occurred: {0}")]
    Timeout(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    // システムエラー
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// エラーの分類
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCategory {
    /// クライアントエラー（4xx相当）
    Client,
    /// サーバーエラー（5xx相当）
    Server,
    /// 一時的なエラー（リトライ可能）
    Transient,
}

/// エラーの重要度
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

/// リトライ戦略
#[derive(Debug, Clone, PartialEq)]
pub struct RetryStrategy {
    /// 最大試行回数（初回を含む）
    pub max_attempts: u32,
    /// 初期遅延時間
    pub initial_delay: Duration,
    /// 最大遅延時間
    pub max_delay: Duration,
    /// バックオフ倍率
    pub backoff_multiplier: f64,
    /// ジッター追加フラグ
    pub add_jitter: bool,
}

impl Default for RetryStrategy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
            add_jitter: true,
        }
    }
}

/// エラーメタデータ
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    /// エラーコード
    pub code: &'static str,
    pub category: ErrorCategory,
    pub severity: ErrorSeverity,
    /// リトライ可能フラグ
    pub retryable: bool,
}

impl ErrorMetadata {
    fn client(code: &'static str, severity: ErrorSeverity) -> Self {
        Self {
            code,
            category: ErrorCategory::Client,
            severity,
            retryable: false,
        }
    }

    fn server(code: &'static str, severity: ErrorSeverity) -> Self {
        Self {
            code,
            category: ErrorCategory::Server,
            severity,
            retryable: false,
        }
    }

    fn transient(code: &'static str) -> Self {
        Self {
            code,
            category: ErrorCategory::Transient,
            severity: ErrorSeverity::Warning,
            retryable: true,
        }
    }
}

impl AppError {
    /// エラーメタデータを取得
    pub fn metadata(&self) -> ErrorMetadata {
        match self {
            AppError::Domain(_) => ErrorMetadata::client("DOMAIN_ERROR", ErrorSeverity::Error),
            AppError::Validation(_) => {
                ErrorMetadata::client("VALIDATION_ERROR", ErrorSeverity::Info)
            }
            AppError::Deserialization(_) => {
                ErrorMetadata::client("DESERIALIZATION_ERROR", ErrorSeverity::Warning)
            }
            AppError::NotFound(_) => ErrorMetadata::client("NOT_FOUND", ErrorSeverity::Info),
            AppError::Serialization(_) => {
                ErrorMetadata::server("SERIALIZATION_ERROR", ErrorSeverity::Error)
            }
            AppError::Configuration(_) => {
                ErrorMetadata::server("CONFIGURATION_ERROR", ErrorSeverity::Critical)
            }
            AppError::Internal(_) => {
                ErrorMetadata::server("INTERNAL_ERROR", ErrorSeverity::Critical)
            }
            AppError::Network(_) => ErrorMetadata::transient("NETWORK_ERROR"),
            AppError::Timeout(_) => ErrorMetadata::transient("TIMEOUT"),
            AppError::ServiceUnavailable(_) => ErrorMetadata::transient("SERVICE_UNAVAILABLE"),
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.metadata().retryable
    }

    /// HTTPステータスコードを取得
    pub fn http_status_code(&self) -> u16 {
        match self {
            AppError::NotFound(_) => 404,
            AppError::Domain(_) | AppError::Validation(_) | AppError::Deserialization(_) => 400,
            AppError::ServiceUnavailable(_) => 503,
            AppError::Timeout(_) => 504,
            AppError::Network(_) => 502,
            AppError::Serialization(_) | AppError::Configuration(_) | AppError::Internal(_) => 500,
        }
    }

    /// ユーザー向けメッセージを取得
    pub fn user_message(&self) -> String {
        match self {
            AppError::NotFound(_) => "The card no longer exists".to_string(),
            AppError::Domain(_) | AppError::Validation(_) | AppError::Deserialization(_) => {
                "The request was invalid".to_string()
            }
            AppError::Network(_) | AppError::ServiceUnavailable(_) => {
                "The server could not be reached. Please try again".to_string()
            }
            AppError::Timeout(_) => "The server took too long to respond".to_string(),
            _ => "An unexpected error occurred".to_string(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Deserialization(e.to_string())
    }
}

/// HTTP で返すエラーボディ `{ "error": ..., "code": ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    /// AppErrorからErrorResponseを作成
    /// 500 系は内部の詳細を外に出さない
    pub fn from_app_error(error: &AppError) -> Self {
        let metadata = error.metadata();
        let message = match metadata.category {
            ErrorCategory::Server => error.user_message(),
            _ => error.to_string(),
        };

        Self {
            error: message,
            code: Some(metadata.code.to_string()),
        }
    }

    pub fn to_json(&self) -> Result<String, AppError> {
        serde_json::to_string(self).map_err(|e| AppError::Serialization(e.to_string()))
    }
}
