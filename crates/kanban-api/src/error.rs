use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::DomainError;
use infrastructure::RepositoryError;
use shared::{AppError, ErrorResponse, ErrorSeverity};
use tracing::Level;

/// ハンドラが返すエラー
///
/// `AppError` をそのまま包み、ステータスコードと `{ "error": ... }` ボディに変換する。
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// 重要度に応じたログレベル
fn log_level(severity: &ErrorSeverity) -> Level {
    match severity {
        ErrorSeverity::Info => Level::INFO,
        ErrorSeverity::Warning => Level::WARN,
        ErrorSeverity::Error | ErrorSeverity::Critical => Level::ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status().as_u16();
        let metadata = self.0.metadata();
        let level = log_level(&metadata.severity);
        if level == Level::INFO {
            tracing::info!(status, code = metadata.code, error = %self.0, "Request rejected");
        } else if level == Level::WARN {
            tracing::warn!(status, code = metadata.code, error = %self.0, "Request failed");
        } else {
            tracing::error!(status, code = metadata.code, error = %self.0, "Request failed");
        }

        (self.status(), Json(ErrorResponse::from_app_error(&self.0))).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(e: AppError) -> Self {
        ApiError(e)
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        ApiError(AppError::Domain(e))
    }
}

impl From<RepositoryError> for ApiError {
    fn from(e: RepositoryError) -> Self {
        ApiError(e.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(AppError::Validation(rejection.body_text()))
    }
}
