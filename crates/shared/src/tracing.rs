use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogFormat;

/// トレーシングサブスクライバーを初期化
/// RUST_LOG が未設定なら info レベルで出力する
pub fn init_tracing(format: LogFormat) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        // 構造化ログ（JSON）
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().with_target(false).json())
            .try_init()?,
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init()?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_reports_error_instead_of_panicking() {
        // グローバルサブスクライバーは一度しか設定できない
        let _ = init_tracing(LogFormat::Pretty);
        assert!(init_tracing(LogFormat::Json).is_err());
    }
}
