//! カード API クライアント
//!
//! ボードはサーバとのやり取りを [`CardApi`] 越しにのみ行う。
//! HTTP 実装は一時的なエラー（通信失敗・タイムアウト・5xx）を指数バックオフで再試行する。

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use domain::{Card, CardId, CardPatch, NewCard};
use serde::de::DeserializeOwned;
use reqwest::Url;
use serde::Deserialize;
use shared::{parse_var, AppError, ErrorResponse, RetryExecutor, RetryStrategy};
use tracing::debug;

/// ボードから見たカード API
#[async_trait]
pub trait CardApi: Send + Sync {
    /// GET /api/cards
    async fn list(&self) -> Result<Vec<Card>, AppError>;
    /// POST /api/cards
    async fn create(&self, new_card: &NewCard) -> Result<Card, AppError>;
    /// PATCH /api/cards/:id
    async fn patch(&self, id: &CardId, patch: &CardPatch) -> Result<Card, AppError>;
    /// DELETE /api/cards/:id
    async fn delete(&self, id: &CardId) -> Result<(), AppError>;
}

/// クライアント設定
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// 1リクエストあたりのタイムアウト
    pub timeout: Duration,
    pub retry: RetryStrategy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            timeout: Duration::from_secs(10),
            retry: RetryStrategy::default(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();
        let timeout_ms = parse_var(
            &lookup,
            "KANBAN_CLIENT_TIMEOUT_MS",
            defaults.timeout.as_millis() as u64,
        )?;
        let max_attempts = parse_var(
            &lookup,
            "KANBAN_CLIENT_MAX_ATTEMPTS",
            defaults.retry.max_attempts,
        )?;

        Ok(Self {
            base_url: lookup("KANBAN_API_URL").unwrap_or(defaults.base_url),
            timeout: Duration::from_millis(timeout_ms),
            retry: RetryStrategy {
                max_attempts,
                ..defaults.retry
            },
        })
    }
}

/// reqwest による [`CardApi`] 実装
///
/// GET / PATCH / DELETE は冪等なので再試行する。POST は再送すると
/// サーバ側でカードが重複するため1回だけ送る。
#[derive(Debug, Clone)]
pub struct HttpCardApi {
    client: reqwest::Client,
    base_url: String,
    cards_url: Url,
    retry: RetryExecutor,
    create_retry: RetryExecutor,
}

#[derive(Debug, Deserialize)]
struct DeleteAck {
    success: bool,
}

impl HttpCardApi {
    pub fn new(config: ClientConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("failed to build HTTP client: {e}")))?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        let cards_url = Url::parse(&format!("{base_url}/api/cards"))
            .map_err(|e| AppError::Configuration(format!("invalid API URL {base_url}: {e}")))?;
        if cards_url.cannot_be_a_base() {
            return Err(AppError::Configuration(format!("invalid API URL {base_url}")));
        }

        Ok(Self {
            client,
            base_url,
            cards_url,
            retry: RetryExecutor::new(config.retry),
            create_retry: RetryExecutor::no_retry(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn cards_url(&self) -> &Url {
        &self.cards_url
    }

    /// カードIDは1つのパスセグメントとしてエンコードする
    fn card_url(&self, id: &CardId) -> Result<Url, AppError> {
        let mut url = self.cards_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Configuration(format!("invalid API URL {}", self.base_url)))?
            .push(id.as_str());
        Ok(url)
    }
}

#[async_trait]
impl CardApi for HttpCardApi {
    async fn list(&self) -> Result<Vec<Card>, AppError> {
        let client = &self.client;
        let url = self.cards_url().as_str();
        debug!(%url, "GET cards");

        self.retry
            .execute(move || async move { decode(send(client.get(url)).await?).await })
            .await
            .into_result()
    }

    async fn create(&self, new_card: &NewCard) -> Result<Card, AppError> {
        let client = &self.client;
        let url = self.cards_url().as_str();
        debug!(%url, title = %new_card.title, "POST card");

        self.create_retry
            .execute(move || async move {
                decode(send(client.post(url).json(new_card)).await?).await
            })
            .await
            .into_result()
    }

    async fn patch(&self, id: &CardId, patch: &CardPatch) -> Result<Card, AppError> {
        let client = &self.client;
        let url = self.card_url(id)?;
        let url = url.as_str();
        debug!(%url, "PATCH card");

        self.retry
            .execute(move || async move {
                decode(send(client.patch(url).json(patch)).await?).await
            })
            .await
            .into_result()
    }

    async fn delete(&self, id: &CardId) -> Result<(), AppError> {
        let client = &self.client;
        let url = self.card_url(id)?;
        let url = url.as_str();
        debug!(%url, "DELETE card");

        let ack: DeleteAck = self
            .retry
            .execute(move || async move { decode(send(client.delete(url)).await?).await })
            .await
            .into_result()?;

        if ack.success {
            Ok(())
        } else {
            Err(AppError::Internal(format!("delete of card {id} was not acknowledged")))
        }
    }
}

async fn send(request: reqwest::RequestBuilder) -> Result<reqwest::Response, AppError> {
    request.send().await.map_err(transport_error)
}

fn transport_error(e: reqwest::Error) -> AppError {
    if e.is_timeout() {
        AppError::Timeout(e.to_string())
    } else {
        AppError::Network(e.to_string())
    }
}

/// ステータスに応じてボディを復元、またはエラーに変換
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, AppError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|e| AppError::Deserialization(e.to_string()));
    }

    let message = response
        .json::<ErrorResponse>()
        .await
        .map(|body| body.error)
        .unwrap_or_else(|_| status.to_string());

    Err(match status.as_u16() {
        404 => AppError::NotFound(message),
        400..=499 => AppError::Validation(message),
        _ => AppError::ServiceUnavailable(message),
    })
}
