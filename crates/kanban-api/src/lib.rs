//! カンバンボードの HTTP API（axum）
//!
//! `/api/cards` に対する一覧・作成・部分更新・削除を提供します。
//! ストアはプロセス内メモリのみで、永続化は行いません。

use std::path::Path;
use std::sync::Arc;

use axum::{
    http::Method,
    routing::{get, patch},
    Router,
};
use infrastructure::{CardRepository, InMemoryCardRepository};
use shared::Config;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

pub use error::ApiError;
pub use handlers::DeleteResponse;

/// アプリケーションの共有状態
#[derive(Clone)]
pub struct AppState {
    pub cards: Arc<dyn CardRepository>,
}

impl AppState {
    pub fn new(cards: Arc<dyn CardRepository>) -> Self {
        Self { cards }
    }

    /// デモ用カード入りのストアで作成
    pub fn with_demo_cards() -> Self {
        Self::new(Arc::new(InMemoryCardRepository::with_demo_cards()))
    }

    /// 設定に従ってストアを初期化
    pub fn from_config(config: &Config) -> Self {
        if config.seed_demo_cards {
            Self::with_demo_cards()
        } else {
            Self::default()
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(InMemoryCardRepository::new()))
    }
}

/// デモ用カード入りのルータ
pub fn app() -> Router {
    app_with_state(AppState::with_demo_cards())
}

/// 外部から状態を注入できる版
pub fn app_with_state(state: AppState) -> Router {
    with_layers(api_routes()).with_state(state)
}

/// API に加えて、どのルートにも一致しないパスを静的ファイルとして配信する
pub fn app_with_static(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    let routes = api_routes().fallback_service(ServeDir::new(static_dir.as_ref()));
    with_layers(routes).with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/cards",
            get(handlers::list_cards).post(handlers::create_card),
        )
        .route(
            "/api/cards/:id",
            patch(handlers::patch_card).delete(handlers::delete_card),
        )
}

fn with_layers(router: Router<AppState>) -> Router<AppState> {
    router
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{self, Body},
        http::{Request, StatusCode},
    };
    use domain::{Card, Column};
    use tower::ServiceExt; // for `oneshot`

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn delete(uri: &str) -> Request<Body> {
        Request::builder().method("DELETE").uri(uri).body(Body::empty()).unwrap()
    }

    async fn list(app: &Router) -> Vec<Card> {
        let (status, json) = send(app, get("/api/cards")).await;
        assert_eq!(status, StatusCode::OK);
        serde_json::from_value(json).unwrap()
    }

    #[tokio::test]
    async fn get_health_returns_ok() {
        let (status, json) = send(&app(), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn get_cards_returns_seed_cards() {
        let app = app();
        let cards = list(&app).await;

        assert_eq!(cards.len(), 3);
        for card in &cards {
            assert!(!card.id.as_str().is_empty());
            assert!(!card.title.is_empty());
        }
    }

    #[tokio::test]
    async fn post_without_column_defaults_to_todo() {
        let app = app();
        let (status, json) =
            send(&app, json_request("POST", "/api/cards", serde_json::json!({"title": "New task"}))).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["title"], "New task");
        assert_eq!(json["column"], "todo");
        assert!(json["id"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[tokio::test]
    async fn post_respects_column_when_provided() {
        let app = app();
        let body = serde_json::json!({"title": "Already doing", "column": "doing"});
        let (status, json) = send(&app, json_request("POST", "/api/cards", body)).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["column"], "doing");
    }

    #[tokio::test]
    async fn post_then_get_shows_card_exactly_once() {
        let app = app_with_state(AppState::default());
        let (_, created) =
            send(&app, json_request("POST", "/api/cards", serde_json::json!({"title": "Check me"}))).await;

        let cards = list(&app).await;
        let matching: Vec<&Card> = cards
            .iter()
            .filter(|c| c.id.as_str() == created["id"].as_str().unwrap())
            .collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].title, "Check me");
    }

    #[tokio::test]
    async fn post_assigns_unique_ids() {
        let app = app_with_state(AppState::default());
        for i in 0..20 {
            let body = serde_json::json!({"title": format!("card {i}")});
            let (status, _) = send(&app, json_request("POST", "/api/cards", body)).await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let cards = list(&app).await;
        let mut ids: Vec<&str> = cards.iter().map(|c| c.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 20);
    }

    #[tokio::test]
    async fn post_with_unknown_column_is_bad_request() {
        let app = app();
        let body = serde_json::json!({"title": "Nope", "column": "archived"});
        let (status, json) = send(&app, json_request("POST", "/api/cards", body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());
        assert_eq!(list(&app).await.len(), 3);
    }

    #[tokio::test]
    async fn post_without_json_content_type_is_bad_request() {
        let app = app();
        let request = Request::builder()
            .method("POST")
            .uri("/api/cards")
            .body(Body::from(r#"{"title":"No header"}"#))
            .unwrap();

        let (status, json) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());
        assert_eq!(list(&app).await.len(), 3);
    }

    #[tokio::test]
    async fn patch_updates_title_only() {
        let app = app();
        let target = list(&app).await.remove(0);

        let (status, json) = send(
            &app,
            json_request(
                "PATCH",
                &format!("/api/cards/{}", target.id),
                serde_json::json!({"title": "Renamed task"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let updated: Card = serde_json::from_value(json).unwrap();
        assert_eq!(updated.id, target.id);
        assert_eq!(updated.title, "Renamed task");
        assert_eq!(updated.column, target.column);
    }

    #[tokio::test]
    async fn patch_moves_card_to_new_column() {
        let app = app();
        let target = list(&app).await.remove(0);

        let (status, json) = send(
            &app,
            json_request(
                "PATCH",
                &format!("/api/cards/{}", target.id),
                serde_json::json!({"column": "todo"}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let updated: Card = serde_json::from_value(json).unwrap();
        assert_eq!(updated.id, target.id);
        assert_eq!(updated.title, target.title);
        assert_eq!(updated.column, Column::Todo);
    }

    #[tokio::test]
    async fn empty_patch_returns_card_unchanged() {
        let app = app();
        let target = list(&app).await.remove(0);

        let (status, json) = send(
            &app,
            json_request("PATCH", &format!("/api/cards/{}", target.id), serde_json::json!({})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let updated: Card = serde_json::from_value(json).unwrap();
        assert_eq!(updated, target);
    }

    #[tokio::test]
    async fn patch_unknown_id_returns_404() {
        let app = app();
        let (status, json) = send(
            &app,
            json_request("PATCH", "/api/cards/nonexistent", serde_json::json!({"column": "done"})),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn delete_removes_card() {
        let app = app();
        let target = list(&app).await.remove(0);

        let (status, json) = send(&app, delete(&format!("/api/cards/{}", target.id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);

        let after = list(&app).await;
        assert!(!after.iter().any(|c| c.id == target.id));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let app = app();
        for _ in 0..2 {
            let (status, json) = send(&app, delete("/api/cards/nonexistent")).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(json["success"], true);
        }
        assert_eq!(list(&app).await.len(), 3);
    }

    #[tokio::test]
    async fn cors_headers_are_present() {
        let app = app();
        let request = Request::builder()
            .method("GET")
            .uri("/api/cards")
            .header("origin", "http://localhost:5173")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn from_config_can_start_empty() {
        let config = Config {
            seed_demo_cards: false,
            ..Config::default()
        };
        let app = app_with_state(AppState::from_config(&config));
        assert!(list(&app).await.is_empty());
    }

    #[tokio::test]
    async fn unmatched_paths_are_served_from_static_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<kanban-board></kanban-board>").unwrap();
        let app = app_with_static(AppState::with_demo_cards(), dir.path());

        let response = app.clone().oneshot(get("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"<kanban-board></kanban-board>");

        // API ルートが優先される
        assert_eq!(list(&app).await.len(), 3);

        let response = app.oneshot(get("/missing.js")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
