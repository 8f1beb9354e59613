use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use domain::{Card, CardId, CardPatch, NewCard};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::AppState;

/// DELETE のレスポンス
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
struct HealthBody {
    /// サービスの簡易ステータス
    status: &'static str,
}

/// ヘルスチェック用ハンドラ
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthBody { status: "ok" }))
}

/// GET /api/cards
pub async fn list_cards(State(state): State<AppState>) -> Result<Json<Vec<Card>>, ApiError> {
    let cards = state.cards.list()?;
    Ok(Json(cards))
}

/// POST /api/cards
/// - ID は ULID を採番
/// - column 省略時は todo
pub async fn create_card(
    State(state): State<AppState>,
    payload: Result<Json<NewCard>, JsonRejection>,
) -> Result<(StatusCode, Json<Card>), ApiError> {
    let Json(new_card) = payload?;
    let card = state.cards.insert(Card::create(new_card))?;
    tracing::info!(card_id = %card.id, column = %card.column, "card created");
    Ok((StatusCode::CREATED, Json(card)))
}

/// PATCH /api/cards/:id（部分更新）
pub async fn patch_card(
    Path(id): Path<String>,
    State(state): State<AppState>,
    payload: Result<Json<CardPatch>, JsonRejection>,
) -> Result<Json<Card>, ApiError> {
    let id = CardId::from_string(id)?;
    let Json(patch) = payload?;
    let card = state.cards.patch(&id, &patch)?;
    tracing::info!(card_id = %card.id, title_changed = patch.title.is_some(), column_changed = patch.column.is_some(), "card patched");
    Ok(Json(card))
}

/// DELETE /api/cards/:id（存在しなくても成功）
pub async fn delete_card(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let id = CardId::from_string(id)?;
    state.cards.delete(&id)?;
    tracing::info!(card_id = %id, "card deleted");
    Ok(Json(DeleteResponse { success: true }))
}
