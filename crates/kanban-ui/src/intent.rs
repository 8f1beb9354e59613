use domain::{CardId, Column};
use serde::{Deserialize, Serialize};

/// `card-move` の detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveDetail {
    pub id: CardId,
    pub column: Column,
}

/// `card-update` の detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDetail {
    pub id: CardId,
    pub title: String,
}

/// `card-delete` の detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteDetail {
    pub id: CardId,
}

/// カードが発行する変更要求（バブリングしてボードが処理する）
///
/// JSON では `{ "type": "card-move", "detail": { ... } }` の形になる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum CardIntent {
    #[serde(rename = "card-move")]
    Move(MoveDetail),
    #[serde(rename = "card-update")]
    Update(UpdateDetail),
    #[serde(rename = "card-delete")]
    Delete(DeleteDetail),
}

impl CardIntent {
    pub fn move_to(id: CardId, column: Column) -> Self {
        CardIntent::Move(MoveDetail { id, column })
    }

    pub fn update(id: CardId, title: impl Into<String>) -> Self {
        CardIntent::Update(UpdateDetail {
            id,
            title: title.into(),
        })
    }

    pub fn delete(id: CardId) -> Self {
        CardIntent::Delete(DeleteDetail { id })
    }

    /// イベント名
    pub fn event_name(&self) -> &'static str {
        match self {
            CardIntent::Move(_) => "card-move",
            CardIntent::Update(_) => "card-update",
            CardIntent::Delete(_) => "card-delete",
        }
    }

    pub fn card_id(&self) -> &CardId {
        match self {
            CardIntent::Move(d) => &d.id,
            CardIntent::Update(d) => &d.id,
            CardIntent::Delete(d) => &d.id,
        }
    }

    /// イベントの detail ペイロード
    pub fn detail(&self) -> serde_json::Value {
        let value = match self {
            CardIntent::Move(d) => serde_json::to_value(d),
            CardIntent::Update(d) => serde_json::to_value(d),
            CardIntent::Delete(d) => serde_json::to_value(d),
        };
        value.unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> CardId {
        CardId::from_string(s).unwrap()
    }

    #[test]
    fn test_event_names_and_details() {
        let intent = CardIntent::move_to(id("42"), Column::Done);
        assert_eq!(intent.event_name(), "card-move");
        assert_eq!(intent.detail(), serde_json::json!({"id": "42", "column": "done"}));

        let intent = CardIntent::update(id("1"), "Updated");
        assert_eq!(intent.event_name(), "card-update");
        assert_eq!(intent.detail(), serde_json::json!({"id": "1", "title": "Updated"}));

        let intent = CardIntent::delete(id("7"));
        assert_eq!(intent.event_name(), "card-delete");
        assert_eq!(intent.detail(), serde_json::json!({"id": "7"}));
        assert_eq!(intent.card_id(), &id("7"));
    }

    #[test]
    fn test_intent_parses_from_custom_event_json() {
        let parsed: CardIntent = serde_json::from_value(serde_json::json!({
            "type": "card-move",
            "detail": {"id": "1", "column": "doing"}
        }))
        .unwrap();
        assert_eq!(parsed, CardIntent::move_to(id("1"), Column::Doing));
    }
}
