use crate::column::Column;
use crate::errors::DomainError;
use serde::{Deserialize, Serialize};

/// カードID
///
/// サーバ側で採番する不透明な文字列。新規採番は ULID だが、
/// 既存データ（"1" などのシード）もそのまま受け入れる。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    /// 新しいカードIDを採番
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    /// 文字列からカードIDを作成
    pub fn from_string(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.is_empty() {
            return Err(DomainError::InvalidCardId(
                "Card ID cannot be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CardId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// カンバンのカード
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub title: String,
    pub column: Column,
}

impl Card {
    pub fn new(id: CardId, title: impl Into<String>, column: Column) -> Self {
        Self {
            id,
            title: title.into(),
            column,
        }
    }

    /// 作成リクエストから新しいカードを生成（ID採番・列の既定値適用）
    pub fn create(new_card: NewCard) -> Self {
        Self {
            id: CardId::new(),
            title: new_card.title,
            column: new_card.column.unwrap_or_default(),
        }
    }

    /// 指定されたフィールドのみをマージする。ID は変更しない。
    pub fn apply_patch(&mut self, patch: &CardPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(column) = patch.column {
            self.column = column;
        }
    }
}

/// POST /api/cards のボディ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCard {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<Column>,
}

impl NewCard {
    pub fn new(title: impl Into<String>, column: Option<Column>) -> Self {
        Self {
            title: title.into(),
            column,
        }
    }
}

/// PATCH /api/cards/:id のボディ（部分更新）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<Column>,
}

impl CardPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            column: None,
        }
    }

    pub fn column(column: Column) -> Self {
        Self {
            title: None,
            column: Some(column),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.column.is_none()
    }
}
