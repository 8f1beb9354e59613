use std::sync::{Mutex, MutexGuard};

use domain::{Card, CardId, CardPatch, Column};
use tracing::debug;

use crate::repositories::{CardRepository, RepositoryError};

/// プロセス内メモリのカードストア
#[derive(Debug, Default)]
pub struct InMemoryCardRepository {
    cards: Mutex<Vec<Card>>,
}

impl InMemoryCardRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 初期データ付きで作成
    pub fn with_cards(cards: Vec<Card>) -> Self {
        Self {
            cards: Mutex::new(cards),
        }
    }

    /// デモ用の3枚を投入した状態で作成
    pub fn with_demo_cards() -> Self {
        Self::with_cards(demo_cards())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Card>>, RepositoryError> {
        self.cards.lock().map_err(|_| RepositoryError::Poisoned)
    }
}

impl CardRepository for InMemoryCardRepository {
    fn list(&self) -> Result<Vec<Card>, RepositoryError> {
        Ok(self.lock()?.clone())
    }

    fn insert(&self, card: Card) -> Result<Card, RepositoryError> {
        let mut cards = self.lock()?;
        cards.push(card.clone());
        debug!(card_id = %card.id, total = cards.len(), "card inserted");
        Ok(card)
    }

    fn patch(&self, id: &CardId, patch: &CardPatch) -> Result<Card, RepositoryError> {
        let mut cards = self.lock()?;
        let card = cards
            .iter_mut()
            .find(|card| &card.id == id)
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))?;
        card.apply_patch(patch);
        Ok(card.clone())
    }

    fn delete(&self, id: &CardId) -> Result<(), RepositoryError> {
        let mut cards = self.lock()?;
        let before = cards.len();
        cards.retain(|card| &card.id != id);
        debug!(card_id = %id, removed = before - cards.len(), "card delete");
        Ok(())
    }
}

/// デモ用カード
pub fn demo_cards() -> Vec<Card> {
    [
        ("1", "Observe the situation", Column::Done),
        ("2", "Orient and assess options", Column::Doing),
        ("3", "Decide on next action", Column::Todo),
    ]
    .into_iter()
    .filter_map(|(id, title, column)| {
        CardId::from_string(id)
            .ok()
            .map(|id| Card::new(id, title, column))
    })
    .collect()
}
