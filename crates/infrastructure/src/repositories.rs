use domain::{Card, CardId, CardPatch};
use shared::AppError;
use thiserror::Error;

/// カードストアの抽象
///
/// 呼び出しごとに一度だけ内部状態をロックする単純な同期 API。
pub trait CardRepository: Send + Sync {
    /// 全カードを挿入順で返す
    fn list(&self) -> Result<Vec<Card>, RepositoryError>;
    /// 末尾に追加
    fn insert(&self, card: Card) -> Result<Card, RepositoryError>;
    /// 指定フィールドのみマージ。該当IDがなければ NotFound
    fn patch(&self, id: &CardId, patch: &CardPatch) -> Result<Card, RepositoryError>;
    /// 該当IDのカードを削除。存在しなくても成功扱い
    fn delete(&self, id: &CardId) -> Result<(), RepositoryError>;
}

/// ストア層のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("card {0} not found")]
    NotFound(CardId),

    #[error("card store lock poisoned")]
    Poisoned,
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound(id) => AppError::NotFound(format!("card {id}")),
            RepositoryError::Poisoned => AppError::Internal(e.to_string()),
        }
    }
}
