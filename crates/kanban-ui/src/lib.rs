//! カンバンの UI コンポーネント（`kanban-card` / `kanban-board`）
//!
//! DOM に依存しないヘッドレス実装です。各コンポーネントは状態機械として
//! 入力（クリック・キー・ドラッグ）を受け取り、`render()` でマークアップを返します。
//! カードは状態を変更せず意図（[`CardIntent`]）だけを返し、ボードがそれを
//! [`CardApi`] 経由でサーバに反映してから全体を再描画します。

pub mod board;
pub mod card;
pub mod client;
pub mod html;
pub mod intent;

pub use board::{BoardPhase, BoardView};
pub use card::{CardInteraction, CardView, DisplayMode, Key};
pub use client::{CardApi, ClientConfig, HttpCardApi};
pub use intent::{CardIntent, DeleteDetail, MoveDetail, UpdateDetail};
