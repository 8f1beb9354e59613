//! `kanban-card` コンポーネント
//!
//! 描画は `{id, title, column}` の純粋関数。タイトルのインライン編集だけが
//! 内部状態を持ち、確定（Enter / blur）は1回の編集につき高々1回しか発火しない。

use domain::{Card, CardId, Column};

use crate::html::escape_html;
use crate::intent::CardIntent;

/// キー入力
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    Other(String),
}

impl From<&str> for Key {
    fn from(key: &str) -> Self {
        match key {
            "Enter" => Key::Enter,
            "Escape" => Key::Escape,
            other => Key::Other(other.to_string()),
        }
    }
}

/// カードへのユーザー操作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardInteraction {
    /// タイトルをクリック（編集開始）
    ClickTitle,
    /// 編集中の入力値の変更
    Input(String),
    KeyDown(Key),
    Blur,
    MoveLeft,
    MoveRight,
    Delete,
    DragStart,
    DragEnd,
}

/// 編集セッション
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    original: String,
    value: String,
}

impl EditSession {
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// 表示モード
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DisplayMode {
    #[default]
    Normal,
    Editing(EditSession),
}

/// 1枚のカードのビュー
#[derive(Debug, Clone)]
pub struct CardView {
    card: Card,
    mode: DisplayMode,
    dragging: bool,
}

impl CardView {
    pub fn new(card: Card) -> Self {
        Self {
            card,
            mode: DisplayMode::Normal,
            dragging: false,
        }
    }

    pub fn card(&self) -> &Card {
        &self.card
    }

    pub fn id(&self) -> &CardId {
        &self.card.id
    }

    pub fn mode(&self) -> &DisplayMode {
        &self.mode
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, DisplayMode::Editing(_))
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// 属性の更新。再描画されるので編集中の内容は破棄される
    pub fn set_card(&mut self, card: Card) {
        self.card = card;
        self.mode = DisplayMode::Normal;
    }

    pub fn can_move_left(&self) -> bool {
        !self.card.column.is_first()
    }

    pub fn can_move_right(&self) -> bool {
        !self.card.column.is_last()
    }

    /// ドラッグ開始。dataTransfer に載せるペイロード（カードID）を返す
    pub fn start_drag(&mut self) -> CardId {
        self.dragging = true;
        self.card.id.clone()
    }

    /// 操作を適用し、発行すべき意図があれば返す
    pub fn handle(&mut self, interaction: CardInteraction) -> Option<CardIntent> {
        match interaction {
            CardInteraction::ClickTitle => {
                if !self.is_editing() {
                    self.start_edit();
                }
                None
            }
            CardInteraction::Input(value) => {
                if let DisplayMode::Editing(session) = &mut self.mode {
                    session.value = value;
                }
                None
            }
            CardInteraction::KeyDown(Key::Enter) | CardInteraction::Blur => self.commit_edit(),
            CardInteraction::KeyDown(Key::Escape) => {
                self.cancel_edit();
                None
            }
            CardInteraction::KeyDown(Key::Other(_)) => None,
            CardInteraction::MoveLeft => self.move_intent(self.card.column.previous()),
            CardInteraction::MoveRight => self.move_intent(self.card.column.next()),
            CardInteraction::Delete => {
                if self.is_editing() {
                    return None;
                }
                Some(CardIntent::delete(self.card.id.clone()))
            }
            CardInteraction::DragStart => {
                self.start_drag();
                None
            }
            CardInteraction::DragEnd => {
                self.dragging = false;
                None
            }
        }
    }

    fn start_edit(&mut self) {
        self.mode = DisplayMode::Editing(EditSession {
            original: self.card.title.clone(),
            value: self.card.title.clone(),
        });
    }

    /// 編集を確定する。セッションを取り出すので二重発火しない
    fn commit_edit(&mut self) -> Option<CardIntent> {
        let DisplayMode::Editing(session) = std::mem::take(&mut self.mode) else {
            return None;
        };

        let new_title = session.value.trim();
        if new_title.is_empty() || new_title == session.original {
            return None;
        }
        Some(CardIntent::update(self.card.id.clone(), new_title))
    }

    fn cancel_edit(&mut self) {
        self.mode = DisplayMode::Normal;
    }

    fn move_intent(&self, target: Option<Column>) -> Option<CardIntent> {
        if self.is_editing() {
            return None;
        }
        target.map(|column| CardIntent::move_to(self.card.id.clone(), column))
    }

    /// カード内部のマークアップ
    pub fn render(&self) -> String {
        let title = match &self.mode {
            DisplayMode::Normal => format!(
                r#"<div class="card-title">{}</div>"#,
                escape_html(&self.card.title)
            ),
            DisplayMode::Editing(session) => format!(
                r#"<input type="text" class="card-title-input" value="{}" autofocus>"#,
                escape_html(&session.value)
            ),
        };

        format!(
            concat!(
                r#"<div class="card" draggable="true" title="Click to edit">"#,
                "{title}",
                r#"<div class="card-actions">"#,
                r#"<div class="card-move">"#,
                r#"<button class="btn btn-move" data-action="move-left"{left}>&#8592;</button>"#,
                r#"<button class="btn btn-move" data-action="move-right"{right}>&#8594;</button>"#,
                "</div>",
                r#"<button class="btn btn-delete" data-action="delete" title="Delete">&#x2715;</button>"#,
                "</div>",
                "</div>"
            ),
            title = title,
            left = disabled_attr(!self.can_move_left()),
            right = disabled_attr(!self.can_move_right()),
        )
    }

    /// ホスト要素ごとのマークアップ
    pub fn render_element(&self) -> String {
        let class = if self.dragging { r#" class="dragging""# } else { "" };
        format!(
            r#"<kanban-card card-id="{id}" title="{title}" column="{column}"{class}>{inner}</kanban-card>"#,
            id = escape_html(self.card.id.as_str()),
            title = escape_html(&self.card.title),
            column = self.card.column,
            class = class,
            inner = self.render(),
        )
    }
}

fn disabled_attr(disabled: bool) -> &'static str {
    if disabled {
        " disabled"
    } else {
        ""
    }
}
