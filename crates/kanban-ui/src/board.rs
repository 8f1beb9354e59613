//! `kanban-board` コンポーネント
//!
//! クライアント側のカード一覧を唯一保持し、カードからの意図を受けて
//! API 呼び出し → ローカル一覧の更新 → 全体再描画 の順に処理する。
//! ローカル一覧は API が成功した後にだけ変更するため、失敗時の巻き戻しは不要。

use domain::{Card, CardId, CardPatch, Column, NewCard};
use shared::AppError;
use tracing::{info, warn};

use crate::card::{CardInteraction, CardView, Key};
use crate::client::CardApi;
use crate::html::escape_html;
use crate::intent::CardIntent;

/// 追加フォームの最大文字数（input の maxlength）
pub const ADD_TITLE_MAX_CHARS: usize = 120;

/// ボードの表示段階
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardPhase {
    Loading,
    Ready,
    /// 初回取得に失敗
    Failed(String),
}

/// ドラッグ中の状態
#[derive(Debug, Clone, Default)]
struct DragState {
    dragging: Option<CardId>,
    over: Option<Column>,
}

pub struct BoardView<A: CardApi> {
    api: A,
    phase: BoardPhase,
    cards: Vec<Card>,
    card_views: Vec<CardView>,
    /// 列ごとの追加フォーム（None なら非表示）
    add_forms: [Option<String>; 3],
    drag: DragState,
    last_error: Option<AppError>,
    render_count: u64,
}

impl<A: CardApi> BoardView<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            phase: BoardPhase::Loading,
            cards: Vec::new(),
            card_views: Vec::new(),
            add_forms: Default::default(),
            drag: DragState::default(),
            last_error: None,
            render_count: 0,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn phase(&self) -> &BoardPhase {
        &self.phase
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn cards_in(&self, column: Column) -> Vec<&Card> {
        self.cards.iter().filter(|c| c.column == column).collect()
    }

    pub fn column_count(&self, column: Column) -> usize {
        self.cards.iter().filter(|c| c.column == column).count()
    }

    pub fn card_view(&self, id: &CardId) -> Option<&CardView> {
        self.card_views.iter().find(|v| v.id() == id)
    }

    pub fn last_error(&self) -> Option<&AppError> {
        self.last_error.as_ref()
    }

    pub fn is_add_form_open(&self, column: Column) -> bool {
        self.add_forms[column.index()].is_some()
    }

    pub fn dragging(&self) -> Option<&CardId> {
        self.drag.dragging.as_ref()
    }

    /// 全体再描画の回数
    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    /// マウント時の初回取得
    pub async fn mount(&mut self) -> Result<(), AppError> {
        self.phase = BoardPhase::Loading;
        match self.api.list().await {
            Ok(cards) => {
                info!(count = cards.len(), "board loaded");
                self.cards = cards;
                self.phase = BoardPhase::Ready;
                self.last_error = None;
                self.rerender();
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "failed to load cards");
                self.phase = BoardPhase::Failed(e.user_message());
                self.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// カードへの操作をボード経由で適用し、意図が出ればそのまま処理する
    pub async fn interact(
        &mut self,
        id: &CardId,
        interaction: CardInteraction,
    ) -> Result<Option<CardIntent>, AppError> {
        let Some(view) = self.card_views.iter_mut().find(|v| v.id() == id) else {
            return Ok(None);
        };
        let Some(intent) = view.handle(interaction) else {
            return Ok(None);
        };

        self.dispatch(intent.clone()).await?;
        Ok(Some(intent))
    }

    /// バブリングしてきた意図を処理する
    pub async fn dispatch(&mut self, intent: CardIntent) -> Result<(), AppError> {
        match intent {
            CardIntent::Move(detail) => self.on_move(detail.id, detail.column).await,
            CardIntent::Update(detail) => self.on_update(detail.id, detail.title).await,
            CardIntent::Delete(detail) => self.on_delete(detail.id).await,
        }
    }

    async fn on_move(&mut self, id: CardId, column: Column) -> Result<(), AppError> {
        match self.api.patch(&id, &CardPatch::column(column)).await {
            Ok(updated) => {
                info!(card_id = %id, %column, "card moved");
                self.apply_server_card(updated);
                Ok(())
            }
            Err(e) => Err(self.fail(Some(&id), e)),
        }
    }

    async fn on_update(&mut self, id: CardId, title: String) -> Result<(), AppError> {
        match self.api.patch(&id, &CardPatch::title(title)).await {
            Ok(updated) => {
                info!(card_id = %id, "card renamed");
                self.apply_server_card(updated);
                Ok(())
            }
            Err(e) => Err(self.fail(Some(&id), e)),
        }
    }

    async fn on_delete(&mut self, id: CardId) -> Result<(), AppError> {
        match self.api.delete(&id).await {
            Ok(()) => {
                info!(card_id = %id, "card deleted");
                self.cards.retain(|c| c.id != id);
                self.last_error = None;
                self.rerender();
                Ok(())
            }
            Err(e) => Err(self.fail(Some(&id), e)),
        }
    }

    /// 列の「+ Add card」ボタン
    pub fn open_add_form(&mut self, column: Column) {
        self.add_forms[column.index()] = Some(String::new());
    }

    /// 追加フォームへの入力
    pub fn add_form_input(&mut self, column: Column, value: impl Into<String>) {
        if let Some(current) = &mut self.add_forms[column.index()] {
            *current = value.into().chars().take(ADD_TITLE_MAX_CHARS).collect();
        }
    }

    /// 追加フォームでのキー入力。Enter で作成、Escape で閉じる
    pub async fn add_form_key(&mut self, column: Column, key: Key) -> Result<Option<Card>, AppError> {
        let Some(value) = &self.add_forms[column.index()] else {
            return Ok(None);
        };

        match key {
            Key::Enter => {
                let title = value.trim().to_string();
                if title.is_empty() {
                    return Ok(None);
                }
                self.add_card(title, column).await.map(Some)
            }
            Key::Escape => {
                self.add_forms[column.index()] = None;
                Ok(None)
            }
            Key::Other(_) => Ok(None),
        }
    }

    async fn add_card(&mut self, title: String, column: Column) -> Result<Card, AppError> {
        match self.api.create(&NewCard::new(title, Some(column))).await {
            Ok(card) => {
                info!(card_id = %card.id, %column, "card created");
                self.cards.push(card.clone());
                self.last_error = None;
                self.rerender();
                Ok(card)
            }
            Err(e) => Err(self.fail(None, e)),
        }
    }

    /// カードのドラッグ開始。ボードが知らないカードなら false
    pub fn begin_drag(&mut self, id: &CardId) -> bool {
        let Some(view) = self.card_views.iter_mut().find(|v| v.id() == id) else {
            return false;
        };
        self.drag.dragging = Some(view.start_drag());
        true
    }

    pub fn drag_over(&mut self, column: Column) {
        self.drag.over = Some(column);
    }

    pub fn drag_leave(&mut self, column: Column) {
        if self.drag.over == Some(column) {
            self.drag.over = None;
        }
    }

    /// ドロップ。別の列なら矢印ボタンと同じ移動の意図として処理する
    pub async fn drop_on(&mut self, column: Column) -> Result<Option<CardIntent>, AppError> {
        self.drag.over = None;
        let Some(id) = self.drag.dragging.clone() else {
            return Ok(None);
        };
        let intent = self.drop_card(&id, column).await;
        self.end_drag();
        intent
    }

    /// 任意のカードIDを列にドロップ（dataTransfer から取り出したIDを想定）
    pub async fn drop_card(&mut self, id: &CardId, column: Column) -> Result<Option<CardIntent>, AppError> {
        let Some(card) = self.cards.iter().find(|c| &c.id == id) else {
            return Ok(None);
        };
        if card.column == column {
            return Ok(None);
        }

        let intent = CardIntent::move_to(id.clone(), column);
        self.dispatch(intent.clone()).await?;
        Ok(Some(intent))
    }

    pub fn end_drag(&mut self) {
        if let Some(id) = self.drag.dragging.take() {
            if let Some(view) = self.card_views.iter_mut().find(|v| v.id() == &id) {
                view.handle(CardInteraction::DragEnd);
            }
        }
        self.drag.over = None;
    }

    /// サーバが返したカードでローカル一覧を更新
    fn apply_server_card(&mut self, updated: Card) {
        if let Some(card) = self.cards.iter_mut().find(|c| c.id == updated.id) {
            *card = updated;
        }
        self.last_error = None;
        self.rerender();
    }

    /// 失敗を記録する。サーバに存在しないカードはローカルからも外す
    fn fail(&mut self, id: Option<&CardId>, error: AppError) -> AppError {
        warn!(card_id = ?id.map(|id| id.as_str()), error = %error, "card operation failed");
        if let (Some(id), AppError::NotFound(_)) = (id, &error) {
            self.cards.retain(|c| &c.id != id);
            self.rerender();
        }
        self.last_error = Some(error.clone());
        error
    }

    /// 全カードビューを作り直し、追加フォーム・ドラッグ状態を初期化する
    fn rerender(&mut self) {
        self.card_views = self.cards.iter().cloned().map(CardView::new).collect();
        self.add_forms = Default::default();
        self.drag = DragState::default();
        self.render_count += 1;
    }

    pub fn render(&self) -> String {
        match &self.phase {
            BoardPhase::Loading => r#"<div class="loading">Loading...</div>"#.to_string(),
            BoardPhase::Failed(message) => error_banner(message),
            BoardPhase::Ready => {
                let banner = self
                    .last_error
                    .as_ref()
                    .map(|e| error_banner(&e.user_message()))
                    .unwrap_or_default();
                let columns: String = Column::ALL.iter().map(|c| self.render_column(*c)).collect();
                format!(r#"<div class="board">{banner}{columns}</div>"#)
            }
        }
    }

    fn render_column(&self, column: Column) -> String {
        let cards: String = self
            .card_views
            .iter()
            .filter(|v| v.card().column == column)
            .map(CardView::render_element)
            .collect();
        let drag_over = if self.drag.over == Some(column) { " drag-over" } else { "" };
        let form = &self.add_forms[column.index()];
        let (form_display, button_style) = match form {
            Some(_) => ("block", r#" style="display:none""#),
            None => ("none", ""),
        };
        let value = form.as_deref().map(escape_html).unwrap_or_default();

        format!(
            concat!(
                r#"<div class="column{drag_over}" data-column="{id}">"#,
                r#"<div class="column-header">"#,
                r#"<span class="column-title">{label}</span>"#,
                r#"<span class="column-count">{count}</span>"#,
                "</div>",
                r#"<div class="column-cards">{cards}</div>"#,
                r#"<div class="add-card-form" style="display:{form_display}">"#,
                r#"<input type="text" placeholder="Card title..." maxlength="{max}" value="{value}">"#,
                "</div>",
                r#"<button class="add-card-btn" data-column="{id}"{button_style}>+ Add card</button>"#,
                "</div>"
            ),
            drag_over = drag_over,
            id = column,
            label = column.label(),
            count = self.column_count(column),
            cards = cards,
            form_display = form_display,
            max = ADD_TITLE_MAX_CHARS,
            value = value,
            button_style = button_style,
        )
    }
}

fn error_banner(message: &str) -> String {
    format!(
        r#"<div class="board-error" role="alert">{}</div>"#,
        escape_html(message)
    )
}
