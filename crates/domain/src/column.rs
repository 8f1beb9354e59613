use crate::errors::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// カンバンの列（ワークフロー段階）
///
/// 並び順は `Column::ALL` の順で固定。ワイヤ上は小文字の名前で表現する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    #[default]
    Todo,
    Doing,
    Done,
}

impl Column {
    /// 表示順の全列
    pub const ALL: [Column; 3] = [Column::Todo, Column::Doing, Column::Done];

    /// ワイヤ上の名前
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Todo => "todo",
            Column::Doing => "doing",
            Column::Done => "done",
        }
    }

    /// 列見出しのラベル
    pub fn label(&self) -> &'static str {
        match self {
            Column::Todo => "To Do",
            Column::Doing => "Doing",
            Column::Done => "Done",
        }
    }

    /// `ALL` 内の位置
    pub fn index(&self) -> usize {
        match self {
            Column::Todo => 0,
            Column::Doing => 1,
            Column::Done => 2,
        }
    }

    /// 左隣の列（先頭なら None）
    pub fn previous(&self) -> Option<Column> {
        self.index()
            .checked_sub(1)
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// 右隣の列（末尾なら None）
    pub fn next(&self) -> Option<Column> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn is_first(&self) -> bool {
        self.previous().is_none()
    }

    pub fn is_last(&self) -> bool {
        self.next().is_none()
    }
}

impl FromStr for Column {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(Column::Todo),
            "doing" => Ok(Column::Doing),
            "done" => Ok(Column::Done),
            other => Err(DomainError::InvalidColumn(other.to_string())),
        }
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
