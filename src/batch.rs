//! タブ単位の取得結果

use serde::Serialize;

use crate::listing::ListingRecord;

/// 1タブ分の取得結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabOutcome {
    /// 0始まりのタブ番号
    pub index: usize,
    /// タブの表示名（取得できた場合）
    pub label: Option<String>,
    /// 抽出レコード、または失敗理由
    pub result: Result<Vec<ListingRecord>, String>,
}

impl TabOutcome {
    pub fn succeeded(index: usize, label: Option<String>, records: Vec<ListingRecord>) -> Self {
        Self {
            index,
            label,
            result: Ok(records),
        }
    }

    pub fn failed(index: usize, label: Option<String>, reason: impl Into<String>) -> Self {
        Self {
            index,
            label,
            result: Err(reason.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn record_count(&self) -> usize {
        self.result.as_ref().map(Vec::len).unwrap_or(0)
    }

    pub fn summary(&self) -> TabSummary {
        TabSummary {
            index: self.index,
            label: self.label.clone(),
            records: self.record_count(),
            error: self.result.as_ref().err().cloned(),
        }
    }
}

/// 1回の実行で取得したバッチ（タブ順）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub outcomes: Vec<TabOutcome>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, outcome: TabOutcome) {
        self.outcomes.push(outcome);
    }

    /// 成功したタブのレコードをタブ順に連結
    pub fn records(&self) -> Vec<ListingRecord> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .flatten()
            .cloned()
            .collect()
    }

    pub fn failures(&self) -> impl Iterator<Item = &TabOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }

    pub fn succeeded_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.succeeded_count()
    }

    pub fn summaries(&self) -> Vec<TabSummary> {
        self.outcomes.iter().map(TabOutcome::summary).collect()
    }
}

/// レポート出力用のタブ概要
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabSummary {
    pub index: usize,
    pub label: Option<String>,
    pub records: usize,
    pub error: Option<String>,
}
