//! 新規取得バッチと既存ストアの突き合わせ

use std::collections::HashSet;

use crate::config::DedupStrategy;

use super::types::ListingRecord;

/// 突き合わせ結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// 既存ストアに無かったレコード（取得順）
    pub new: Vec<ListingRecord>,
    /// 既存レコード + 新規レコード
    pub merged: Vec<ListingRecord>,
}

/// 全フィールド完全一致で突き合わせる
pub fn reconcile(incoming: &[ListingRecord], existing: &[ListingRecord]) -> Reconciliation {
    reconcile_with(DedupStrategy::Exact, incoming, existing)
}

/// 指定した重複判定方式で突き合わせる
///
/// 既存側に一致するものだけを除外し、バッチ内の重複はそのまま残す。
/// `merged` の先頭は常に `existing` と同一。
pub fn reconcile_with(
    strategy: DedupStrategy,
    incoming: &[ListingRecord],
    existing: &[ListingRecord],
) -> Reconciliation {
    let seen: HashSet<_> = existing.iter().map(|r| r.key(strategy)).collect();

    let new: Vec<ListingRecord> = incoming
        .iter()
        .filter(|r| !seen.contains(&r.key(strategy)))
        .cloned()
        .collect();

    let mut merged = Vec::with_capacity(existing.len() + new.len());
    merged.extend_from_slice(existing);
    merged.extend_from_slice(&new);

    Reconciliation { new, merged }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(title: &str) -> ListingRecord {
        ListingRecord::new()
            .with_title(title)
            .with_salary("10-20K")
            .with_tags(["1-3年", "本科"])
            .with_location("上海")
            .with_boss_name("李女士")
    }

    #[test]
    fn test_empty_existing() {
        let (a, b) = (job("A"), job("B"));
        let result = reconcile(&[a.clone(), b.clone()], &[]);
        assert_eq!(result.new, vec![a.clone(), b.clone()]);
        assert_eq!(result.merged, vec![a, b]);
    }

    #[test]
    fn test_existing_record_is_filtered() {
        let (a, b) = (job("A"), job("B"));
        let result = reconcile(&[a.clone(), b.clone()], &[a.clone()]);
        assert_eq!(result.new, vec![b.clone()]);
        assert_eq!(result.merged, vec![a, b]);
    }

    #[test]
    fn test_within_batch_duplicates_are_kept() {
        let a = job("A");
        let result = reconcile(&[a.clone(), a.clone()], &[]);
        assert_eq!(result.new, vec![a.clone(), a.clone()]);
        assert_eq!(result.merged.len(), 2);
    }

    #[test]
    fn test_idempotent_second_pass() {
        let existing = vec![job("X"), job("Y")];
        let batch = vec![job("A"), job("X"), job("B")];

        let first = reconcile(&batch, &existing);
        assert_eq!(first.new, vec![job("A"), job("B")]);

        let second = reconcile(&batch, &first.merged);
        assert!(second.new.is_empty());
        assert_eq!(second.merged, first.merged);
    }

    #[test]
    fn test_merged_starts_with_existing_unchanged() {
        let existing = vec![job("C"), job("A"), job("C")];
        let batch = vec![job("B"), job("A"), job("D")];
        let result = reconcile(&batch, &existing);

        assert_eq!(&result.merged[..existing.len()], existing.as_slice());
        assert_eq!(&result.merged[existing.len()..], result.new.as_slice());
        assert_eq!(result.new, vec![job("B"), job("D")]);
    }

    #[test]
    fn test_normalized_strategy_matches_reformatted_record() {
        let existing = vec![job("Rust Engineer")];
        let reformatted = job(" Rust  Engineer ");

        let exact = reconcile_with(DedupStrategy::Exact, &[reformatted.clone()], &existing);
        assert_eq!(exact.new.len(), 1);

        let normalized = reconcile_with(DedupStrategy::Normalized, &[reformatted], &existing);
        assert!(normalized.new.is_empty());
        assert_eq!(normalized.merged, existing);
    }

    #[test]
    fn test_empty_incoming() {
        let existing = vec![job("A")];
        let result = reconcile(&[], &existing);
        assert!(result.new.is_empty());
        assert_eq!(result.merged, existing);
    }
}
