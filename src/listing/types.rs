//! 求人レコード関連の型定義

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::DedupStrategy;

use super::normalize::normalize_text;

/// タグ結合時の区切り文字
///
/// タグ自身がこの文字列を含む場合は永続化後に復元できない。
pub const TAG_SEPARATOR: &str = ", ";

/// CSVの列順（ヘッダー）
pub const CSV_HEADER: [&str; 5] = ["title", "salary", "tags", "location", "boss_name"];

/// 求人1件
///
/// 等価性は5フィールドすべての一致で判定する。空文字列は `None` に正規化される。
/// フィールドはビルダーかデシリアライズ経由でしか設定できない。
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawListingRecord")]
pub struct ListingRecord {
    title: Option<String>,
    salary: Option<String>,
    tags: String,
    location: Option<String>,
    boss_name: Option<String>,
}

/// CSV・JSONの1行そのまま（正規化前）
#[derive(Deserialize)]
struct RawListingRecord {
    title: Option<String>,
    salary: Option<String>,
    #[serde(default)]
    tags: String,
    location: Option<String>,
    boss_name: Option<String>,
}

impl From<RawListingRecord> for ListingRecord {
    fn from(raw: RawListingRecord) -> Self {
        Self {
            title: raw.title.and_then(non_empty),
            salary: raw.salary.and_then(non_empty),
            tags: raw.tags,
            location: raw.location.and_then(non_empty),
            boss_name: raw.boss_name.and_then(non_empty),
        }
    }
}

impl ListingRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = non_empty(title.into());
        self
    }

    pub fn with_salary(mut self, salary: impl Into<String>) -> Self {
        self.salary = non_empty(salary.into());
        self
    }

    /// タグ列を `", "` で結合して設定
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = join_tags(tags);
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = non_empty(location.into());
        self
    }

    pub fn with_boss_name(mut self, boss_name: impl Into<String>) -> Self {
        self.boss_name = non_empty(boss_name.into());
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn salary(&self) -> Option<&str> {
        self.salary.as_deref()
    }

    /// `", "` で結合済みのタグ
    pub fn tags(&self) -> &str {
        &self.tags
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn boss_name(&self) -> Option<&str> {
        self.boss_name.as_deref()
    }

    /// 結合済みタグを個別に分割
    pub fn tag_list(&self) -> Vec<&str> {
        if self.tags.is_empty() {
            return Vec::new();
        }
        self.tags.split(TAG_SEPARATOR).collect()
    }

    /// 重複判定キーを計算
    pub fn key(&self, strategy: DedupStrategy) -> ListingKey {
        let mut hasher = Sha256::new();
        match strategy {
            DedupStrategy::Exact => {
                hash_field(&mut hasher, self.title.as_deref());
                hash_field(&mut hasher, self.salary.as_deref());
                hash_field(&mut hasher, Some(self.tags.as_str()));
                hash_field(&mut hasher, self.location.as_deref());
                hash_field(&mut hasher, self.boss_name.as_deref());
            }
            DedupStrategy::Normalized => {
                let norm = |v: Option<&str>| v.map(normalize_text).filter(|s| !s.is_empty());
                let tags = join_tags(
                    self.tag_list()
                        .into_iter()
                        .map(normalize_text)
                        .filter(|t| !t.is_empty()),
                );
                hash_field(&mut hasher, norm(self.title.as_deref()).as_deref());
                hash_field(&mut hasher, norm(self.salary.as_deref()).as_deref());
                hash_field(&mut hasher, Some(tags.as_str()));
                hash_field(&mut hasher, norm(self.location.as_deref()).as_deref());
                hash_field(&mut hasher, norm(self.boss_name.as_deref()).as_deref());
            }
        }
        ListingKey(hasher.finalize().into())
    }
}

/// 求人レコードの内容ハッシュ（SHA-256）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListingKey([u8; 32]);

impl ListingKey {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Display for ListingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn hash_field(hasher: &mut Sha256, value: Option<&str>) {
    match value {
        Some(v) => {
            hasher.update([1u8]);
            hasher.update((v.len() as u64).to_le_bytes());
            hasher.update(v.as_bytes());
        }
        None => hasher.update([0u8]),
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

fn join_tags<I, S>(tags: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|t| t.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(TAG_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn sample() -> ListingRecord {
        ListingRecord::new()
            .with_title("Rust Engineer")
            .with_salary("20-30K")
            .with_tags(["3-5年", "本科"])
            .with_location("北京·海淀区")
            .with_boss_name("王先生")
    }

    #[test]
    fn test_construction_order_does_not_matter() {
        let a = sample();
        let b = ListingRecord::new()
            .with_boss_name("王先生")
            .with_location("北京·海淀区")
            .with_tags(["3-5年", "本科"])
            .with_salary("20-30K")
            .with_title("Rust Engineer");

        assert_eq!(a, b);
        assert_eq!(a.key(DedupStrategy::Exact), b.key(DedupStrategy::Exact));

        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_presence_matters() {
        let a = sample();
        let mut b = sample();
        b.boss_name = None;
        assert_ne!(a, b);
        assert_ne!(a.key(DedupStrategy::Exact), b.key(DedupStrategy::Exact));
    }

    #[test]
    fn test_empty_text_becomes_none() {
        let r = ListingRecord::new().with_title("   ").with_salary("");
        assert_eq!(r.title, None);
        assert_eq!(r.salary, None);
    }

    #[test]
    fn test_deserialized_empty_text_becomes_none() {
        let json = r#"{"title":"A","salary":"","tags":"","location":"  ","boss_name":null}"#;
        let r: ListingRecord = serde_json::from_str(json).unwrap();

        assert_eq!(r, ListingRecord::new().with_title("A"));
        assert_eq!(r.salary(), None);
        assert_eq!(r.location(), None);
        assert_eq!(
            r.key(DedupStrategy::Exact),
            ListingRecord::new().with_title("A").key(DedupStrategy::Exact)
        );
    }

    #[test]
    fn test_tags_joined_and_split() {
        let r = sample();
        assert_eq!(r.tags, "3-5年, 本科");
        assert_eq!(r.tag_list(), vec!["3-5年", "本科"]);
        assert!(ListingRecord::new().tag_list().is_empty());
    }

    #[test]
    fn test_normalized_key_ignores_whitespace() {
        let a = sample();
        let b = ListingRecord::new()
            .with_title("  Rust   Engineer ")
            .with_salary("20-30K")
            .with_tags(["3-5年 ", " 本科"])
            .with_location("北京·海淀区")
            .with_boss_name("王先生");

        assert_ne!(a, b);
        assert_ne!(a.key(DedupStrategy::Exact), b.key(DedupStrategy::Exact));
        assert_eq!(
            a.key(DedupStrategy::Normalized),
            b.key(DedupStrategy::Normalized)
        );
    }

    #[test]
    fn test_field_boundaries_are_distinct() {
        let a = ListingRecord::new().with_title("ab").with_salary("c");
        let b = ListingRecord::new().with_title("a").with_salary("bc");
        assert_ne!(a.key(DedupStrategy::Exact), b.key(DedupStrategy::Exact));
    }

    #[test]
    fn test_key_hex_length() {
        assert_eq!(sample().key(DedupStrategy::Exact).to_hex().len(), 64);
    }
}
