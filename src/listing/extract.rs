//! 求人カードHTML → ListingRecord
//!
//! 要素が見つからないフィールドはエラーではなく `None` とする。

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::normalize::decode_salary_digits;
use super::types::ListingRecord;

const CARD_SELECTOR: &str = "div.job-card-wrap";
const TITLE_SELECTOR: &str = "a.job-name";
const SALARY_SELECTOR: &str = "span.job-salary";
const TAG_LIST_SELECTOR: &str = "ul.tag-list";
const TAG_ITEM_SELECTOR: &str = "li";
const LOCATION_SELECTOR: &str = "span.company-location";
const BOSS_SELECTOR: &str = "span.boss-name";

/// ページ全体から求人カードごとのHTML断片を切り出す
pub fn split_fragments(html: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(CARD_SELECTOR) else {
        return Vec::new();
    };
    let document = Html::parse_document(html);
    document.select(&selector).map(|card| card.html()).collect()
}

/// HTML断片1つから求人レコードを抽出
pub fn extract_record(fragment: &str) -> ListingRecord {
    let fragment = Html::parse_fragment(fragment);
    record_from_element(fragment.root_element())
}

/// ページ全体から求人レコードをすべて抽出
pub fn extract_listings(html: &str) -> Vec<ListingRecord> {
    let Ok(selector) = Selector::parse(CARD_SELECTOR) else {
        return Vec::new();
    };
    let document = Html::parse_document(html);
    let records: Vec<_> = document.select(&selector).map(record_from_element).collect();
    debug!("Extracted {} job cards", records.len());
    records
}

fn record_from_element(card: ElementRef<'_>) -> ListingRecord {
    let mut record = ListingRecord::new();
    if let Some(title) = first_text(card, TITLE_SELECTOR) {
        record = record.with_title(title);
    }
    if let Some(salary) = first_text(card, SALARY_SELECTOR) {
        record = record.with_salary(decode_salary_digits(&salary));
    }
    record = record.with_tags(tags(card));
    if let Some(location) = first_text(card, LOCATION_SELECTOR) {
        record = record.with_location(location);
    }
    if let Some(boss) = first_text(card, BOSS_SELECTOR) {
        record = record.with_boss_name(boss);
    }
    record
}

fn first_text(scope: ElementRef<'_>, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    scope.select(&selector).next().map(stripped_text)
}

fn tags(card: ElementRef<'_>) -> Vec<String> {
    let (Ok(list_selector), Ok(item_selector)) = (
        Selector::parse(TAG_LIST_SELECTOR),
        Selector::parse(TAG_ITEM_SELECTOR),
    ) else {
        return Vec::new();
    };

    card.select(&list_selector)
        .next()
        .map(|list| list.select(&item_selector).map(stripped_text).collect())
        .unwrap_or_default()
}

/// 各テキストノードを trim して連結
fn stripped_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
        <ul class="job-list">
          <li>
            <div class="job-card-wrap">
              <a class="job-name" href="/job/1"> Rust 开发工程师 </a>
              <span class="job-salary">&#xe032;&#xe036;-&#xe033;&#xe036;K</span>
              <ul class="tag-list"><li>3-5年</li><li> 本科 </li></ul>
              <div class="job-card-footer">
                <span class="boss-name">王先生</span>
                <span class="company-location">北京·<em>海淀区</em></span>
              </div>
            </div>
          </li>
          <li>
            <div class="job-card-wrap">
              <a class="job-name" href="/job/2">Go 工程师</a>
            </div>
          </li>
        </ul>
        </body></html>
    "#;

    #[test]
    fn test_extract_listings_full_card() {
        let records = extract_listings(PAGE);
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.title(), Some("Rust 开发工程师"));
        assert_eq!(first.salary(), Some("15-25K"));
        assert_eq!(first.tags(), "3-5年, 本科");
        assert_eq!(first.location(), Some("北京·海淀区"));
        assert_eq!(first.boss_name(), Some("王先生"));
    }

    #[test]
    fn test_missing_fields_are_none() {
        let records = extract_listings(PAGE);
        let second = &records[1];
        assert_eq!(second.title(), Some("Go 工程师"));
        assert_eq!(second.salary(), None);
        assert_eq!(second.tags(), "");
        assert_eq!(second.location(), None);
        assert_eq!(second.boss_name(), None);
    }

    #[test]
    fn test_fragments_round_trip_through_extractor() {
        let fragments = split_fragments(PAGE);
        assert_eq!(fragments.len(), 2);

        let from_fragments: Vec<_> = fragments.iter().map(|f| extract_record(f)).collect();
        assert_eq!(from_fragments, extract_listings(PAGE));
    }

    #[test]
    fn test_page_without_cards() {
        assert!(extract_listings("<html><body><p>login</p></body></html>").is_empty());
        assert!(split_fragments("").is_empty());
    }
}
