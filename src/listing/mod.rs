//! 求人レコードの抽出・突き合わせ・永続化

mod extract;
mod normalize;
mod reconcile;
mod store;
mod types;

pub use extract::{extract_listings, extract_record, split_fragments};
pub use normalize::{decode_salary_digits, normalize_text, OBFUSCATED_DIGITS};
pub use reconcile::{reconcile, reconcile_with, Reconciliation};
pub use store::{snapshot_file_name, ListingStore, StoreLock};
pub use types::{ListingKey, ListingRecord, CSV_HEADER, TAG_SEPARATOR};
