//! BOSS直聘 スクレイパーモジュール
//!
//! 推薦求人ページの各タブを巡回して求人カードを取得する

mod scraper;

pub use scraper::ZhipinScraper;
