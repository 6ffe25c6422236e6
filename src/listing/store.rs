//! 求人ストア（CSV）
//!
//! 全件ファイルは実行開始時に一括で読み込み、終了時に一括で書き戻す。
//! 書き込みは同じディレクトリの一時ファイルに出力してから rename する。

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use fs2::FileExt;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::ScraperError;

use super::types::{ListingRecord, CSV_HEADER};

const SNAPSHOT_EXTENSION: &str = "csv";
const SNAPSHOT_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// 追記専用・重複排除済みの求人ログ
#[derive(Debug, Clone)]
pub struct ListingStore {
    path: PathBuf,
}

impl ListingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 全件読み込み
    ///
    /// ファイルが無ければ空。ヘッダーや行が壊れている場合は `Storage` エラー。
    pub fn load(&self) -> Result<Vec<ListingRecord>, ScraperError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No existing store at {:?}, starting empty", self.path);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut reader = csv::Reader::from_reader(file);
        let headers = reader
            .headers()
            .map_err(|e| ScraperError::storage(&self.path, format!("ヘッダー読み込み失敗: {}", e)))?
            .clone();

        let matches = headers.len() == CSV_HEADER.len()
            && headers
                .iter()
                .map(|h| h.trim_start_matches('\u{feff}'))
                .zip(CSV_HEADER)
                .all(|(actual, expected)| actual == expected);
        if !matches {
            return Err(ScraperError::storage(
                &self.path,
                format!(
                    "ヘッダーが一致しません: expected {:?}, found {:?}",
                    CSV_HEADER,
                    headers.iter().collect::<Vec<_>>()
                ),
            ));
        }

        // BOM付きヘッダーでも列名で対応付けられるよう、期待ヘッダーで読む
        let expected = csv::StringRecord::from(CSV_HEADER.to_vec());
        let mut records = Vec::new();
        for (index, row) in reader.records().enumerate() {
            let record = row
                .and_then(|row| row.deserialize::<ListingRecord>(Some(&expected)))
                .map_err(|e| {
                    ScraperError::storage(&self.path, format!("{}行目: {}", index + 2, e))
                })?;
            records.push(record);
        }

        info!("Loaded {} records from {:?}", records.len(), self.path);
        Ok(records)
    }

    /// 全件を上書き保存（順序はそのまま）
    pub fn save(&self, records: &[ListingRecord]) -> Result<(), ScraperError> {
        write_csv_atomic(&self.path, records)?;
        info!("Saved {} records to {:?}", records.len(), self.path);
        Ok(())
    }

    /// 今回の新着だけを `{prefix}{YYYYMMDD_HHMMSS}.csv` に出力
    pub fn write_snapshot(
        dir: &Path,
        prefix: &str,
        timestamp: NaiveDateTime,
        records: &[ListingRecord],
    ) -> Result<PathBuf, ScraperError> {
        let path = dir.join(snapshot_file_name(prefix, timestamp));
        write_csv_atomic(&path, records)?;
        info!("Saved {} new records to {:?}", records.len(), path);
        Ok(path)
    }

    /// 多重起動防止ロックを取得
    ///
    /// `<store>.lock` にOSのアドバイザリロックを掛ける。プロセスが強制終了しても
    /// カーネルが解放するため、ファイルが残っていても次回は取得できる。
    pub fn lock(&self) -> Result<StoreLock, ScraperError> {
        let mut lock_path = self.path.as_os_str().to_owned();
        lock_path.push(".lock");
        let lock_path = PathBuf::from(lock_path);

        if let Some(parent) = non_empty_parent(&lock_path) {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        if let Err(e) = file.try_lock_exclusive() {
            if e.kind() == fs2::lock_contended_error().kind() {
                return Err(ScraperError::Locked(lock_path));
            }
            return Err(e.into());
        }

        // 中身は参考情報（所有プロセス）のみ
        file.set_len(0)?;
        writeln!(file, "{}", std::process::id())?;

        debug!("Acquired store lock {:?}", lock_path);
        Ok(StoreLock {
            path: lock_path,
            file,
        })
    }
}

/// ストアのロック。drop で解放される
#[derive(Debug)]
pub struct StoreLock {
    path: PathBuf,
    file: File,
}

impl StoreLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        // ロックファイル自体は残す（削除すると別プロセスと競合する）
        match self.file.unlock() {
            Ok(()) => debug!("Released store lock {:?}", self.path),
            Err(e) => warn!("Failed to unlock {:?}: {}", self.path, e),
        }
    }
}

pub fn snapshot_file_name(prefix: &str, timestamp: NaiveDateTime) -> String {
    format!(
        "{}{}.{}",
        prefix,
        timestamp.format(SNAPSHOT_TIMESTAMP_FORMAT),
        SNAPSHOT_EXTENSION
    )
}

fn non_empty_parent(path: &Path) -> Option<&Path> {
    path.parent().filter(|p| !p.as_os_str().is_empty())
}

fn write_csv_atomic(path: &Path, records: &[ListingRecord]) -> Result<(), ScraperError> {
    let dir = match non_empty_parent(path) {
        Some(parent) => {
            fs::create_dir_all(parent)?;
            parent
        }
        None => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        // ヘッダーはレコード0件でも必ず書く
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(&mut tmp);
        writer.write_record(CSV_HEADER)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| ScraperError::FileIO(e.error))?;

    debug!("Wrote {} rows to {:?}", records.len(), path);
    Ok(())
}
