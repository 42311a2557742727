//! Export artifacts for the saved list.
//!
//! Two formats: a CSV of product numbers with their recognition time, and a
//! pipe-delimited table carrying quantity, unit and expiration date. Files
//! are written with a timestamp-suffixed name so repeated exports never
//! overwrite each other.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Local};

use crate::store::InventoryRecord;

const CSV_HEADER: &str = "품번,인식시간";
const TABLE_HEADER: &str = "품번 | 수량 | 단위 | 유통기한";

/// CSV body: one row per record, newest-first order preserved from `list()`.
pub fn to_csv(records: &[InventoryRecord]) -> String {
    let mut out = String::from(CSV_HEADER);
    for record in records {
        out.push('\n');
        out.push_str(&format!(
            "{},{}",
            record.product_number,
            record
                .created_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
        ));
    }
    out.push('\n');
    out
}

/// Pipe-delimited table body; a missing expiration date is rendered `-`.
pub fn to_table(records: &[InventoryRecord]) -> String {
    let mut out = String::from(TABLE_HEADER);
    for record in records {
        out.push('\n');
        out.push_str(&format!(
            "{} | {} | {} | {}",
            record.product_number,
            record.quantity,
            record.packaging_unit,
            record.expiration_date.as_deref().unwrap_or("-")
        ));
    }
    out.push('\n');
    out
}

/// Export file name: `품번목록_<YYYYMMDD_HHMMSS>.<ext>`.
pub fn export_filename(at: DateTime<Local>, extension: &str) -> String {
    format!("품번목록_{}.{}", at.format("%Y%m%d_%H%M%S"), extension)
}

/// Writes the CSV artifact into `dir`. Refuses an empty list so the caller
/// can tell "nothing to export" apart from a write failure.
pub fn write_csv(dir: &Path, records: &[InventoryRecord]) -> Result<PathBuf> {
    write_artifact(dir, records, "csv", to_csv)
}

/// Writes the pipe-delimited table artifact into `dir`.
pub fn write_table(dir: &Path, records: &[InventoryRecord]) -> Result<PathBuf> {
    write_artifact(dir, records, "txt", to_table)
}

fn write_artifact(
    dir: &Path,
    records: &[InventoryRecord],
    extension: &str,
    render: fn(&[InventoryRecord]) -> String,
) -> Result<PathBuf> {
    if records.is_empty() {
        return Err(anyhow!("Nothing to export: the saved list is empty"));
    }

    let path = dir.join(export_filename(Local::now(), extension));
    let mut file = File::create(&path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;
    file.write_all(render(records).as_bytes())
        .context("Failed to write export data")?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    fn record(id: i64, product_number: &str, expiration: Option<&str>) -> InventoryRecord {
        InventoryRecord {
            id,
            product_number: product_number.to_string(),
            packaging_unit: "카톤".to_string(),
            quantity: 5,
            expiration_date: expiration.map(str::to_string),
            created_at: Utc.with_ymd_and_hms(2025, 12, 1, 3, 4, 5).unwrap(),
        }
    }

    #[test]
    fn test_csv_has_header_and_rows() {
        let records = [record(1, "8801234567", None), record(2, "1234", None)];
        let csv = to_csv(&records);
        let lines: Vec<_> = csv.lines().collect();

        assert_eq!(lines[0], "품번,인식시간");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("8801234567,"));
        assert!(lines[2].starts_with("1234,"));
    }

    #[test]
    fn test_table_renders_missing_expiration_as_dash() {
        let records = [record(1, "8801234567", Some("20251201")), record(2, "1234", None)];
        let table = to_table(&records);
        let lines: Vec<_> = table.lines().collect();

        assert_eq!(lines[0], "품번 | 수량 | 단위 | 유통기한");
        assert_eq!(lines[1], "8801234567 | 5 | 카톤 | 20251201");
        assert_eq!(lines[2], "1234 | 5 | 카톤 | -");
    }

    #[test]
    fn test_filename_is_timestamp_suffixed() {
        let at = Local.with_ymd_and_hms(2025, 12, 1, 13, 14, 15).unwrap();
        assert_eq!(export_filename(at, "csv"), "품번목록_20251201_131415.csv");
    }

    #[test]
    fn test_write_csv_creates_file() {
        let dir = tempdir().unwrap();
        let records = [record(1, "8801234567", None)];

        let path = write_csv(dir.path(), &records).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("품번,인식시간"));
        assert!(content.contains("8801234567"));
    }

    #[test]
    fn test_write_csv_refuses_empty_list() {
        let dir = tempdir().unwrap();
        assert!(write_csv(dir.path(), &[]).is_err());
    }

    #[test]
    fn test_write_table_creates_txt_file() {
        let dir = tempdir().unwrap();
        let records = [record(1, "8801234567", Some("20251201"))];

        let path = write_table(dir.path(), &records).unwrap();
        assert_eq!(path.extension().unwrap(), "txt");
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("품번 | 수량 | 단위 | 유통기한"));
    }
}
