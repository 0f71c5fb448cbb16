//! Read-only utilisation reporting over the ledger and identifier space.
//!
//! For every allowed extension the reporter compares the number of issued
//! identifiers against the namespace capacity, and appends a `TOTAL` row
//! measured against `capacity × number of extensions`. Rows are sorted
//! ascending by used count, with the TOTAL row participating in the sort,
//! so the busiest namespaces end up at the bottom of the table.
//!
//! Capacity arithmetic stays in exact integers; the percentage is the only
//! floating-point value and is rounded to one decimal for display only.

use crate::ledger::UsageLedger;
use crate::space::IdentifierSpace;
use crate::{DropError, DropResult};
use filedrop_types::Extension;
use std::fs;
use std::path::{Path, PathBuf};

/// Label used for the aggregate row.
pub const TOTAL_LABEL: &str = "TOTAL";

/// One row of the utilisation report.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct UsageRow {
    /// Extension in canonical form, or [`TOTAL_LABEL`] for the aggregate.
    pub label: String,
    /// Identifiers issued.
    pub used: u64,
    /// Slots remaining (`total − used`, floored at zero once overwrites
    /// push the record count past capacity). The TOTAL row carries the sum
    /// of the per-extension values, so the rows always sum to it.
    pub left: u128,
    /// Addressable capacity for this row.
    pub total: u128,
    /// `100 × used / total`, unrounded; render with one decimal.
    pub percent: f64,
}

/// The full utilisation report.
#[derive(Debug, Clone, serde::Serialize)]
pub struct UsageReport {
    /// Per-extension rows plus the TOTAL row, ascending by `used`.
    pub rows: Vec<UsageRow>,
    /// Flat size of the upload directory in bytes.
    pub upload_dir_bytes: u64,
}

impl UsageReport {
    /// The upload directory size in human-readable form, e.g. `3.4 KiB`.
    pub fn upload_dir_size(&self) -> String {
        humanise_bytes(self.upload_dir_bytes)
    }
}

/// Computes utilisation statistics. Purely read-only.
#[derive(Debug, Clone)]
pub struct DiagnosticsReporter {
    space: IdentifierSpace,
    ledger: UsageLedger,
    extensions: Vec<Extension>,
    upload_dir: PathBuf,
}

impl DiagnosticsReporter {
    pub fn new(
        space: IdentifierSpace,
        ledger: UsageLedger,
        extensions: Vec<Extension>,
        upload_dir: PathBuf,
    ) -> Self {
        Self {
            space,
            ledger,
            extensions,
            upload_dir,
        }
    }

    /// Builds the report.
    ///
    /// # Errors
    ///
    /// Propagates ledger read failures and capacity overflow.
    pub fn compute(&self) -> DropResult<UsageReport> {
        let capacity = self.space.capacity_per_extension()?;
        let grand_total = capacity
            .checked_mul(self.extensions.len() as u128)
            .ok_or_else(|| {
                DropError::Validation("total capacity across extensions overflows u128".into())
            })?;

        let mut rows = Vec::with_capacity(self.extensions.len() + 1);
        let mut total_used: u64 = 0;
        let mut total_left: u128 = 0;

        for extension in &self.extensions {
            let used = self.ledger.count_by_extension(extension)?;
            total_used += used;
            let row = make_row(extension.as_str(), used, capacity);
            total_left += row.left;
            rows.push(row);
        }

        // The TOTAL row's remaining slots are the sum of the per-row
        // (floored) values, not grand_total − total_used: once an extension
        // has accepted overwrites, its surplus records must not eat into
        // the slots other extensions still have free.
        let mut total_row = make_row(TOTAL_LABEL, total_used, grand_total);
        total_row.left = total_left;
        rows.push(total_row);

        // Ascending by usage; the TOTAL row sorts with the rest.
        rows.sort_by_key(|row| row.used);

        Ok(UsageReport {
            rows,
            upload_dir_bytes: flat_dir_size(&self.upload_dir),
        })
    }
}

fn make_row(label: &str, used: u64, total: u128) -> UsageRow {
    let left = total.saturating_sub(u128::from(used));
    let percent = if total == 0 {
        0.0
    } else {
        100.0 * used as f64 / total as f64
    };
    UsageRow {
        label: label.to_owned(),
        used,
        left,
        total,
        percent,
    }
}

/// Sums the sizes of the regular files directly inside `dir`.
///
/// A missing or unreadable directory counts as zero; diagnostics must not
/// fail because the upload directory has not been created yet.
fn flat_dir_size(dir: &Path) -> u64 {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };
    entries
        .flatten()
        .filter_map(|entry| entry.metadata().ok())
        .filter(|meta| meta.is_file())
        .map(|meta| meta.len())
        .sum()
}

/// Formats a byte count with binary units, one decimal place.
pub fn humanise_bytes(bytes: u64) -> String {
    let mut num = bytes as f64;
    for unit in ["", "Ki", "Mi", "Gi", "Ti"] {
        if num < 1024.0 {
            return format!("{num:.1} {unit}B");
        }
        num /= 1024.0;
    }
    format!("{num:.1} PiB")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn ext(s: &str) -> Extension {
        Extension::parse(s).unwrap()
    }

    fn reporter_in(temp: &TempDir, extensions: &[&str]) -> (DiagnosticsReporter, UsageLedger) {
        let space = IdentifierSpace::new("ab", 1, 2).unwrap(); // capacity 6
        let ledger = UsageLedger::new(&temp.path().join("ledger.tsv"));
        let reporter = DiagnosticsReporter::new(
            space,
            ledger.clone(),
            extensions.iter().map(|e| ext(e)).collect(),
            temp.path().join("uploads"),
        );
        (reporter, ledger)
    }

    #[test]
    fn test_rows_sum_to_total() {
        let temp = TempDir::new().unwrap();
        let (reporter, ledger) = reporter_in(&temp, &[".png", ".jpg", ".gif"]);

        ledger.insert("a", &ext(".png")).unwrap();
        ledger.insert("b", &ext(".png")).unwrap();
        ledger.insert("aa", &ext(".jpg")).unwrap();

        let report = reporter.compute().unwrap();
        let total = report
            .rows
            .iter()
            .find(|r| r.label == TOTAL_LABEL)
            .unwrap();

        let used_sum: u64 = report
            .rows
            .iter()
            .filter(|r| r.label != TOTAL_LABEL)
            .map(|r| r.used)
            .sum();
        let left_sum: u128 = report
            .rows
            .iter()
            .filter(|r| r.label != TOTAL_LABEL)
            .map(|r| r.left)
            .sum();

        assert_eq!(total.used, used_sum);
        assert_eq!(total.left, left_sum);
        assert_eq!(total.total, 18); // 6 per extension × 3 extensions
    }

    #[test]
    fn test_rows_sorted_ascending_by_used() {
        let temp = TempDir::new().unwrap();
        let (reporter, ledger) = reporter_in(&temp, &[".png", ".jpg"]);

        for id in ["a", "b", "aa"] {
            ledger.insert(id, &ext(".png")).unwrap();
        }
        ledger.insert("ab", &ext(".jpg")).unwrap();

        let report = reporter.compute().unwrap();
        let used: Vec<u64> = report.rows.iter().map(|r| r.used).collect();
        let mut sorted = used.clone();
        sorted.sort_unstable();
        assert_eq!(used, sorted);

        // TOTAL is the busiest row here, so it sorts last.
        assert_eq!(report.rows.last().unwrap().label, TOTAL_LABEL);
    }

    #[test]
    fn test_total_row_can_sort_into_the_middle() {
        let temp = TempDir::new().unwrap();
        let (reporter, ledger) = reporter_in(&temp, &[".png", ".jpg"]);

        // TOTAL used (1) ties with .png (1) and stays below nothing;
        // with .jpg at 0 the TOTAL row is not first.
        ledger.insert("a", &ext(".png")).unwrap();

        let report = reporter.compute().unwrap();
        assert_eq!(report.rows.first().unwrap().label, ".jpg");
        assert_ne!(report.rows.first().unwrap().label, TOTAL_LABEL);
    }

    #[test]
    fn test_percent_reflects_usage() {
        let temp = TempDir::new().unwrap();
        let (reporter, ledger) = reporter_in(&temp, &[".png"]);

        // 3 of 6 slots used.
        for id in ["a", "b", "aa"] {
            ledger.insert(id, &ext(".png")).unwrap();
        }

        let report = reporter.compute().unwrap();
        let png = report.rows.iter().find(|r| r.label == ".png").unwrap();
        assert!((png.percent - 50.0).abs() < f64::EPSILON);
        assert_eq!(format!("{:.1}", png.percent), "50.0");
    }

    #[test]
    fn test_empty_ledger_report() {
        let temp = TempDir::new().unwrap();
        let (reporter, _ledger) = reporter_in(&temp, &[".png", ".jpg"]);

        let report = reporter.compute().unwrap();
        assert!(report.rows.iter().all(|r| r.used == 0));
        assert!(report.rows.iter().all(|r| r.left == r.total));
        assert_eq!(report.upload_dir_bytes, 0);
    }

    #[test]
    fn test_left_floors_at_zero_after_overwrites() {
        let temp = TempDir::new().unwrap();
        let (reporter, ledger) = reporter_in(&temp, &[".png"]);

        // 7 records against capacity 6: one accepted collision.
        for id in ["a", "b", "aa", "ab", "ba", "bb", "a"] {
            ledger.insert(id, &ext(".png")).unwrap();
        }

        let report = reporter.compute().unwrap();
        let png = report.rows.iter().find(|r| r.label == ".png").unwrap();
        assert_eq!(png.used, 7);
        assert_eq!(png.left, 0);
    }

    #[test]
    fn test_left_sum_matches_total_after_overwrites() {
        let temp = TempDir::new().unwrap();
        let (reporter, ledger) = reporter_in(&temp, &[".png", ".jpg"]);

        // 7 records against capacity 6 on .png: one accepted collision.
        // .jpg stays empty, so its 6 slots are all that remain.
        for id in ["a", "b", "aa", "ab", "ba", "bb", "a"] {
            ledger.insert(id, &ext(".png")).unwrap();
        }

        let report = reporter.compute().unwrap();
        let total = report
            .rows
            .iter()
            .find(|r| r.label == TOTAL_LABEL)
            .unwrap();
        let left_sum: u128 = report
            .rows
            .iter()
            .filter(|r| r.label != TOTAL_LABEL)
            .map(|r| r.left)
            .sum();
        let used_sum: u64 = report
            .rows
            .iter()
            .filter(|r| r.label != TOTAL_LABEL)
            .map(|r| r.used)
            .sum();

        assert_eq!(total.used, used_sum);
        assert_eq!(total.left, left_sum);
        assert_eq!(total.left, 6);
    }

    #[test]
    fn test_upload_dir_flat_size() {
        let temp = TempDir::new().unwrap();
        let (reporter, _ledger) = reporter_in(&temp, &[".png"]);

        let uploads = temp.path().join("uploads");
        fs::create_dir_all(uploads.join("nested")).unwrap();
        fs::write(uploads.join("a.png"), vec![0u8; 100]).unwrap();
        fs::write(uploads.join("b.png"), vec![0u8; 24]).unwrap();
        // Nested files are not counted; the size is flat.
        fs::write(uploads.join("nested").join("c.png"), vec![0u8; 999]).unwrap();

        let report = reporter.compute().unwrap();
        assert_eq!(report.upload_dir_bytes, 124);
        assert_eq!(report.upload_dir_size(), "124.0 B");
    }

    #[test]
    fn test_humanise_bytes_units() {
        assert_eq!(humanise_bytes(0), "0.0 B");
        assert_eq!(humanise_bytes(1023), "1023.0 B");
        assert_eq!(humanise_bytes(1024), "1.0 KiB");
        assert_eq!(humanise_bytes(1536), "1.5 KiB");
        assert_eq!(humanise_bytes(5 * 1024 * 1024), "5.0 MiB");
        assert_eq!(humanise_bytes(3 * 1024 * 1024 * 1024), "3.0 GiB");
    }

    #[test]
    fn test_report_serialises() {
        let temp = TempDir::new().unwrap();
        let (reporter, _ledger) = reporter_in(&temp, &[".png"]);

        let report = reporter.compute().unwrap();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("TOTAL"));
        assert!(json.contains("upload_dir_bytes"));
    }
}
