use std::{
    ffi::OsString,
    fs::{self, File},
    path::{Path, PathBuf},
};

use crate::{
    error::{HarvestError, Result},
    record::{ActionRecord, Column},
};

mod csv_file;
mod xlsx_file;

pub use csv_file::CsvTableStore;
pub use xlsx_file::{SHEET_NAME, XlsxTableStore};

/// The whole output table held in memory: header row plus data rows, both in
/// the column order found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            headers: Column::headers(),
            rows: Vec::new(),
        }
    }
}

impl Table {
    /// Table read back from `path`. Every canonical column must be present;
    /// extra columns and their order are kept as found.
    fn from_stored(path: &Path, headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        let missing: Vec<&str> = Column::ALL
            .iter()
            .map(|c| c.as_str())
            .filter(|name| !headers.iter().any(|h| h == name))
            .collect();
        if !missing.is_empty() {
            return Err(HarvestError::corrupt(
                path,
                format!("missing columns: {}", missing.join(", ")),
            ));
        }
        Ok(Self { headers, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append records after the existing rows, in this table's column order.
    pub fn append(&mut self, records: impl IntoIterator<Item = ActionRecord>) {
        let headers = &self.headers;
        self.rows
            .extend(records.into_iter().map(|r| r.to_cells(headers)));
    }

    pub fn records(&self) -> Result<Vec<ActionRecord>> {
        self.rows
            .iter()
            .map(|row| ActionRecord::from_cells(&self.headers, row))
            .collect()
    }
}

/// Persistence seam for the page loop.
pub trait TableStore {
    fn load(&self) -> Result<Table>;

    /// Append `records` to `table` and persist the whole table.
    fn append_and_save(&self, table: &mut Table, records: Vec<ActionRecord>) -> Result<()>;
}

/// Output file store picked from the path: `.csv` gets CSV, anything else
/// gets a one-sheet xlsx workbook.
#[derive(Debug, Clone)]
pub enum FileStore {
    Csv(CsvTableStore),
    Xlsx(XlsxTableStore),
}

impl FileStore {
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv {
            Self::Csv(CsvTableStore::new(path))
        } else {
            Self::Xlsx(XlsxTableStore::new(path))
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Csv(s) => s.path(),
            Self::Xlsx(s) => s.path(),
        }
    }
}

impl TableStore for FileStore {
    fn load(&self) -> Result<Table> {
        match self {
            Self::Csv(s) => s.load(),
            Self::Xlsx(s) => s.load(),
        }
    }

    fn append_and_save(&self, table: &mut Table, records: Vec<ActionRecord>) -> Result<()> {
        match self {
            Self::Csv(s) => s.append_and_save(table, records),
            Self::Xlsx(s) => s.append_and_save(table, records),
        }
    }
}

/// `Ok(false)` only when the file is known not to exist. Any other metadata
/// failure is an error.
fn table_exists(path: &Path) -> Result<bool> {
    path.try_exists().map_err(|e| HarvestError::io(path, e))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn create_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| HarvestError::io(parent, e))
        }
        _ => Ok(()),
    }
}

/// Flush `file` (already written at `tmp`) to disk, then move it over `path`.
fn commit(file: File, tmp: &Path, path: &Path) -> Result<()> {
    file.sync_all().map_err(|e| HarvestError::io(tmp, e))?;
    drop(file);
    fs::rename(tmp, path).map_err(|e| HarvestError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn extension_picks_the_format() {
        assert!(matches!(FileStore::for_path("out/results.csv"), FileStore::Csv(_)));
        assert!(matches!(FileStore::for_path("RESULTS.CSV"), FileStore::Csv(_)));
        assert!(matches!(FileStore::for_path("results.xlsx"), FileStore::Xlsx(_)));
        assert!(matches!(FileStore::for_path("results"), FileStore::Xlsx(_)));
    }

    #[test]
    fn tmp_file_sits_next_to_the_table() {
        assert_eq!(
            tmp_path(Path::new("out/results.xlsx")),
            PathBuf::from("out/results.xlsx.tmp")
        );
    }

    #[test]
    fn unreadable_location_is_not_treated_as_missing() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "x").unwrap();
        let path = blocker.join("results.xlsx");

        assert!(matches!(table_exists(&path), Err(HarvestError::Io { .. })));
        for store in [FileStore::for_path(&path), FileStore::for_path(blocker.join("r.csv"))] {
            assert!(matches!(store.load(), Err(HarvestError::Io { .. })));
        }
    }

    #[test]
    fn absent_file_is_missing() {
        let dir = TempDir::new().unwrap();
        assert!(!table_exists(&dir.path().join("results.xlsx")).unwrap());
    }
}
