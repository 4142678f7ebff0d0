use std::{
    fs::File,
    path::{Path, PathBuf},
};

use tracing::debug;

use super::{Table, TableStore, commit, create_parent, table_exists, tmp_path};
use crate::{
    error::{HarvestError, Result},
    record::ActionRecord,
};

/// CSV file store. The file is rewritten in full on every save.
#[derive(Debug, Clone)]
pub struct CsvTableStore {
    path: PathBuf,
}

impl CsvTableStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, table: &Table) -> Result<()> {
        create_parent(&self.path)?;

        let tmp = tmp_path(&self.path);
        let file = File::create(&tmp).map_err(|e| HarvestError::io(&tmp, e))?;
        let mut w = csv::Writer::from_writer(file);
        w.write_record(&table.headers)
            .map_err(|e| HarvestError::csv(&tmp, e))?;
        for row in &table.rows {
            w.write_record(row).map_err(|e| HarvestError::csv(&tmp, e))?;
        }
        let file = w
            .into_inner()
            .map_err(|e| HarvestError::io(&tmp, e.into_error()))?;
        commit(file, &tmp, &self.path)?;

        debug!(path = %self.path.display(), rows = table.len(), "table saved");
        Ok(())
    }
}

impl TableStore for CsvTableStore {
    fn load(&self) -> Result<Table> {
        let path = &self.path;
        if !table_exists(path)? {
            return Ok(Table::default());
        }

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(|e| HarvestError::csv(path, e))?;

        let headers: Vec<String> = rdr
            .headers()
            .map_err(|e| HarvestError::csv(path, e))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(|e| HarvestError::csv(path, e))?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        let table = Table::from_stored(path, headers, rows)?;
        debug!(path = %path.display(), rows = table.len(), "table loaded");
        Ok(table)
    }

    fn append_and_save(&self, table: &mut Table, records: Vec<ActionRecord>) -> Result<()> {
        table.append(records);
        self.save(table)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::record::Column;
    use tempfile::TempDir;

    fn record(page: u32, title: &str) -> ActionRecord {
        ActionRecord {
            page,
            title: Some(title.into()),
            action_id: Some(format!("ID-{page}-{title}")),
            countries: vec!["Kenya".into(), "Chad".into()],
            sdgs: vec!["1".into()],
            ..Default::default()
        }
    }

    #[test]
    fn missing_file_gives_empty_canonical_table() {
        let dir = TempDir::new().unwrap();
        let store = CsvTableStore::new(dir.path().join("results.csv"));
        let table = store.load().unwrap();
        assert!(table.is_empty());
        assert_eq!(
            table.headers,
            [
                "Page",
                "Title",
                "Initiator",
                "ActionID",
                "Type",
                "StartTime",
                "EndTime",
                "Countries",
                "Region",
                "GeographicalCoverage",
                "SDGs"
            ]
        );
    }

    #[test]
    fn round_trip_preserves_records_and_order() {
        let dir = TempDir::new().unwrap();
        let store = CsvTableStore::new(dir.path().join("results.csv"));

        let written = vec![record(1, "a"), record(1, "b, with comma"), record(2, "c")];
        let mut table = store.load().unwrap();
        store.append_and_save(&mut table, written.clone()).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.headers, Column::headers());
        assert_eq!(loaded.records().unwrap(), written);
    }

    #[test]
    fn appends_after_existing_rows_without_dedup() {
        let dir = TempDir::new().unwrap();
        let store = CsvTableStore::new(dir.path().join("results.csv"));

        let mut table = store.load().unwrap();
        store.append_and_save(&mut table, vec![record(1, "a")]).unwrap();
        let mut table = store.load().unwrap();
        store
            .append_and_save(&mut table, vec![record(1, "a"), record(2, "b")])
            .unwrap();

        let titles: Vec<String> = store
            .load()
            .unwrap()
            .records()
            .unwrap()
            .into_iter()
            .filter_map(|r| r.title)
            .collect();
        assert_eq!(titles, ["a", "a", "b"]);
    }

    #[test]
    fn stored_column_order_is_kept() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.csv");
        fs::write(
            &path,
            "SDGs,Page,Title,Initiator,ActionID,Type,StartTime,EndTime,Countries,Region,GeographicalCoverage,Notes\n\
             3,7,Old,-,-,-,-,-,-,-,-,kept\n",
        )
        .unwrap();

        let store = CsvTableStore::new(&path);
        let mut table = store.load().unwrap();
        assert_eq!(table.headers[0], "SDGs");
        store.append_and_save(&mut table, vec![record(8, "new")]).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = raw.lines().collect();
        assert!(lines[0].starts_with("SDGs,Page,Title"));
        assert_eq!(lines[1], "3,7,Old,-,-,-,-,-,-,-,-,kept");
        assert_eq!(lines[2], "1,8,new,-,ID-8-new,-,-,-,\"Kenya,Chad\",-,-,");
    }

    #[test]
    fn missing_columns_are_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.csv");
        fs::write(&path, "Page,Title\n1,x\n").unwrap();
        let err = CsvTableStore::new(&path).load().unwrap_err();
        assert!(matches!(err, HarvestError::Corrupt { .. }));
    }

    #[test]
    fn ragged_rows_are_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.csv");
        let mut body = Column::headers().join(",");
        body.push_str("\n1,2,3\n");
        fs::write(&path, body).unwrap();
        let err = CsvTableStore::new(&path).load().unwrap_err();
        assert!(matches!(err, HarvestError::Csv { .. }));
    }

    #[test]
    fn save_leaves_no_temp_file_and_creates_parent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("results.csv");
        let store = CsvTableStore::new(&path);
        let mut table = store.load().unwrap();
        store.append_and_save(&mut table, Vec::new()).unwrap();

        assert!(path.exists());
        assert!(!dir.path().join("out").join("results.csv.tmp").exists());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_replaces_the_previous_file_in_full() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.csv");
        let store = CsvTableStore::new(&path);

        let mut table = store.load().unwrap();
        store
            .append_and_save(&mut table, vec![record(1, "a"), record(1, "b")])
            .unwrap();
        let first = fs::read_to_string(&path).unwrap();

        store.append_and_save(&mut table, vec![record(2, "c")]).unwrap();
        let second = fs::read_to_string(&path).unwrap();

        assert!(second.starts_with(&first));
        assert_eq!(second.lines().count(), 4);
        assert!(second.ends_with('\n'));
    }
}
