use std::{
    fs::File,
    path::{Path, PathBuf},
};

use calamine::{Data, Reader, Xlsx, open_workbook};
use rust_xlsxwriter::{Workbook, Worksheet};
use tracing::debug;

use super::{Table, TableStore, commit, create_parent, table_exists, tmp_path};
use crate::{
    error::{HarvestError, Result},
    record::{ActionRecord, Column},
};

pub const SHEET_NAME: &str = "Sheet1";

/// One-sheet xlsx workbook store. Reads the first sheet, writes a single
/// sheet named [`SHEET_NAME`], rewriting the whole workbook on every save.
#[derive(Debug, Clone)]
pub struct XlsxTableStore {
    path: PathBuf,
}

impl XlsxTableStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, table: &Table) -> Result<()> {
        create_parent(&self.path)?;

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet
            .set_name(SHEET_NAME)
            .map_err(|e| HarvestError::xlsx_write(&self.path, e))?;
        self.write_row(sheet, 0, &table.headers, None)?;

        let page_col = table
            .headers
            .iter()
            .position(|h| h == Column::Page.as_str());
        for (i, row) in table.rows.iter().enumerate() {
            let row_num = u32::try_from(i + 1)
                .map_err(|_| HarvestError::corrupt(&self.path, "too many rows for a worksheet"))?;
            self.write_row(sheet, row_num, row, page_col)?;
        }

        let tmp = tmp_path(&self.path);
        let mut file = File::create(&tmp).map_err(|e| HarvestError::io(&tmp, e))?;
        workbook
            .save_to_writer(&mut file)
            .map_err(|e| HarvestError::xlsx_write(&tmp, e))?;
        commit(file, &tmp, &self.path)?;

        debug!(path = %self.path.display(), rows = table.len(), "workbook saved");
        Ok(())
    }

    /// Page numbers go in as numbers, everything else as text.
    fn write_row(
        &self,
        sheet: &mut Worksheet,
        row_num: u32,
        cells: &[String],
        page_col: Option<usize>,
    ) -> Result<()> {
        for (i, cell) in cells.iter().enumerate() {
            let col = u16::try_from(i).map_err(|_| {
                HarvestError::corrupt(&self.path, "too many columns for a worksheet")
            })?;
            let page = (page_col == Some(i))
                .then(|| cell.trim().parse::<u32>().ok())
                .flatten();
            let written = match page {
                Some(n) => sheet.write_number(row_num, col, f64::from(n)),
                None => sheet.write_string(row_num, col, cell.as_str()),
            };
            written.map_err(|e| HarvestError::xlsx_write(&self.path, e))?;
        }
        Ok(())
    }
}

impl TableStore for XlsxTableStore {
    fn load(&self) -> Result<Table> {
        let path = &self.path;
        if !table_exists(path)? {
            return Ok(Table::default());
        }

        let mut workbook: Xlsx<_> =
            open_workbook(path).map_err(|e| HarvestError::xlsx_read(path, e))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| HarvestError::corrupt(path, "workbook has no sheets"))?
            .map_err(|e| HarvestError::xlsx_read(path, e))?;

        let mut rows = range
            .rows()
            .map(|row| row.iter().map(cell_text).collect::<Vec<String>>());

        let mut headers = rows.next().unwrap_or_default();
        while headers.last().is_some_and(String::is_empty) {
            headers.pop();
        }

        let width = headers.len();
        let rows: Vec<Vec<String>> = rows
            .filter(|row| row.iter().any(|c| !c.is_empty()))
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();

        let table = Table::from_stored(path, headers, rows)?;
        debug!(path = %path.display(), rows = table.len(), "workbook loaded");
        Ok(table)
    }

    fn append_and_save(&self, table: &mut Table, records: Vec<ActionRecord>) -> Result<()> {
        table.append(records);
        self.save(table)
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}
