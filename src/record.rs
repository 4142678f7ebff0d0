use crate::error::{HarvestError, Result};

/// Written in place of an absent value or an empty list.
pub const ABSENT: &str = "-";

/// Separator for multi-valued cells. Commas inside a value are not escaped,
/// so such a value reads back as several.
pub const LIST_SEP: &str = ",";

/// One column of the output table, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Page,
    Title,
    Initiator,
    ActionId,
    Type,
    StartTime,
    EndTime,
    Countries,
    Region,
    GeographicalCoverage,
    Sdgs,
}

impl Column {
    pub const ALL: [Column; 11] = [
        Column::Page,
        Column::Title,
        Column::Initiator,
        Column::ActionId,
        Column::Type,
        Column::StartTime,
        Column::EndTime,
        Column::Countries,
        Column::Region,
        Column::GeographicalCoverage,
        Column::Sdgs,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Column::Page => "Page",
            Column::Title => "Title",
            Column::Initiator => "Initiator",
            Column::ActionId => "ActionID",
            Column::Type => "Type",
            Column::StartTime => "StartTime",
            Column::EndTime => "EndTime",
            Column::Countries => "Countries",
            Column::Region => "Region",
            Column::GeographicalCoverage => "GeographicalCoverage",
            Column::Sdgs => "SDGs",
        }
    }

    pub fn from_header(name: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.as_str() == name)
    }

    pub fn headers() -> Vec<String> {
        Column::ALL.iter().map(|c| c.as_str().to_string()).collect()
    }
}

/// One catalogued action. Absence stays explicit here and only becomes
/// [`ABSENT`] when the record is turned into cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionRecord {
    pub page: u32,
    pub title: Option<String>,
    pub initiator: Option<String>,
    pub action_id: Option<String>,
    pub kind: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub countries: Vec<String>,
    pub region: Vec<String>,
    pub geographical_coverage: Option<String>,
    pub sdgs: Vec<String>,
}

impl ActionRecord {
    pub fn cell(&self, column: Column) -> String {
        match column {
            Column::Page => self.page.to_string(),
            Column::Title => scalar_cell(&self.title),
            Column::Initiator => scalar_cell(&self.initiator),
            Column::ActionId => scalar_cell(&self.action_id),
            Column::Type => scalar_cell(&self.kind),
            Column::StartTime => scalar_cell(&self.start_time),
            Column::EndTime => scalar_cell(&self.end_time),
            Column::Countries => list_cell(&self.countries),
            Column::Region => list_cell(&self.region),
            Column::GeographicalCoverage => scalar_cell(&self.geographical_coverage),
            Column::Sdgs => list_cell(&self.sdgs),
        }
    }

    /// Cells in the order of `headers`; unknown headers get an empty cell.
    pub fn to_cells(&self, headers: &[String]) -> Vec<String> {
        headers
            .iter()
            .map(|h| Column::from_header(h).map(|c| self.cell(c)).unwrap_or_default())
            .collect()
    }

    pub fn from_cells(headers: &[String], row: &[String]) -> Result<Self> {
        let get = |column: Column| cell_at(headers, row, column);

        let page_cell = get(Column::Page)?;
        let page = page_cell.trim().parse::<u32>().map_err(|_| {
            HarvestError::MalformedRow(format!("page `{page_cell}` is not a number"))
        })?;

        Ok(Self {
            page,
            title: parse_scalar(get(Column::Title)?),
            initiator: parse_scalar(get(Column::Initiator)?),
            action_id: parse_scalar(get(Column::ActionId)?),
            kind: parse_scalar(get(Column::Type)?),
            start_time: parse_scalar(get(Column::StartTime)?),
            end_time: parse_scalar(get(Column::EndTime)?),
            countries: parse_list(get(Column::Countries)?),
            region: parse_list(get(Column::Region)?),
            geographical_coverage: parse_scalar(get(Column::GeographicalCoverage)?),
            sdgs: parse_list(get(Column::Sdgs)?),
        })
    }
}

fn cell_at<'a>(headers: &[String], row: &'a [String], column: Column) -> Result<&'a str> {
    headers
        .iter()
        .position(|h| h == column.as_str())
        .and_then(|i| row.get(i))
        .map(String::as_str)
        .ok_or_else(|| HarvestError::MalformedRow(format!("missing {}", column.as_str())))
}

fn scalar_cell(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| ABSENT.to_string())
}

fn list_cell(values: &[String]) -> String {
    if values.is_empty() {
        ABSENT.to_string()
    } else {
        values.join(LIST_SEP)
    }
}

fn parse_scalar(cell: &str) -> Option<String> {
    (cell != ABSENT).then(|| cell.to_string())
}

fn parse_list(cell: &str) -> Vec<String> {
    if cell == ABSENT {
        return Vec::new();
    }
    cell.split(LIST_SEP).map(str::to_string).collect()
}
