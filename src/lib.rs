//! Harvests partnership actions from the UN SDGs partnership catalogue into a
//! spreadsheet table, one listing page at a time.

pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod harvest;
pub mod links;
pub mod record;
pub mod store;
pub mod text;

pub use error::{HarvestError, Result};
pub use extract::extract;
pub use fetch::Fetcher;
pub use harvest::{Harvester, PageReport, RunSummary};
pub use record::{ActionRecord, Column};
pub use store::{CsvTableStore, FileStore, Table, TableStore, XlsxTableStore};
