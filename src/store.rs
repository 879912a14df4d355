use std::{
    fs,
    path::{Path, PathBuf},
};

use csv::StringRecord;
use tracing::{debug, info};

use crate::{
    error::StoreError,
    event::{Category, Event, normalize_date, normalize_ws},
};

/// Column order of the persisted table.
pub const COLUMNS: [&str; 9] = [
    "name",
    "country",
    "start_date",
    "end_date",
    "location",
    "description",
    "category",
    "source_url",
    "created_at",
];

/// The CSV file accumulated events live in. Every write replaces the whole table.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Store { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every row. A missing file is an empty store; missing columns and values read as empty.
    pub fn load(&self) -> Result<Vec<Event>, StoreError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "store absent, starting empty");
            return Ok(Vec::new());
        }
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| self.csv_err(e))?;
        let headers = reader.headers().map_err(|e| self.csv_err(e))?.clone();
        let index: Vec<Option<usize>> = COLUMNS
            .iter()
            .map(|col| headers.iter().position(|h| h.trim() == *col))
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| self.csv_err(e))?;
            rows.push(row_to_event(&record, &index));
        }
        debug!(path = %self.path.display(), rows = rows.len(), "loaded store");
        Ok(rows)
    }

    /// Write the whole table, replacing the file. Creates parent directories as needed.
    pub fn save(&self, events: &[Event]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }
        let tmp = self.tmp_path();
        {
            let mut writer = csv::Writer::from_path(&tmp).map_err(|e| self.csv_err(e))?;
            writer.write_record(COLUMNS).map_err(|e| self.csv_err(e))?;
            for ev in events {
                writer
                    .write_record([
                        ev.name.as_str(),
                        ev.country.as_str(),
                        ev.start_date.as_str(),
                        ev.end_date.as_str(),
                        ev.location.as_str(),
                        ev.description.as_str(),
                        ev.category_label(),
                        ev.source_url.as_str(),
                        ev.created_at.as_str(),
                    ])
                    .map_err(|e| self.csv_err(e))?;
            }
            writer.flush().map_err(|e| self.io_err(e))?;
        }
        fs::rename(&tmp, &self.path).map_err(|e| self.io_err(e))?;
        info!(path = %self.path.display(), rows = events.len(), "saved store");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn csv_err(&self, source: csv::Error) -> StoreError {
        StoreError::Csv {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn io_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

/// Every row is kept, even one missing its name or country, so a later save writes it back.
/// Dates are re-normalised so hand-edited rows cannot smuggle free text into the table.
fn row_to_event(record: &StringRecord, index: &[Option<usize>]) -> Event {
    let col = |i: usize| {
        index[i]
            .and_then(|idx| record.get(idx))
            .unwrap_or("")
            .to_string()
    };
    Event {
        name: col(0),
        country: normalize_ws(&col(1)),
        start_date: normalize_date(&col(2)),
        end_date: normalize_date(&col(3)),
        location: col(4),
        description: col(5),
        category: Category::from_label(&col(6)),
        source_url: col(7),
        created_at: col(8),
    }
}
