use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use super::error::InvalidOptionError;
use super::responses::{ResponseCollector, ResponseSet};
use super::taxonomy::{OptionSymbol, QuestionId, Taxonomy};

#[derive(Debug, thiserror::Error)]
pub enum ResponseImportError {
    #[error("failed to read response export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid response CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: {source}")]
    InvalidRow {
        row: usize,
        #[source]
        source: InvalidOptionError,
    },
}

#[derive(Debug, Deserialize)]
struct ResponseRow {
    question_id: String,
    option: String,
}

/// Loads a `question_id,option` CSV export into a validated response set.
///
/// Rows are applied in file order, so a later row for the same question revises the earlier one.
pub struct ResponseImporter;

impl ResponseImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        taxonomy: Arc<Taxonomy>,
    ) -> Result<ResponseSet, ResponseImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, taxonomy)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        taxonomy: Arc<Taxonomy>,
    ) -> Result<ResponseSet, ResponseImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut collector = ResponseCollector::new(taxonomy);

        for (index, row) in csv_reader.deserialize::<ResponseRow>().enumerate() {
            let row = row?;
            // Header is line 1.
            let line = index + 2;
            let option = OptionSymbol::parse(&row.option)
                .map_err(|source| ResponseImportError::InvalidRow { row: line, source })?;
            collector
                .record(QuestionId(row.question_id), option)
                .map_err(|source| ResponseImportError::InvalidRow { row: line, source })?;
        }

        Ok(collector.snapshot())
    }
}
