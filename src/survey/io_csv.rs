// Primitives for reading and writing CSV files.

use log::debug;
use snafu::prelude::*;
use std::fs;
use std::path::Path;

use survey_cleaning::csv_text::{parse_table, write_table};
use survey_cleaning::Table;

use crate::survey::{BSurveyResult, ReadingInputSnafu, WritingOutputSnafu};

/// Reads the whole file. A leading byte-order mark is dropped by the parser.
pub fn read_csv_table(path: &Path) -> BSurveyResult<Table> {
    let contents = fs::read_to_string(path).context(ReadingInputSnafu {
        path: path.display().to_string(),
    })?;
    debug!("read_csv_table: {:?}: {} bytes", path, contents.len());
    Ok(parse_table(&contents))
}

/// Writes the table as UTF-8, without a byte-order mark.
pub fn write_csv_table(path: &Path, table: &Table) -> BSurveyResult<()> {
    let contents = write_table(table);
    fs::write(path, contents).context(WritingOutputSnafu {
        path: path.display().to_string(),
    })?;
    Ok(())
}
