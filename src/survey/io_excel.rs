// Reading survey exports saved as Excel workbooks.

use calamine::{open_workbook, DataType, Range, Reader, Xlsx};
use log::debug;
use snafu::prelude::*;
use std::path::Path;

use survey_cleaning::{Record, Table};

use crate::survey::{
    AmbiguousWorksheetSnafu, BSurveyResult, EmptyExcelSnafu, ExcelWrongCellTypeSnafu,
    OpeningExcelSnafu, SurveyResult,
};

/// Reads the first row as headers and every non-empty row after it as a record.
pub fn read_excel_table(path: &Path, worksheet_name: Option<&str>) -> BSurveyResult<Table> {
    let wrange = get_range(path, worksheet_name)?;
    range_to_table(&wrange)
}

fn get_range(path: &Path, worksheet_name_o: Option<&str>) -> BSurveyResult<Range<DataType>> {
    let path_s = path.display().to_string();
    debug!(
        "read_excel_table: path: {:?} worksheet: {:?}",
        &path_s, &worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu {
        path: path_s.clone(),
    })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(worksheet_name)
            .context(EmptyExcelSnafu {})?
            .context(OpeningExcelSnafu { path: path_s })?;
        return Ok(wrange);
    }

    let mut all_worksheets = workbook.worksheets();
    match all_worksheets.len() {
        0 => Err(Box::new(EmptyExcelSnafu {}.build())),
        1 => {
            let (worksheet_name, wrange) = all_worksheets.remove(0);
            debug!("read_excel_table: using worksheet {:?}", worksheet_name);
            Ok(wrange)
        }
        _ => Err(Box::new(
            AmbiguousWorksheetSnafu {
                path: path_s,
                names: all_worksheets
                    .into_iter()
                    .map(|(name, _)| name)
                    .collect::<Vec<String>>(),
            }
            .build(),
        )),
    }
}

fn range_to_table(wrange: &Range<DataType>) -> BSurveyResult<Table> {
    let mut rows = wrange.rows();
    let header = rows.next().context(EmptyExcelSnafu {})?;
    let headers: Vec<String> = header
        .iter()
        .map(|cell| cell_to_string(cell, 1))
        .collect::<SurveyResult<Vec<String>>>()?;
    debug!("read_excel_table: headers: {:?}", headers);

    let mut records: Vec<Record> = Vec::new();
    for (idx, row) in rows.enumerate() {
        // Excel rows are numbered from 1 and the header takes the first one.
        let lineno = (idx + 2) as u64;
        let values: Vec<String> = row
            .iter()
            .map(|cell| cell_to_string(cell, lineno))
            .collect::<SurveyResult<Vec<String>>>()?;
        if values.iter().all(|v| v.trim().is_empty()) {
            debug!("read_excel_table: skipping empty row {}", lineno);
            continue;
        }
        records.push(Record::from_values(&headers, values));
    }
    Ok(Table { headers, records })
}

pub fn cell_to_string(cell: &DataType, lineno: u64) -> SurveyResult<String> {
    match cell {
        DataType::String(s) => Ok(s.clone()),
        DataType::Int(i) => Ok(i.to_string()),
        DataType::Float(f) | DataType::DateTime(f) => Ok(float_to_string(*f)),
        DataType::Bool(b) => Ok(b.to_string()),
        DataType::Empty => Ok(String::new()),
        _ => ExcelWrongCellTypeSnafu {
            lineno,
            content: format!("{:?}", cell),
        }
        .fail(),
    }
}

// Integral values are printed without a fractional part, the way a spreadsheet shows them.
fn float_to_string(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}
