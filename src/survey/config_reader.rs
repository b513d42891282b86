use log::debug;
use snafu::prelude::*;
use std::fs;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

use survey_cleaning::CleaningRules;

use crate::survey::{BSurveyResult, OpeningJsonSnafu, ParsingJsonSnafu};

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurveyConfig {
    #[serde(rename = "inputFile")]
    pub input_file: Option<String>,
    #[serde(rename = "outputFile")]
    pub output_file: Option<String>,
    #[serde(rename = "inputType")]
    pub input_type: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    #[serde(rename = "usernameColumn")]
    pub username_column: Option<String>,
    #[serde(rename = "emailColumn")]
    pub email_column: Option<String>,
    #[serde(rename = "excludedUsername")]
    pub excluded_username: Option<String>,
    #[serde(rename = "summaryFile")]
    pub summary_file: Option<String>,
}

impl SurveyConfig {
    pub fn rules(&self) -> CleaningRules {
        let default = CleaningRules::default();
        CleaningRules {
            username_column: self
                .username_column
                .clone()
                .unwrap_or(default.username_column),
            email_column: self.email_column.clone().unwrap_or(default.email_column),
            excluded_username: self
                .excluded_username
                .clone()
                .unwrap_or(default.excluded_username),
        }
    }
}

pub fn read_config(path: &str) -> BSurveyResult<SurveyConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    debug!("read config: {:?}", contents);
    let config: SurveyConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}

pub fn read_summary(path: &str) -> BSurveyResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}
