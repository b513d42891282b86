use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use survey_cleaning::*;

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::survey::config_reader::*;
use crate::survey::io_common::*;

pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_excel;

pub const DEFAULT_INPUT_FILE: &str = "raw-survey.csv";
pub const DEFAULT_OUTPUT_FILE: &str = "processed-survey.csv";

#[derive(Debug, Snafu)]
pub enum SurveyError {
    #[snafu(display("Error reading input file {path}"))]
    ReadingInput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing file {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Empty Excel file or worksheet"))]
    EmptyExcel {},
    #[snafu(display("Excel file {path} has several worksheets {names:?}, one must be selected"))]
    AmbiguousWorksheet { path: String, names: Vec<String> },
    #[snafu(display("Excel cell of unsupported type at row {lineno}: {content}"))]
    ExcelWrongCellType { lineno: u64, content: String },
    #[snafu(display("Error opening JSON file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error serializing the summary to JSON"))]
    SerializingJson { source: serde_json::Error },
    #[snafu(display("Unknown input type {input_type:?}, expected csv or xlsx"))]
    UnknownInputType { input_type: String },
    #[snafu(display("Cannot locate the directory of the executable"))]
    MissingExecutableDir { source: std::io::Error },
    #[snafu(display("Cannot find the parent directory of {path}"))]
    MissingParentDir { path: String },
    #[snafu(display("Difference detected between calculated summary and reference summary"))]
    SummaryMismatch {},
}

pub type SurveyResult<T> = Result<T, SurveyError>;
pub type BSurveyResult<T> = Result<T, Box<SurveyError>>;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum InputType {
    Csv,
    Xlsx,
}

impl InputType {
    pub fn parse(s: &str) -> SurveyResult<InputType> {
        match s {
            "csv" => Ok(InputType::Csv),
            "xlsx" | "excel" => Ok(InputType::Xlsx),
            x => UnknownInputTypeSnafu { input_type: x }.fail(),
        }
    }
}

/// Everything a run needs, once the arguments and the configuration file are merged.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct JobSettings {
    pub input: PathBuf,
    pub output: PathBuf,
    pub input_type: InputType,
    pub excel_worksheet_name: Option<String>,
    pub rules: CleaningRules,
    pub summary: Option<String>,
    pub reference: Option<String>,
}

/// The machine-readable summary of a run.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SummaryJson {
    #[serde(rename = "totalRows")]
    pub total_rows: usize,
    #[serde(rename = "trainingRowsRemoved")]
    pub training_rows_removed: usize,
    #[serde(rename = "rowsProcessed")]
    pub rows_processed: usize,
    #[serde(rename = "uniqueEmails")]
    pub unique_emails: usize,
    #[serde(rename = "usernamesChanged")]
    pub usernames_changed: usize,
    #[serde(rename = "emailUsernameMapping")]
    pub email_username_mapping: JSMap<String, JSValue>,
}

fn build_summary_js(summary: &CleaningSummary) -> SummaryJson {
    let mut mapping: JSMap<String, JSValue> = JSMap::new();
    for (email, username) in summary.email_usernames.iter() {
        mapping.insert(email.clone(), JSValue::String(username.clone()));
    }
    SummaryJson {
        total_rows: summary.total_rows,
        training_rows_removed: summary.training_rows_removed,
        rows_processed: summary.rows_processed,
        unique_emails: summary.unique_emails,
        usernames_changed: summary.usernames_changed,
        email_username_mapping: mapping,
    }
}

/// The human-readable report printed at the end of a run.
pub fn format_report(summary: &CleaningSummary, rules: &CleaningRules) -> String {
    let mut lines: Vec<String> = vec![
        format!("Total rows in input: {}", summary.total_rows),
        format!(
            "Removed {} \"{}\" rows",
            summary.training_rows_removed,
            rules.excluded_username.trim()
        ),
        format!("Processed {} rows", summary.rows_processed),
        format!("Found {} unique emails", summary.unique_emails),
        format!(
            "Changed {} usernames to match first occurrence",
            summary.usernames_changed
        ),
        String::new(),
        "Email -> Username mapping:".to_string(),
    ];
    for (email, username) in summary.email_usernames.iter() {
        lines.push(format!("  {} -> {}", email, username));
    }
    lines.join("\n")
}

/// Merges the command line arguments with the configuration file, if any.
///
/// Without a configuration file, the default files are looked up next to the
/// executable.
pub fn resolve_settings(args: &Args) -> BSurveyResult<JobSettings> {
    let (config, base_dir) = match args.config.clone() {
        Some(config_path) => {
            let config = read_config(&config_path)?;
            info!("config: {:?}", config);
            let base_dir = parent_dir(&config_path)?;
            (config, base_dir)
        }
        None => (SurveyConfig::default(), executable_dir()?),
    };

    let input = match args.input.clone() {
        Some(p) => PathBuf::from(p),
        None => resolve_path(
            &base_dir,
            config.input_file.as_deref().unwrap_or(DEFAULT_INPUT_FILE),
        ),
    };
    let output = match args.out.clone() {
        Some(p) => PathBuf::from(p),
        None => resolve_path(
            &base_dir,
            config.output_file.as_deref().unwrap_or(DEFAULT_OUTPUT_FILE),
        ),
    };
    let input_type = match args.input_type.clone().or_else(|| config.input_type.clone()) {
        Some(s) => InputType::parse(&s)?,
        None => InputType::Csv,
    };
    let summary = args.summary.clone().or_else(|| {
        config
            .summary_file
            .as_deref()
            .map(|p| resolve_summary_target(&base_dir, p))
    });

    Ok(JobSettings {
        input,
        output,
        input_type,
        excel_worksheet_name: args
            .excel_worksheet_name
            .clone()
            .or_else(|| config.excel_worksheet_name.clone()),
        rules: config.rules(),
        summary,
        reference: args.reference.clone(),
    })
}

/// Reads the input, cleans it, writes the output and prints the report.
pub fn run_job(settings: &JobSettings) -> BSurveyResult<CleaningSummary> {
    info!("Attempting to read survey file {:?}", settings.input);
    let table = match settings.input_type {
        InputType::Csv => io_csv::read_csv_table(&settings.input)?,
        InputType::Xlsx => {
            io_excel::read_excel_table(&settings.input, settings.excel_worksheet_name.as_deref())?
        }
    };
    debug!("run_job: headers: {:?}", table.headers);

    let CleaningResult { table, summary } = clean_table(table, &settings.rules);

    io_csv::write_csv_table(&settings.output, &table)?;
    info!("Wrote {:?}", settings.output);

    println!("{}", format_report(&summary, &settings.rules));

    // Going through a JSON value keeps the key order identical to the one of a
    // summary read back from disk.
    let summary_js =
        serde_json::to_value(build_summary_js(&summary)).context(SerializingJsonSnafu {})?;
    let pretty_js_stats =
        serde_json::to_string_pretty(&summary_js).context(SerializingJsonSnafu {})?;
    match settings.summary.as_deref() {
        Some("stdout") => println!("{}", pretty_js_stats),
        Some(path) => {
            fs::write(path, &pretty_js_stats).context(WritingOutputSnafu { path })?;
        }
        None => {}
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = settings.reference.clone() {
        let summary_ref = read_summary(&summary_p)?;
        debug!("summary: {:?}", summary_ref);
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(SerializingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            return Err(Box::new(SurveyError::SummaryMismatch {}));
        }
    }

    Ok(summary)
}

pub fn run_from_args(args: &Args) -> BSurveyResult<CleaningSummary> {
    let settings = resolve_settings(args)?;
    info!("settings: {:?}", settings);
    run_job(&settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_dir(test_name: &str) -> PathBuf {
        [env!("CARGO_MANIFEST_DIR"), "tests", "data", test_name]
            .iter()
            .collect()
    }

    // Runs the case found in tests/data/<test_name>: cleans raw-survey.csv with the
    // optional config.json, checks the summary against expected_summary.json and the
    // output against expected-processed.csv, then checks that cleaning the output
    // again changes nothing.
    fn test_wrapper(test_name: &str) {
        let _ = env_logger::builder().is_test(true).try_init();
        let dir = test_dir(test_name);
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("processed-survey.csv");
        let config = dir.join("config.json");

        let args = Args {
            config: Some(config.display().to_string()).filter(|_| config.exists()),
            input: Some(dir.join("raw-survey.csv").display().to_string()),
            out: Some(out.display().to_string()),
            reference: Some(dir.join("expected_summary.json").display().to_string()),
            ..Args::default()
        };
        run_from_args(&args).unwrap();

        let expected = fs::read_to_string(dir.join("expected-processed.csv")).unwrap();
        let produced = fs::read_to_string(&out).unwrap();
        assert_eq!(produced, expected);

        let again = tmp.path().join("again.csv");
        let rerun = Args {
            input: Some(out.display().to_string()),
            out: Some(again.display().to_string()),
            reference: None,
            ..args
        };
        let summary = run_from_args(&rerun).unwrap();
        assert_eq!(summary.training_rows_removed, 0);
        assert_eq!(summary.usernames_changed, 0);
        assert_eq!(fs::read_to_string(&again).unwrap(), produced);
    }

    #[test]
    fn basic_scenario() {
        test_wrapper("basic_scenario");
    }

    #[test]
    fn quoted_fields_and_blank_lines() {
        test_wrapper("quoted_fields_and_blank_lines");
    }

    #[test]
    fn custom_columns() {
        test_wrapper("custom_columns");
    }

    #[test]
    fn missing_columns() {
        test_wrapper("missing_columns");
    }

    #[test]
    fn reference_mismatch_is_an_error() {
        let dir = test_dir("basic_scenario");
        let tmp = tempfile::tempdir().unwrap();
        let reference = tmp.path().join("reference.json");
        fs::write(&reference, "{\"totalRows\": 0}").unwrap();
        let args = Args {
            input: Some(dir.join("raw-survey.csv").display().to_string()),
            out: Some(tmp.path().join("out.csv").display().to_string()),
            reference: Some(reference.display().to_string()),
            ..Args::default()
        };
        let err = run_from_args(&args).unwrap_err();
        assert!(matches!(*err, SurveyError::SummaryMismatch {}));
    }

    #[test]
    fn missing_input_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let args = Args {
            input: Some(tmp.path().join("absent.csv").display().to_string()),
            out: Some(tmp.path().join("out.csv").display().to_string()),
            ..Args::default()
        };
        let err = run_from_args(&args).unwrap_err();
        assert!(matches!(*err, SurveyError::ReadingInput { .. }));
        assert!(!tmp.path().join("out.csv").exists());
    }

    #[test]
    fn summary_file_is_written() {
        let dir = test_dir("basic_scenario");
        let tmp = tempfile::tempdir().unwrap();
        let summary_path = tmp.path().join("summary.json");
        let args = Args {
            input: Some(dir.join("raw-survey.csv").display().to_string()),
            out: Some(tmp.path().join("out.csv").display().to_string()),
            summary: Some(summary_path.display().to_string()),
            ..Args::default()
        };
        run_from_args(&args).unwrap();
        let js: SummaryJson =
            serde_json::from_str(&fs::read_to_string(&summary_path).unwrap()).unwrap();
        assert_eq!(js.total_rows, 4);
        assert_eq!(js.training_rows_removed, 1);
        assert_eq!(js.usernames_changed, 1);
        assert_eq!(
            js.email_username_mapping.get("a@x.com"),
            Some(&JSValue::String("Alice".to_string()))
        );
    }

    #[test]
    fn serialization_errors_are_not_parse_errors() {
        let source = serde_json::from_str::<JSValue>("{").unwrap_err();
        let err = SurveyError::SerializingJson { source };
        assert_eq!(err.to_string(), "Error serializing the summary to JSON");
    }

    #[test]
    fn summary_mapping_is_sorted_by_email() {
        let summary = CleaningSummary {
            total_rows: 2,
            training_rows_removed: 0,
            rows_processed: 2,
            unique_emails: 2,
            usernames_changed: 0,
            email_usernames: vec![
                ("z@x.com".to_string(), "Zoe".to_string()),
                ("a@x.com".to_string(), "Alice".to_string()),
            ],
        };
        let js = serde_json::to_value(build_summary_js(&summary)).unwrap();
        let emails: Vec<&String> = js["emailUsernameMapping"]
            .as_object()
            .unwrap()
            .keys()
            .collect();
        assert_eq!(emails, vec!["a@x.com", "z@x.com"]);
        assert!(format_report(&summary, &CleaningRules::default())
            .ends_with("  z@x.com -> Zoe\n  a@x.com -> Alice"));
    }

    #[test]
    fn unknown_input_type() {
        let args = Args {
            input: Some("raw.csv".to_string()),
            out: Some("out.csv".to_string()),
            input_type: Some("parquet".to_string()),
            ..Args::default()
        };
        let err = resolve_settings(&args).unwrap_err();
        assert!(matches!(*err, SurveyError::UnknownInputType { .. }));
    }

    #[test]
    fn report_lines() {
        let summary = CleaningSummary {
            total_rows: 4,
            training_rows_removed: 1,
            rows_processed: 3,
            unique_emails: 2,
            usernames_changed: 1,
            email_usernames: vec![
                ("a@x.com".to_string(), "Alice".to_string()),
                ("b@y.com".to_string(), "Bob".to_string()),
            ],
        };
        let expected = "Total rows in input: 4\n\
                        Removed 1 \"Training\" rows\n\
                        Processed 3 rows\n\
                        Found 2 unique emails\n\
                        Changed 1 usernames to match first occurrence\n\
                        \n\
                        Email -> Username mapping:\n  \
                        a@x.com -> Alice\n  \
                        b@y.com -> Bob";
        assert_eq!(format_report(&summary, &CleaningRules::default()), expected);
    }
}
