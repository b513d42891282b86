// ********* Input data structures ***********

use std::collections::HashMap;
use std::error::Error;
use std::fmt::Display;

pub const DEFAULT_USERNAME_COLUMN: &str = "Username";
pub const DEFAULT_EMAIL_COLUMN: &str = "Email address";
pub const DEFAULT_EXCLUDED_USERNAME: &str = "Training";

/// One data row of a survey export, keyed by column name.
///
/// Columns that were never set read as the empty string.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Record {
    fields: HashMap<String, String>,
}

impl Record {
    /// Maps the values onto the headers by position.
    ///
    /// Missing trailing values become empty strings and extra values are dropped.
    /// When a header name appears twice, the value of the last position wins.
    pub fn from_values(headers: &[String], values: Vec<String>) -> Record {
        let mut values = values.into_iter();
        let mut fields: HashMap<String, String> = HashMap::with_capacity(headers.len());
        for header in headers {
            fields.insert(header.clone(), values.next().unwrap_or_default());
        }
        Record { fields }
    }

    pub fn get(&self, column: &str) -> &str {
        self.fields.get(column).map(|s| s.as_str()).unwrap_or("")
    }

    pub fn set(&mut self, column: &str, value: String) {
        self.fields.insert(column.to_string(), value);
    }
}

/// A survey export held in memory: the header row and the data rows, in file order.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

// ********* Configuration **********

/// The columns and the sentinel value that drive the cleaning.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CleaningRules {
    pub username_column: String,
    pub email_column: String,
    /// Rows whose username matches this value (ignoring case and surrounding
    /// whitespace) are test submissions and get dropped.
    pub excluded_username: String,
}

impl Default for CleaningRules {
    fn default() -> Self {
        CleaningRules {
            username_column: DEFAULT_USERNAME_COLUMN.to_string(),
            email_column: DEFAULT_EMAIL_COLUMN.to_string(),
            excluded_username: DEFAULT_EXCLUDED_USERNAME.to_string(),
        }
    }
}

impl CleaningRules {
    pub fn is_excluded(&self, username: &str) -> bool {
        fold(username) == fold(&self.excluded_username)
    }

    /// The grouping key of a record: its trimmed, lowercased email.
    /// Blank emails have no key.
    pub fn email_key(&self, record: &Record) -> Option<String> {
        let email = fold(record.get(&self.email_column));
        if email.is_empty() {
            None
        } else {
            Some(email)
        }
    }
}

pub(crate) fn fold(s: &str) -> String {
    trim_ws(s).to_lowercase()
}

/// Trims whitespace and byte-order marks from both ends.
pub(crate) fn trim_ws(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

// ******** Output data structures *********

/// The username retained for each email, keyed by the folded email.
///
/// Once an email is present, its username never changes. Entries iterate in the
/// order the emails were first seen.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct EmailUsernameMap {
    index: HashMap<String, usize>,
    entries: Vec<(String, String)>,
}

impl EmailUsernameMap {
    /// Inserts the pair unless the email is already known. Returns true if inserted.
    pub fn insert_first(&mut self, email: String, username: String) -> bool {
        if self.index.contains_key(&email) {
            return false;
        }
        self.index.insert(email.clone(), self.entries.len());
        self.entries.push((email, username));
        true
    }

    pub fn get(&self, email: &str) -> Option<&str> {
        self.index
            .get(email)
            .map(|&idx| self.entries[idx].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(e, u)| (e.as_str(), u.as_str()))
    }
}

/// Counts gathered during one cleaning run.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CleaningSummary {
    pub total_rows: usize,
    pub training_rows_removed: usize,
    pub rows_processed: usize,
    pub unique_emails: usize,
    pub usernames_changed: usize,
    /// (email, username) pairs, in first-seen order.
    pub email_usernames: Vec<(String, String)>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CleaningResult {
    pub table: Table,
    pub summary: CleaningSummary,
}

/// Errors raised when assembling a table by hand with the builder.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum CleaningErrors {
    EmptyHeader,
    TooManyValues { expected: usize, found: usize },
}

impl Error for CleaningErrors {}

impl Display for CleaningErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CleaningErrors::EmptyHeader => write!(f, "a table needs at least one column"),
            CleaningErrors::TooManyValues { expected, found } => write!(
                f,
                "record has {} values but the table has {} columns",
                found, expected
            ),
        }
    }
}
