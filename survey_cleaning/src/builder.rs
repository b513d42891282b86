pub use crate::config::*;

/// A builder for assembling a survey table in code.
///
/// Unlike the CSV reader, the builder is strict: records may be shorter than the
/// header (missing values are empty) but never longer.
///
/// ```
/// pub use survey_cleaning::builder::Builder;
/// pub use survey_cleaning::{clean_table, CleaningRules};
/// # use survey_cleaning::CleaningErrors;
///
/// let mut builder = Builder::new(&["Username", "Email address"])?;
///
/// builder.add_record(&["Alice", "a@x.com"])?;
/// builder.add_record(&["alice2", "A@X.COM"])?;
///
/// let res = clean_table(builder.build(), &CleaningRules::default());
/// assert_eq!(res.summary.usernames_changed, 1);
///
/// # Ok::<(), CleaningErrors>(())
/// ```
pub struct Builder {
    pub(crate) _headers: Vec<String>,
    pub(crate) _records: Vec<Record>,
}

impl Builder {
    pub fn new(headers: &[&str]) -> Result<Builder, CleaningErrors> {
        if headers.is_empty() {
            return Err(CleaningErrors::EmptyHeader);
        }
        Ok(Builder {
            _headers: headers.iter().map(|h| h.to_string()).collect(),
            _records: Vec::new(),
        })
    }

    /// Adds a record, with its values listed in header order.
    pub fn add_record(&mut self, values: &[&str]) -> Result<(), CleaningErrors> {
        if values.len() > self._headers.len() {
            return Err(CleaningErrors::TooManyValues {
                expected: self._headers.len(),
                found: values.len(),
            });
        }
        let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        self.add_record_2(Record::from_values(&self._headers, values))
    }

    pub fn add_record_2(&mut self, record: Record) -> Result<(), CleaningErrors> {
        self._records.push(record);
        Ok(())
    }

    pub fn build(self) -> Table {
        Table {
            headers: self._headers,
            records: self._records,
        }
    }
}
