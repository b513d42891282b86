mod config;
use log::{debug, info};

pub use crate::config::*;
use crate::config::trim_ws;

pub mod builder;
pub mod csv_text;
pub mod manual;

/// Runs the whole cleaning pipeline on a table.
///
/// Rows from the excluded username are dropped first, then every row that shares
/// an email with an earlier row takes the username of the first such row.
/// The relative order of the remaining rows is never changed.
///
/// Arguments:
/// * `table` the parsed survey export
/// * `rules` the columns to read and the username to exclude
pub fn clean_table(table: Table, rules: &CleaningRules) -> CleaningResult {
    let Table { headers, records } = table;
    let total_rows = records.len();
    info!(
        "clean_table: Processing {:?} rows, rules: {:?}",
        total_rows, rules
    );

    let (mut records, training_rows_removed) = filter_excluded_rows(records, rules);
    let email_map = build_email_map(&records, rules);
    let usernames_changed = apply_email_map(&mut records, &email_map, rules);

    let summary = build_summary(
        total_rows,
        training_rows_removed,
        &records,
        &email_map,
        usernames_changed,
    );
    info!(
        "clean_table: removed {} rows, {} unique emails, {} usernames changed",
        summary.training_rows_removed, summary.unique_emails, summary.usernames_changed
    );
    CleaningResult {
        table: Table { headers, records },
        summary,
    }
}

/// Drops the rows whose username is the excluded one.
///
/// Returns the kept rows, in order, and the number of dropped rows.
pub fn filter_excluded_rows(records: Vec<Record>, rules: &CleaningRules) -> (Vec<Record>, usize) {
    let total = records.len();
    let kept: Vec<Record> = records
        .into_iter()
        .filter(|r| !rules.is_excluded(r.get(&rules.username_column)))
        .collect();
    let removed = total - kept.len();
    debug!("filter_excluded_rows: removed {} of {} rows", removed, total);
    (kept, removed)
}

/// First pass: records the username of the first row seen for every email.
pub fn build_email_map(records: &[Record], rules: &CleaningRules) -> EmailUsernameMap {
    let mut map = EmailUsernameMap::default();
    for record in records.iter() {
        if let Some(email) = rules.email_key(record) {
            let username = trim_ws(record.get(&rules.username_column)).to_string();
            if map.insert_first(email, username) {
                debug!("build_email_map: new email at row {:?}", record);
            }
        }
    }
    map
}

/// Second pass: overwrites the username of every row with a known email.
///
/// Returns how many rows had a username that differed, ignoring case, from the
/// retained one.
pub fn apply_email_map(
    records: &mut [Record],
    map: &EmailUsernameMap,
    rules: &CleaningRules,
) -> usize {
    let mut changed = 0;
    for record in records.iter_mut() {
        let Some(email) = rules.email_key(record) else {
            continue;
        };
        if let Some(username) = map.get(&email) {
            if record.get(&rules.username_column).to_lowercase() != username.to_lowercase() {
                debug!(
                    "apply_email_map: {}: {:?} -> {:?}",
                    email,
                    record.get(&rules.username_column),
                    username
                );
                changed += 1;
            }
            record.set(&rules.username_column, username.to_string());
        }
    }
    changed
}

fn build_summary(
    total_rows: usize,
    training_rows_removed: usize,
    records: &[Record],
    email_map: &EmailUsernameMap,
    usernames_changed: usize,
) -> CleaningSummary {
    CleaningSummary {
        total_rows,
        training_rows_removed,
        rows_processed: records.len(),
        unique_emails: email_map.len(),
        usernames_changed,
        email_usernames: email_map
            .iter()
            .map(|(e, u)| (e.to_string(), u.to_string()))
            .collect(),
    }
}
