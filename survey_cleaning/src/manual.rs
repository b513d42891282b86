/*!

This is the long-form manual for `survey_cleaning` and `surveyclean`.

## What the cleaning does

Starting from a survey export with one row per submission:

1. Rows whose username is `Training` (ignoring case and surrounding spaces) are test
   submissions. They are removed.
2. Respondents are identified by their email address, compared without case and
   surrounding spaces. For every email, the username of the first remaining row is
   kept, and every later row with the same email receives that username.
   Rows without an email keep their username.
3. The cleaned rows are written back in their original order, with the original
   columns in their original order.

The run reports the number of rows read, removed and written, the number of distinct
emails, how many usernames were changed (ignoring case), and the retained username
for every email.

## Input formats

### `csv`

The default. The first line holds the column names; `Username` and `Email address`
must be present for the cleaning to have any effect, all other columns are passed
through untouched.

```text
Username,Email address,Neighborhood
Alice,a@x.com,North
alice2,A@X.COM,"South, by the river"
Training,t@x.com,
```

The reader is deliberately forgiving:
- a leading byte-order mark is ignored,
- blank lines are skipped,
- spaces around a data line are dropped,
- rows with fewer values than columns are padded with empty values, extra values are
  dropped,
- a quote that is never closed runs until the end of its line.

Quoted values may contain commas and doubled quotes, but not line breaks: each line
of the file is one row.

### `xlsx`

An Excel workbook, for example the Excel download of a form tool. The first row of
the worksheet holds the column names. If the workbook has several worksheets, the
name of the one to use must be given with `excelWorksheetName` or
`--excel-worksheet-name`. Rows where every cell is empty are skipped.

The cleaned output is always written as CSV.

## Configuration

`surveyclean` runs without any argument: it reads `raw-survey.csv` and writes
`processed-survey.csv` next to the executable. A JSON configuration file can be
passed with `--config`. All keys are optional:

```text
{
  "inputFile": "raw-survey.csv",
  "outputFile": "processed-survey.csv",
  "inputType": "csv",
  "excelWorksheetName": "Form1",
  "usernameColumn": "Username",
  "emailColumn": "Email address",
  "excludedUsername": "Training",
  "summaryFile": "summary.json"
}
```

Relative paths are resolved against the directory of the configuration file.
Command line flags take precedence over the configuration file.

The summary file holds the counts of the run in JSON. In the summary file, the
`emailUsernameMapping` object is sorted by email. The console report lists the same
pairs in the order the emails first appear in the input. Passing a summary file back with
`--reference` checks that a later run produces the same summary.

 */
