//! Reading spreadsheet column headers from CSV files.

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use csv::ReaderBuilder;

/// Read the headers of the CSV file at `path`.
///
/// See [`read_headers_from`].
pub fn read_headers(path: &Path) -> Result<Vec<String>> {
    let reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("open csv: {}", path.display()))?;
    collect_headers(reader).with_context(|| format!("read headers: {}", path.display()))
}

/// Read headers from CSV data.
///
/// The first row with a non-blank cell is the header row. Cells are trimmed
/// (including a leading byte order mark), blank cells are dropped, and only
/// the first occurrence of a repeated header is kept.
pub fn read_headers_from<R: Read>(input: R) -> Result<Vec<String>> {
    let reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);
    collect_headers(reader)
}

fn collect_headers<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<String>> {
    for record in reader.records() {
        let record = record.context("read record")?;
        let headers = clean_row(record.iter());
        if !headers.is_empty() {
            return Ok(headers);
        }
    }
    bail!("no header row found")
}

fn clean_row<'a>(cells: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    cells
        .map(|cell| cell.trim_start_matches('\u{feff}').trim())
        .filter(|cell| !cell.is_empty())
        .filter(|cell| seen.insert(*cell))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_drops_blank_cells() {
        let headers = clean_row(["  Invoice No ", "", "Buyer TIN", "   "].into_iter());
        assert_eq!(headers, vec!["Invoice No", "Buyer TIN"]);
    }

    #[test]
    fn keeps_first_of_repeated_headers() {
        let headers = clean_row(["Qty", "Price", "Qty"].into_iter());
        assert_eq!(headers, vec!["Qty", "Price"]);
    }

    #[test]
    fn strips_byte_order_mark() {
        let headers = clean_row(["\u{feff}Invoice No", "Date"].into_iter());
        assert_eq!(headers, vec!["Invoice No", "Date"]);
    }
}
