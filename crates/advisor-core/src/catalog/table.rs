use std::io::Read;

use crate::catalog::CatalogError;

/// An in-memory CSV table. The first column identifies the product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = reader
            .headers()?
            .iter()
            .map(str::to_string)
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { headers, rows })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CatalogError> {
        Self::from_reader(bytes)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// First row whose first column equals `name`, trimmed and case-insensitive.
    pub fn find_exact(&self, name: &str) -> Option<&[String]> {
        let needle = name.trim().to_lowercase();
        self.rows
            .iter()
            .find(|row| first_column(row).trim().to_lowercase() == needle)
            .map(Vec::as_slice)
    }

    /// First row whose first column contains `name`, case-insensitive.
    pub fn find_containing(&self, name: &str) -> Option<&[String]> {
        let needle = name.trim().to_lowercase();
        self.rows
            .iter()
            .find(|row| first_column(row).to_lowercase().contains(&needle))
            .map(Vec::as_slice)
    }

    /// Exact match first, substring match second.
    pub fn find_product(&self, name: &str) -> Option<&[String]> {
        self.find_exact(name).or_else(|| self.find_containing(name))
    }

    /// Render `- column: value` lines for every non-empty cell of `row`.
    pub fn describe_row(&self, row: &[String]) -> String {
        let mut out = String::new();
        for (column, value) in self.headers.iter().zip(row) {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            out.push_str("- ");
            out.push_str(column);
            out.push_str(": ");
            out.push_str(value);
            out.push('\n');
        }
        out
    }
}

fn first_column(row: &[String]) -> &str {
    row.first().map(String::as_str).unwrap_or("")
}
