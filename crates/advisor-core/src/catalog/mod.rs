//! Customer product catalogues used for recommendations.
//!
//! A customer folder holds one base CSV (file name contains `base`) and one CSV
//! per industry, named `<industry>_<anything>.csv`. Requested products are
//! looked up in both and rendered into a prompt for the completion API.

pub mod table;

pub use table::CsvTable;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_RECOMMENDATION_PROMPT: &str = "Please analyze the provided product data across different industries and provide recommendations.
Based on the information given, generate insights about how these products could be optimized for their specific industries.
Return your response as a JSON object with an array of recommendations for each product.";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Base file not found in folder. Please ensure there is a CSV file with 'base' in the name or at least one CSV file.")]
    MissingBase,

    #[error("No industry files found. Please upload CSV files for relevant industries.")]
    NoIndustries,
}

/// A product to recommend for, as sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductQuery {
    #[serde(rename = "productName")]
    pub product_name: String,
    pub industry: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsvRole {
    Base,
    Industry(String),
}

pub fn is_csv_key(key: &str) -> bool {
    key.ends_with(".csv")
}

/// Last path segment of a storage key.
pub fn file_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// `retail_products.csv` -> `Retail`.
pub fn industry_name(file_name: &str) -> Option<String> {
    let lower = file_name.to_lowercase();
    let stem = lower.split('_').next().unwrap_or("");
    let stem = stem.replace(".csv", "");

    let mut chars = stem.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}

pub fn classify_csv(key: &str) -> Option<CsvRole> {
    let name = file_name(key).to_lowercase();
    if name.contains("base") {
        return Some(CsvRole::Base);
    }
    industry_name(&name).map(CsvRole::Industry)
}

/// Distinct industry names derived from the CSV keys, in listing order.
pub fn industry_names<'a>(keys: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for key in keys.into_iter().filter(|key| is_csv_key(key)) {
        if let Some(CsvRole::Industry(name)) = classify_csv(key) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

#[derive(Debug, Clone)]
pub struct IndustryTable {
    pub name: String,
    pub table: CsvTable,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    base: CsvTable,
    industries: Vec<IndustryTable>,
}

impl Catalog {
    /// Build a catalogue from `(key, table)` pairs in listing order.
    ///
    /// The last `base` file wins; without one the first CSV doubles as the base.
    pub fn assemble(tables: Vec<(String, CsvTable)>) -> Result<Self, CatalogError> {
        let first = tables.first().map(|(_, table)| table.clone());
        let mut base = None;
        let mut industries: Vec<IndustryTable> = Vec::new();

        for (key, table) in tables {
            match classify_csv(&key) {
                Some(CsvRole::Base) => base = Some(table),
                Some(CsvRole::Industry(name)) => {
                    match industries.iter_mut().find(|existing| existing.name == name) {
                        Some(existing) => existing.table = table,
                        None => industries.push(IndustryTable { name, table }),
                    }
                }
                None => {}
            }
        }

        let base = base.or(first).ok_or(CatalogError::MissingBase)?;
        if industries.is_empty() {
            return Err(CatalogError::NoIndustries);
        }

        Ok(Self { base, industries })
    }

    pub fn base(&self) -> &CsvTable {
        &self.base
    }

    pub fn available_industries(&self) -> Vec<String> {
        self.industries.iter().map(|i| i.name.clone()).collect()
    }

    pub fn industry(&self, name: &str) -> Option<&CsvTable> {
        self.industries
            .iter()
            .find(|i| i.name.eq_ignore_ascii_case(name))
            .map(|i| &i.table)
    }

    /// Requested industries with no matching table, deduplicated in request order.
    pub fn missing_industries(&self, products: &[ProductQuery]) -> Vec<String> {
        let mut missing: Vec<String> = Vec::new();
        for product in products {
            let industry = &product.industry;
            if industry.is_empty() || self.industry(industry).is_some() {
                continue;
            }
            if !missing.contains(industry) {
                missing.push(industry.clone());
            }
        }
        missing
    }

    /// One prompt example per product found in both the base and its industry table.
    pub fn render_examples(&self, products: &[ProductQuery]) -> Vec<String> {
        let mut examples = Vec::new();

        for product in products {
            let name = &product.product_name;
            let Some(base_row) = self.base.find_product(name) else {
                log::debug!("Product '{}' not found in base table", name);
                continue;
            };
            let Some(industry_table) = self.industry(&product.industry) else {
                continue;
            };
            let Some(industry_row) = industry_table.find_containing(name) else {
                log::debug!("Product '{}' not found in {} table", name, product.industry);
                continue;
            };

            let mut example = format!(
                "\nProduct: {}\nIndustry: {}\n\nBase:\n",
                name, product.industry
            );
            example.push_str(&self.base.describe_row(base_row));
            example.push_str("\nIndustry Variant:\n");
            example.push_str(&industry_table.describe_row(industry_row));
            examples.push(example);
        }

        examples
    }
}

pub fn build_prompt(base_prompt: &str, examples: &[String]) -> String {
    format!("{}\n\nData:\n{}", base_prompt.trim(), examples.join("\n---\n"))
}
