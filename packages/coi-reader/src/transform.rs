//! Table assembly: join category outputs into one row per series.
//!
//! The reference series list comes from the share-name pass; every other
//! category's JSON is keyed by whatever label the model chose that time.
//! [`crate::series::align_series`] reconciles the two, and the derived
//! columns (invested, conversion ratio, resolved dividend terms) are computed
//! here rather than asked of the model.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use llm_client::extract_json_object;

use crate::error::{CoiError, Result};
use crate::extract::ExtractionManifest;
use crate::fields::{Category, OTHER_FIELDS, PRECISE_FIELDS, SUPPORT_FIELDS};
use crate::series::align_series;
use crate::store::DocumentStore;

/// Sentinel rendered where a reference series matched nothing.
pub const NOT_FOUND: &str = "Not found";

/// Main-table columns, in output order. Registry columns plus the derived
/// ones (`invested`, `conversion_ratio`).
pub const MAIN_COLUMNS: &[&str] = &[
    "preferred_shares",
    "issue_price",
    "invested",
    "conversion_price",
    "conversion_ratio",
    "liq_pref",
    "liq_pref_order",
    "participation_rights",
    "cap",
    "dividend_pct",
    "dividend_per_share",
    "cumulative",
];

/// One table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Missing,
}

impl CellValue {
    /// Numeric view of the cell.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Render for CSV output; missing cells render empty.
    pub fn render(&self) -> String {
        match self {
            CellValue::Number(n) => format!("{}", n),
            CellValue::Text(s) => s.clone(),
            CellValue::Missing => String::new(),
        }
    }
}

/// One row of the main table.
#[derive(Debug, Clone)]
pub struct SeriesRow {
    pub share_name: String,
    /// Cells keyed by [`MAIN_COLUMNS`] entries.
    pub values: IndexMap<&'static str, CellValue>,
}

impl SeriesRow {
    /// Get a cell by column name.
    pub fn get(&self, column: &str) -> &CellValue {
        self.values.get(column).unwrap_or(&CellValue::Missing)
    }
}

/// One row of the supporting-text table.
#[derive(Debug, Clone)]
pub struct SupportRow {
    pub share_name: String,
    /// Supporting text per column; [`NOT_FOUND`] where nothing aligned.
    pub values: IndexMap<&'static str, String>,
}

/// A document-level scalar with its quote.
#[derive(Debug, Clone)]
pub struct OtherValue {
    pub value: String,
    pub supporting_text: Option<String>,
}

/// Everything the transform produces for one document.
#[derive(Debug, Clone)]
pub struct CoiTables {
    /// One row per reference series, sorted by share name.
    pub rows: Vec<SeriesRow>,
    /// Supporting text, same row order.
    pub support: Vec<SupportRow>,
    /// Document-level fields (company name, common shares, dates).
    pub other: IndexMap<&'static str, OtherValue>,
}

/// Build all tables from a finished extraction.
pub async fn build_tables(
    store: &dyn DocumentStore,
    manifest: &ExtractionManifest,
) -> Result<CoiTables> {
    if manifest.preferred_share_names.is_empty() {
        return Err(CoiError::NoShareNames);
    }

    // Reference order is the sorted share-name list; the same order is used
    // for the main and support tables.
    let mut references = manifest.preferred_share_names.clone();
    references.sort();

    let mut precise_cache: IndexMap<Category, Value> = IndexMap::new();
    let mut raw_cache: IndexMap<Category, String> = IndexMap::new();

    // Main table: registry columns first.
    let mut columns: IndexMap<&'static str, IndexMap<String, CellValue>> = IndexMap::new();
    for field in PRECISE_FIELDS {
        let json = load_precise(store, manifest, field.category, &mut precise_cache).await?;
        let mapping = per_series_map(&json, field.key_name);
        let aligned = align_series(&references, &mapping);

        let cells = aligned
            .into_iter()
            .map(|(share, entry)| {
                let cell = entry
                    .and_then(|obj| obj.get(field.value_key))
                    .map(|v| to_cell(v, field.numeric))
                    .unwrap_or(CellValue::Missing);
                (share, cell)
            })
            .collect();
        columns.insert(field.column, cells);
    }

    let rows = references
        .iter()
        .map(|share| assemble_row(share, &columns))
        .collect();

    // Supporting-text table.
    let mut support = Vec::with_capacity(references.len());
    for share in &references {
        support.push(SupportRow {
            share_name: share.clone(),
            values: IndexMap::new(),
        });
    }
    for field in SUPPORT_FIELDS {
        match field.key_name {
            Some(key_name) => {
                let json =
                    load_precise(store, manifest, field.category, &mut precise_cache).await?;
                let mapping = per_series_map(&json, key_name);
                let aligned = align_series(&references, &mapping);
                for (row, (_, entry)) in support.iter_mut().zip(aligned) {
                    let text = entry
                        .and_then(|obj| obj.get("supporting_text"))
                        .and_then(|v| v.as_str())
                        .unwrap_or(NOT_FOUND);
                    row.values.insert(field.column, text.to_string());
                }
            }
            None => {
                // No per-series quote; the whole raw extract backs every row.
                let raw = load_raw(store, manifest, field.category, &mut raw_cache).await?;
                for row in &mut support {
                    row.values.insert(field.column, raw.clone());
                }
            }
        }
    }

    // Document-level fields.
    let mut other = IndexMap::new();
    for field in OTHER_FIELDS {
        let json = load_precise(store, manifest, field.category, &mut precise_cache).await?;
        let value = json
            .get(field.key_name)
            .map(|v| render_scalar(v))
            .unwrap_or_else(|| NOT_FOUND.to_string());
        let supporting_text = field
            .supporting_text_keys
            .iter()
            .find_map(|key| json.get(*key).and_then(|v| v.as_str()))
            .map(str::to_string);
        other.insert(
            field.name,
            OtherValue {
                value,
                supporting_text,
            },
        );
    }

    debug!(
        series = references.len(),
        columns = MAIN_COLUMNS.len(),
        "tables assembled"
    );

    Ok(CoiTables {
        rows,
        support,
        other,
    })
}

/// Assemble one main-table row, computing derived columns.
fn assemble_row(
    share: &str,
    columns: &IndexMap<&'static str, IndexMap<String, CellValue>>,
) -> SeriesRow {
    let cell = |column: &str| -> CellValue {
        columns
            .get(column)
            .and_then(|c| c.get(share))
            .cloned()
            .unwrap_or(CellValue::Missing)
    };
    let number = |column: &str| cell(column).as_number();

    let preferred_shares = number("preferred_shares");
    let issue_price = number("issue_price");
    let conversion_price = number("conversion_price");

    // A document states a dividend as a rate or a per-share amount, rarely
    // both; derive whichever is missing from the issue price.
    let stated_pct = number("dividend_pct");
    let stated_per_share = number("dividend_per_share");
    let dividend_pct = match (stated_pct, stated_per_share, issue_price) {
        (Some(pct), Some(per_share), Some(price)) if pct == 0.0 && price != 0.0 => {
            Some(per_share / price)
        }
        (pct, _, _) => pct,
    };
    let dividend_per_share = match (stated_per_share, dividend_pct, issue_price) {
        (Some(per_share), Some(pct), Some(price)) if per_share == 0.0 => Some(price * pct),
        (per_share, _, _) => per_share,
    };

    let invested = match (issue_price, preferred_shares) {
        (Some(price), Some(shares)) => Some(price * shares),
        _ => None,
    };
    let conversion_ratio = match (issue_price, conversion_price) {
        (Some(price), Some(cp)) if cp != 0.0 => Some(price / cp),
        _ => None,
    };

    let derived = |value: Option<f64>| value.map(CellValue::Number).unwrap_or(CellValue::Missing);

    let mut values = IndexMap::new();
    for column in MAIN_COLUMNS {
        let cell_value = match *column {
            "invested" => derived(invested),
            "conversion_ratio" => derived(conversion_ratio),
            "dividend_pct" => derived(dividend_pct),
            "dividend_per_share" => derived(dividend_per_share),
            other => cell(other),
        };
        values.insert(*column, cell_value);
    }

    SeriesRow {
        share_name: share.to_string(),
        values,
    }
}

async fn load_precise(
    store: &dyn DocumentStore,
    manifest: &ExtractionManifest,
    category: Category,
    cache: &mut IndexMap<Category, Value>,
) -> Result<Value> {
    if let Some(json) = cache.get(&category) {
        return Ok(json.clone());
    }
    let output = manifest.category(category)?;
    let content = store.get_required(&output.precise_output_key).await?;
    let json = extract_json_object(&content).map_err(|e| CoiError::CategoryParse {
        category: category.label().to_string(),
        reason: e.to_string(),
    })?;
    cache.insert(category, json.clone());
    Ok(json)
}

async fn load_raw(
    store: &dyn DocumentStore,
    manifest: &ExtractionManifest,
    category: Category,
    cache: &mut IndexMap<Category, String>,
) -> Result<String> {
    if let Some(raw) = cache.get(&category) {
        return Ok(raw.clone());
    }
    let output = manifest.category(category)?;
    let content = store.get_required(&output.raw_output_key).await?;
    cache.insert(category, content.clone());
    Ok(content)
}

/// Pull the per-series object map under `key_name`, preserving key order.
fn per_series_map(json: &Value, key_name: &str) -> IndexMap<String, Value> {
    json.get(key_name)
        .and_then(|v| v.as_object())
        .map(|obj| obj.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default()
}

/// Convert a JSON value into a cell, parsing numbers when asked.
fn to_cell(value: &Value, numeric: bool) -> CellValue {
    if numeric {
        return parse_number(value)
            .map(CellValue::Number)
            .unwrap_or(CellValue::Missing);
    }
    match value {
        Value::String(s) => CellValue::Text(s.clone()),
        Value::Null => CellValue::Missing,
        other => CellValue::Text(render_scalar(other)),
    }
}

/// Parse a JSON number or a numeric string with thousands separators.
fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse().ok(),
        _ => None,
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Write the main table as CSV.
pub fn write_main_csv(tables: &CoiTables) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["shares_type"];
    header.extend_from_slice(MAIN_COLUMNS);
    writer.write_record(&header)?;

    for row in &tables.rows {
        let mut record = vec![row.share_name.clone()];
        for column in MAIN_COLUMNS {
            record.push(row.get(column).render());
        }
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| CoiError::Storage(Box::new(e)))
}

/// Write the supporting-text table as CSV.
pub fn write_support_csv(tables: &CoiTables) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["shares_type".to_string()];
    header.extend(SUPPORT_FIELDS.iter().map(|f| f.column.to_string()));
    writer.write_record(&header)?;

    for row in &tables.support {
        let mut record = vec![row.share_name.clone()];
        for field in SUPPORT_FIELDS {
            record.push(
                row.values
                    .get(field.column)
                    .cloned()
                    .unwrap_or_else(|| NOT_FOUND.to_string()),
            );
        }
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| CoiError::Storage(Box::new(e)))
}

/// Write the document-level fields as CSV.
pub fn write_other_csv(tables: &CoiTables) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["field", "value", "supporting_text"])?;
    for (name, other) in &tables.other {
        writer.write_record([
            *name,
            other.value.as_str(),
            other.supporting_text.as_deref().unwrap_or(""),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| CoiError::Storage(Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_with_separators() {
        assert_eq!(parse_number(&Value::String("1,250,000".into())), Some(1_250_000.0));
        assert_eq!(parse_number(&serde_json::json!(1.25)), Some(1.25));
        assert_eq!(parse_number(&Value::String("n/a".into())), None);
    }

    #[test]
    fn test_cell_render() {
        assert_eq!(CellValue::Number(10.0).render(), "10");
        assert_eq!(CellValue::Number(1.25).render(), "1.25");
        assert_eq!(CellValue::Text("yes".into()).render(), "yes");
        assert_eq!(CellValue::Missing.render(), "");
    }

    #[test]
    fn test_derived_columns() {
        let mut columns: IndexMap<&'static str, IndexMap<String, CellValue>> = IndexMap::new();
        let share = "Series A".to_string();
        let mut insert = |column: &'static str, cell: CellValue| {
            columns.insert(column, IndexMap::from([(share.clone(), cell)]));
        };
        insert("preferred_shares", CellValue::Number(1000.0));
        insert("issue_price", CellValue::Number(2.0));
        insert("conversion_price", CellValue::Number(1.0));
        // Rate stated as zero, per-share stated: rate is derived.
        insert("dividend_pct", CellValue::Number(0.0));
        insert("dividend_per_share", CellValue::Number(0.16));

        let row = assemble_row(&share, &columns);

        assert_eq!(row.get("invested").as_number(), Some(2000.0));
        assert_eq!(row.get("conversion_ratio").as_number(), Some(2.0));
        assert_eq!(row.get("dividend_pct").as_number(), Some(0.08));
        assert_eq!(row.get("dividend_per_share").as_number(), Some(0.16));
    }

    #[test]
    fn test_derived_per_share_from_rate() {
        let mut columns: IndexMap<&'static str, IndexMap<String, CellValue>> = IndexMap::new();
        let share = "Series B".to_string();
        let mut insert = |column: &'static str, cell: CellValue| {
            columns.insert(column, IndexMap::from([(share.clone(), cell)]));
        };
        insert("issue_price", CellValue::Number(10.0));
        insert("dividend_pct", CellValue::Number(0.06));
        insert("dividend_per_share", CellValue::Number(0.0));

        let row = assemble_row(&share, &columns);
        assert_eq!(row.get("dividend_per_share").as_number(), Some(0.6));
    }

    #[test]
    fn test_missing_columns_stay_missing() {
        let columns = IndexMap::new();
        let row = assemble_row("Seed", &columns);
        assert_eq!(*row.get("issue_price"), CellValue::Missing);
        assert_eq!(*row.get("invested"), CellValue::Missing);
    }
}
