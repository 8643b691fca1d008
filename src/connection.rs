//! DuckDB-backed record source for campaign CSV files.
//!
//! The CSV is read with every column as text, so type coercion happens here
//! in one place and a malformed field is reported with its row and column
//! instead of silently becoming zero. Column names are matched
//! case-insensitively via schema introspection; extra columns are ignored.

use chrono::NaiveDate;
use duckdb::{types::ValueRef, Connection as DuckDbConnection};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config;
use crate::error::{QaError, Result};
use crate::models::PerformanceRecord;
use crate::sql_builder::SqlBuilder;

/// Table holding the raw (all-text) CSV rows.
pub const RAW_TABLE: &str = "raw_records";

const DATE_FORMAT: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// RecordFilter
// ---------------------------------------------------------------------------

/// Optional restrictions applied when reading records back out of DuckDB.
///
/// Date bounds are inclusive. Platform and campaign lists match
/// case-insensitively after trimming; an empty list means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub platforms: Vec<String>,
    pub campaigns: Vec<String>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_date(mut self, date: NaiveDate) -> Self {
        self.date_from = Some(date);
        self
    }

    pub fn to_date(mut self, date: NaiveDate) -> Self {
        self.date_to = Some(date);
        self
    }

    pub fn platform(mut self, name: impl Into<String>) -> Self {
        self.platforms.push(name.into());
        self
    }

    pub fn campaign(mut self, name: impl Into<String>) -> Self {
        self.campaigns.push(name.into());
        self
    }

    /// True when no restriction is set.
    pub fn is_empty(&self) -> bool {
        self.date_from.is_none()
            && self.date_to.is_none()
            && self.platforms.is_empty()
            && self.campaigns.is_empty()
    }

    /// In-memory counterpart of the SQL filter, for records that did not
    /// come from a CSV.
    pub fn matches(&self, record: &PerformanceRecord) -> bool {
        let listed = |names: &[String], value: &str| {
            let value = value.trim().to_lowercase();
            names.is_empty() || names.iter().any(|n| n.trim().to_lowercase() == value)
        };
        self.date_from.map_or(true, |d| record.date >= d)
            && self.date_to.map_or(true, |d| record.date <= d)
            && listed(&self.platforms, &record.platform)
            && listed(&self.campaigns, &record.campaign)
    }

    fn apply(&self, qb: &mut SqlBuilder, columns: &ColumnMap) {
        if let Some(from) = self.date_from {
            qb.where_gte(&columns.quoted("date"), &from.format(DATE_FORMAT).to_string());
        }
        if let Some(to) = self.date_to {
            qb.where_lte(&columns.quoted("date"), &to.format(DATE_FORMAT).to_string());
        }
        if !self.platforms.is_empty() {
            let names: Vec<&str> = self.platforms.iter().map(String::as_str).collect();
            qb.where_in_trimmed(&columns.quoted("platform"), &names);
        }
        if !self.campaigns.is_empty() {
            let names: Vec<&str> = self.campaigns.iter().map(String::as_str).collect();
            qb.where_in_trimmed(&columns.quoted("campaign_name"), &names);
        }
    }
}

// ---------------------------------------------------------------------------
// Connection
// ---------------------------------------------------------------------------

/// Canonical lowercase column name -> name as written in the CSV header.
#[derive(Debug, Clone, Default)]
struct ColumnMap(HashMap<String, String>);

impl ColumnMap {
    fn has(&self, canonical: &str) -> bool {
        self.0.contains_key(canonical)
    }

    fn quoted(&self, canonical: &str) -> String {
        let actual = self.0.get(canonical).map(String::as_str).unwrap_or(canonical);
        format!("\"{}\"", actual.replace('"', "\"\""))
    }
}

/// Wraps an in-memory DuckDB database holding one loaded CSV.
pub struct Connection {
    conn: DuckDbConnection,
    source: RefCell<Option<PathBuf>>,
    columns: RefCell<ColumnMap>,
}

impl Connection {
    /// Open an empty in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = DuckDbConnection::open_in_memory()?;
        Ok(Self {
            conn,
            source: RefCell::new(None),
            columns: RefCell::new(ColumnMap::default()),
        })
    }

    /// Load a campaign CSV, replacing anything loaded before.
    ///
    /// Fails with [`QaError::MissingColumn`] when a required column is absent.
    /// Field values are not checked until [`records`](Self::records).
    /// Returns the number of data rows.
    pub fn load_csv<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(QaError::NotFound(format!(
                "CSV file {} does not exist",
                path.display()
            )));
        }
        // Forward slashes for DuckDB on Windows; single quotes doubled for SQL.
        let path_str = path.to_string_lossy().replace('\\', "/").replace('\'', "''");

        self.conn.execute_batch(&format!(
            "CREATE OR REPLACE TABLE {} AS \
             SELECT * FROM read_csv('{}', header = true, all_varchar = true)",
            RAW_TABLE, path_str
        ))?;

        let columns = self.introspect_columns()?;
        for required in config::REQUIRED_COLUMNS {
            if !columns.has(required) {
                return Err(QaError::MissingColumn((*required).to_string()));
            }
        }
        *self.columns.borrow_mut() = columns;
        *self.source.borrow_mut() = Some(path.to_path_buf());

        let count = self.row_count()?;
        info!(rows = count, path = %path.display(), "loaded campaign CSV");
        Ok(count)
    }

    /// Path of the currently loaded CSV, if any.
    pub fn source(&self) -> Option<PathBuf> {
        self.source.borrow().clone()
    }

    /// Column names of the loaded CSV, as written in its header.
    pub fn columns(&self) -> Vec<String> {
        let mut cols: Vec<String> = self.columns.borrow().0.values().cloned().collect();
        cols.sort();
        cols
    }

    /// Number of data rows in the loaded CSV.
    pub fn row_count(&self) -> Result<usize> {
        let value = self.execute_scalar(&format!("SELECT COUNT(*) FROM {}", RAW_TABLE), &[])?;
        Ok(value.and_then(|v| v.as_u64()).unwrap_or(0) as usize)
    }

    /// Read typed records, optionally filtered.
    ///
    /// Every field is coerced here; the first malformed or empty value fails
    /// the whole read with [`QaError::Load`]. `ctr`, `cpc` and `cpm` are
    /// derived from the row when the CSV has no such column.
    pub fn records(&self, filter: &RecordFilter) -> Result<Vec<PerformanceRecord>> {
        if self.source.borrow().is_none() {
            return Err(QaError::NotFound("no CSV has been loaded".to_string()));
        }
        let columns = self.columns.borrow().clone();

        let mut selected: Vec<String> = vec!["rowid AS row_index".to_string()];
        for col in config::REQUIRED_COLUMNS
            .iter()
            .chain(config::DERIVED_COLUMNS.iter())
            .filter(|c| columns.has(c))
        {
            selected.push(format!("{} AS \"{}\"", columns.quoted(col), col));
        }
        let selected_refs: Vec<&str> = selected.iter().map(String::as_str).collect();

        let mut qb = SqlBuilder::new(RAW_TABLE);
        qb.select(&selected_refs);
        filter.apply(&mut qb, &columns);
        qb.order_by(&["rowid"]);
        let (sql, params) = qb.build();
        debug!(%sql, ?params, "reading records");

        let rows = self.execute(&sql, &params)?;
        rows.iter().map(parse_record).collect()
    }

    /// Execute SQL and return each row as a column-name -> JSON value map.
    pub fn execute(&self, sql: &str, params: &[String]) -> Result<Vec<HashMap<String, Value>>> {
        let mut stmt = self.conn.prepare(sql)?;
        let param_values: Vec<&dyn duckdb::ToSql> =
            params.iter().map(|p| p as &dyn duckdb::ToSql).collect();
        let mut rows = stmt.query(param_values.as_slice())?;

        // Column metadata is only available once the statement has run.
        let statement = rows
            .as_ref()
            .ok_or_else(|| QaError::InvalidArgument("statement produced no result set".into()))?;
        let names: Vec<String> = statement
            .column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut map = HashMap::with_capacity(names.len());
            for (i, name) in names.iter().enumerate() {
                map.insert(name.clone(), convert_value_ref(row.get_ref(i)?));
            }
            out.push(map);
        }
        Ok(out)
    }

    /// Execute SQL and return the first column of the first row.
    pub fn execute_scalar(&self, sql: &str, params: &[String]) -> Result<Option<Value>> {
        let mut stmt = self.conn.prepare(sql)?;
        let param_values: Vec<&dyn duckdb::ToSql> =
            params.iter().map(|p| p as &dyn duckdb::ToSql).collect();
        let mut rows = stmt.query(param_values.as_slice())?;
        match rows.next()? {
            Some(row) => Ok(Some(convert_value_ref(row.get_ref(0)?))),
            None => Ok(None),
        }
    }

    /// Access the underlying DuckDB connection.
    pub fn raw(&self) -> &DuckDbConnection {
        &self.conn
    }

    /// `DESCRIBE` the raw table and map lowercase names to header names.
    fn introspect_columns(&self) -> Result<ColumnMap> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT column_name FROM (DESCRIBE {})", RAW_TABLE))?;
        let mut rows = stmt.query([])?;
        let mut map = HashMap::new();
        while let Some(row) = rows.next()? {
            let name: String = row.get(0)?;
            map.insert(name.trim().to_lowercase(), name);
        }
        Ok(ColumnMap(map))
    }
}

// ---------------------------------------------------------------------------
// Row coercion
// ---------------------------------------------------------------------------

fn parse_record(row: &HashMap<String, Value>) -> Result<PerformanceRecord> {
    let row_no = row
        .get("row_index")
        .and_then(Value::as_u64)
        .map(|i| i as usize + 1)
        .unwrap_or(0);
    let field = FieldReader { row, row_no };

    let date_raw = field.text("date")?;
    let date = NaiveDate::parse_from_str(date_raw.trim(), DATE_FORMAT)
        .map_err(|e| field.error("date", date_raw, &e.to_string()))?;

    let mut record = PerformanceRecord::new(
        date,
        field.text("platform")?.trim(),
        field.text("campaign_name")?.trim(),
        field.amount("spend")?,
        field.count("impressions")?,
        field.count("clicks")?,
        field.count("conversions")?,
        field.amount("roas")?,
    );
    if row.contains_key("ctr") {
        record.ctr = field.amount("ctr")?;
    }
    if row.contains_key("cpc") {
        record.cpc = field.amount("cpc")?;
    }
    if row.contains_key("cpm") {
        record.cpm = field.amount("cpm")?;
    }
    Ok(record)
}

struct FieldReader<'a> {
    row: &'a HashMap<String, Value>,
    row_no: usize,
}

impl<'a> FieldReader<'a> {
    fn text(&self, column: &str) -> Result<&'a str> {
        match self.row.get(column) {
            Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.as_str()),
            _ => Err(self.error(column, "", "missing value")),
        }
    }

    /// A finite, non-negative decimal.
    fn amount(&self, column: &str) -> Result<f64> {
        let raw = self.text(column)?;
        let value: f64 = raw
            .trim()
            .parse()
            .map_err(|_| self.error(column, raw, "not a number"))?;
        if !value.is_finite() {
            return Err(self.error(column, raw, "not a finite number"));
        }
        if value < 0.0 {
            return Err(self.error(column, raw, "negative value"));
        }
        Ok(value)
    }

    /// A non-negative integer.
    fn count(&self, column: &str) -> Result<u64> {
        let raw = self.text(column)?;
        raw.trim()
            .parse()
            .map_err(|_| self.error(column, raw, "not a non-negative integer"))
    }

    fn error(&self, column: &str, value: &str, reason: &str) -> QaError {
        QaError::Load {
            row: self.row_no,
            column: column.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Convert a DuckDB `ValueRef` to a `serde_json::Value`.
fn convert_value_ref(val: ValueRef<'_>) -> Value {
    match val {
        ValueRef::Null => Value::Null,
        ValueRef::Boolean(b) => Value::Bool(b),
        ValueRef::TinyInt(n) => Value::Number(n.into()),
        ValueRef::SmallInt(n) => Value::Number(n.into()),
        ValueRef::Int(n) => Value::Number(n.into()),
        ValueRef::BigInt(n) => Value::Number(n.into()),
        ValueRef::UBigInt(n) => Value::Number(n.into()),
        ValueRef::HugeInt(n) => match i64::try_from(n) {
            Ok(i) => Value::Number(i.into()),
            Err(_) => Value::String(n.to_string()),
        },
        ValueRef::Double(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).to_string()),
        _ => Value::Null,
    }
}
