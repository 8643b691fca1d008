//! Parameterized SELECT construction for record loads.
//!
//! Filter values always travel as `?` parameters, never interpolated into the
//! SQL text. Column names and expressions are trusted (they come from this
//! crate, not from user input).
//!
//! # Example
//!
//! ```rust
//! use campaign_qa::SqlBuilder;
//! let (sql, params) = SqlBuilder::new("raw_records")
//!     .select(&["date", "platform"])
//!     .where_in_trimmed("platform", &["Meta", "Amazon"])
//!     .where_gte("date", "2024-06-01")
//!     .order_by(&["rowid"])
//!     .build();
//! assert_eq!(params, vec!["meta", "amazon", "2024-06-01"]);
//! ```

pub struct SqlBuilder {
    table: String,
    columns: Vec<String>,
    conditions: Vec<String>,
    params: Vec<String>,
    order: Vec<String>,
    limit: Option<usize>,
}

impl SqlBuilder {
    /// Start a `SELECT *` from `table`.
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: vec!["*".to_string()],
            conditions: Vec::new(),
            params: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    /// Replace the selected columns or expressions.
    pub fn select(&mut self, cols: &[&str]) -> &mut Self {
        self.columns = cols.iter().map(|c| c.to_string()).collect();
        self
    }

    /// `{column} >= ?`
    pub fn where_gte(&mut self, column: &str, value: &str) -> &mut Self {
        self.conditions.push(format!("{} >= ?", column));
        self.params.push(value.to_string());
        self
    }

    /// `{column} <= ?`
    pub fn where_lte(&mut self, column: &str, value: &str) -> &mut Self {
        self.conditions.push(format!("{} <= ?", column));
        self.params.push(value.to_string());
        self
    }

    /// Membership test that ignores case and surrounding whitespace on both
    /// sides: `LOWER(TRIM({column})) IN (?, ...)`.
    ///
    /// An empty value list matches nothing.
    pub fn where_in_trimmed(&mut self, column: &str, values: &[&str]) -> &mut Self {
        if values.is_empty() {
            self.conditions.push("FALSE".to_string());
            return self;
        }
        let placeholders = vec!["?"; values.len()].join(", ");
        self.conditions
            .push(format!("LOWER(TRIM({})) IN ({})", column, placeholders));
        self.params
            .extend(values.iter().map(|v| v.trim().to_lowercase()));
        self
    }

    pub fn order_by(&mut self, clauses: &[&str]) -> &mut Self {
        self.order.extend(clauses.iter().map(|c| c.to_string()));
        self
    }

    pub fn limit(&mut self, n: usize) -> &mut Self {
        self.limit = Some(n);
        self
    }

    /// The SQL text and its parameters, in placeholder order.
    pub fn build(&self) -> (String, Vec<String>) {
        let mut sql = format!("SELECT {}\nFROM {}", self.columns.join(", "), self.table);
        if !self.conditions.is_empty() {
            sql.push_str(&format!("\nWHERE {}", self.conditions.join(" AND ")));
        }
        if !self.order.is_empty() {
            sql.push_str(&format!("\nORDER BY {}", self.order.join(", ")));
        }
        if let Some(n) = self.limit {
            sql.push_str(&format!("\nLIMIT {}", n));
        }
        (sql, self.params.clone())
    }
}
