//! Parameterized SELECT assembly.
//!
//! Accumulates clauses and a parameter list; every user value occupies
//! a positional `$N` slot (1-indexed). Helpers that accept caller
//! fragments containing `$1..$M` remap those placeholders onto the
//! builder's current offset before concatenation — the only mechanism
//! by which user data enters the SQL text.
//!
//! ```
//! use mtgjson_query::QueryBuilder;
//!
//! let mut q = QueryBuilder::new("cards");
//! q.where_eq("setCode", "MH3").where_like("name", "Lightning%");
//! q.order_by(&["name ASC"]).limit(10);
//! let (sql, params) = q.build();
//! assert!(sql.contains("setCode = $1"));
//! ```

use crate::engine::Param;
use crate::error::{Error, Result};

/// Fluent, strictly parameterized SQL SELECT builder.
pub struct QueryBuilder {
    select: Vec<String>,
    distinct: bool,
    from: String,
    joins: Vec<String>,
    conjuncts: Vec<String>,
    params: Vec<Param>,
    group_by: Vec<String>,
    having: Vec<String>,
    order_by: Vec<String>,
    limit: Option<usize>,
    offset: Option<usize>,
}

impl QueryBuilder {
    /// Target the given table or view. Selection defaults to `*`.
    pub fn new(table: &str) -> Self {
        Self {
            select: vec!["*".to_string()],
            distinct: false,
            from: table.to_string(),
            joins: Vec::new(),
            conjuncts: Vec::new(),
            params: Vec::new(),
            group_by: Vec::new(),
            having: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Replace the default `*` projection.
    pub fn select(&mut self, columns: &[&str]) -> &mut Self {
        self.select = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn distinct(&mut self) -> &mut Self {
        self.distinct = true;
        self
    }

    /// Append a full JOIN clause, e.g. `"JOIN sets s ON c.setCode = s.code"`.
    pub fn join(&mut self, clause: &str) -> &mut Self {
        self.joins.push(clause.to_string());
        self
    }

    /// Remap `$1..$count` in `fragment` onto the current parameter
    /// offset. Highest index first, so `$1` cannot clobber `$12`.
    fn remap(&self, fragment: &str, count: usize) -> String {
        let offset = self.params.len();
        let mut remapped = fragment.to_string();
        for i in (1..=count).rev() {
            remapped = remapped.replace(&format!("${i}"), &format!("${}", offset + i));
        }
        remapped
    }

    /// Append one WHERE conjunct whose `$1..$M` placeholders are
    /// remapped; `params` are bound in order.
    pub fn where_clause(&mut self, fragment: &str, params: Vec<Param>) -> &mut Self {
        let remapped = self.remap(fragment, params.len());
        self.conjuncts.push(remapped);
        self.params.extend(params);
        self
    }

    /// `column = $N`.
    pub fn where_eq(&mut self, column: &str, value: impl Into<Param>) -> &mut Self {
        let idx = self.params.len() + 1;
        self.conjuncts.push(format!("{column} = ${idx}"));
        self.params.push(value.into());
        self
    }

    /// `column >= $N`.
    pub fn where_gte(&mut self, column: &str, value: impl Into<Param>) -> &mut Self {
        let idx = self.params.len() + 1;
        self.conjuncts.push(format!("{column} >= ${idx}"));
        self.params.push(value.into());
        self
    }

    /// `column <= $N`.
    pub fn where_lte(&mut self, column: &str, value: impl Into<Param>) -> &mut Self {
        let idx = self.params.len() + 1;
        self.conjuncts.push(format!("{column} <= ${idx}"));
        self.params.push(value.into());
        self
    }

    /// `column IN ($N, ...)`; an empty list renders `FALSE`, so the
    /// surrounding conjunction still parses and matches no rows.
    pub fn where_in<P: Into<Param> + Clone>(&mut self, column: &str, values: &[P]) -> &mut Self {
        if values.is_empty() {
            self.conjuncts.push("FALSE".to_string());
            return self;
        }
        let mut placeholders = Vec::with_capacity(values.len());
        for v in values {
            let idx = self.params.len() + 1;
            placeholders.push(format!("${idx}"));
            self.params.push(v.clone().into());
        }
        self.conjuncts
            .push(format!("{column} IN ({})", placeholders.join(", ")));
        self
    }

    /// Case-insensitive LIKE: `LOWER(column) LIKE LOWER($N)`.
    pub fn where_like(&mut self, column: &str, pattern: &str) -> &mut Self {
        let idx = self.params.len() + 1;
        self.conjuncts
            .push(format!("LOWER({column}) LIKE LOWER(${idx})"));
        self.params.push(Param::Text(pattern.to_string()));
        self
    }

    /// Regex match via `regexp_matches(column, $N)`.
    pub fn where_regex(&mut self, column: &str, pattern: &str) -> &mut Self {
        let idx = self.params.len() + 1;
        self.conjuncts
            .push(format!("regexp_matches({column}, ${idx})"));
        self.params.push(Param::Text(pattern.to_string()));
        self
    }

    /// Typo-tolerant match: `jaro_winkler_similarity(column, $N) > threshold`.
    ///
    /// The threshold must lie in `[0, 1]`.
    pub fn where_fuzzy(
        &mut self,
        column: &str,
        value: &str,
        threshold: f64,
    ) -> Result<&mut Self> {
        if !(0.0..=1.0).contains(&threshold) || threshold.is_nan() {
            return Err(Error::InvalidArgument(format!(
                "fuzzy threshold must be between 0 and 1, got {threshold}"
            )));
        }
        let idx = self.params.len() + 1;
        self.conjuncts.push(format!(
            "jaro_winkler_similarity({column}, ${idx}) > {threshold}"
        ));
        self.params.push(Param::Text(value.to_string()));
        Ok(self)
    }

    /// OR-combined group. Each condition carries its own `$1`
    /// placeholder, remapped onto the running offset; the group is
    /// wrapped in parentheses.
    pub fn where_or(&mut self, conditions: &[(&str, Param)]) -> &mut Self {
        if conditions.is_empty() {
            return self;
        }
        let mut parts = Vec::with_capacity(conditions.len());
        for (fragment, param) in conditions {
            let idx = self.params.len() + 1;
            parts.push(fragment.replace("$1", &format!("${idx}")));
            self.params.push(param.clone());
        }
        self.conjuncts.push(format!("({})", parts.join(" OR ")));
        self
    }

    pub fn group_by(&mut self, columns: &[&str]) -> &mut Self {
        self.group_by.extend(columns.iter().map(|c| c.to_string()));
        self
    }

    /// HAVING condition; placeholders remapped like [`where_clause`](Self::where_clause).
    pub fn having(&mut self, fragment: &str, params: Vec<Param>) -> &mut Self {
        let remapped = self.remap(fragment, params.len());
        self.having.push(remapped);
        self.params.extend(params);
        self
    }

    pub fn order_by(&mut self, clauses: &[&str]) -> &mut Self {
        self.order_by.extend(clauses.iter().map(|c| c.to_string()));
        self
    }

    /// Register a parameter outside a WHERE conjunct and return its
    /// `$N` placeholder, for parameterized ORDER BY expressions.
    pub fn bind(&mut self, value: impl Into<Param>) -> String {
        self.params.push(value.into());
        format!("${}", self.params.len())
    }

    pub fn limit(&mut self, n: usize) -> &mut Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(&mut self, n: usize) -> &mut Self {
        self.offset = Some(n);
        self
    }

    /// Assemble the SQL text and parameter list. No validation beyond
    /// shape is performed here.
    pub fn build(&self) -> (String, Vec<Param>) {
        let distinct = if self.distinct { "DISTINCT " } else { "" };
        let mut parts = vec![
            format!("SELECT {distinct}{}", self.select.join(", ")),
            format!("FROM {}", self.from),
        ];
        parts.extend(self.joins.iter().cloned());

        if !self.conjuncts.is_empty() {
            parts.push(format!("WHERE {}", self.conjuncts.join(" AND ")));
        }
        if !self.group_by.is_empty() {
            parts.push(format!("GROUP BY {}", self.group_by.join(", ")));
        }
        if !self.having.is_empty() {
            parts.push(format!("HAVING {}", self.having.join(" AND ")));
        }
        if !self.order_by.is_empty() {
            parts.push(format!("ORDER BY {}", self.order_by.join(", ")));
        }
        if let Some(n) = self.limit {
            parts.push(format!("LIMIT {n}"));
        }
        if let Some(n) = self.offset {
            parts.push(format!("OFFSET {n}"));
        }
        (parts.join("\n"), self.params.clone())
    }
}
