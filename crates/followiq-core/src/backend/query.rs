//! Table query description shared by the REST and in-memory backends

use serde_json::Value;

pub const CONTACT_SUBMISSIONS: &str = "contact_submissions";
pub const PROFILES: &str = "profiles";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Equality filters, ordering and a row limit against one table
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    pub filters: Vec<(String, Value)>,
    pub order: Option<(String, Order)>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((column.into(), value.into()));
        self
    }

    pub fn order(mut self, column: impl Into<String>, order: Order) -> Self {
        self.order = Some((column.into(), order));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Query-string pairs in PostgREST notation (`col=eq.value`, `order=col.desc`)
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.filters.len() + 2);
        for (column, value) in &self.filters {
            pairs.push((column.clone(), format!("eq.{}", filter_literal(value))));
        }
        if let Some((column, order)) = &self.order {
            pairs.push(("order".to_string(), format!("{}.{}", column, order.as_str())));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }

    /// True when every equality filter holds for `row`
    pub fn matches(&self, row: &Value) -> bool {
        self.filters.iter().all(|(column, expected)| {
            row.get(column)
                .map(|actual| filter_literal(actual) == filter_literal(expected))
                .unwrap_or(false)
        })
    }
}

/// Render a JSON scalar the way it appears in a filter string
pub(crate) fn filter_literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}
