//! Query spec and its request parameter encoding.

use std::collections::BTreeMap;
use std::fmt;

/// Request parameter carrying the one-based page number.
pub const PAGE_PARAM: &str = "page";
/// Request parameter carrying the page size.
pub const SIZE_PARAM: &str = "size";
/// Request parameter carrying one `column:direction` sort key. Repeated.
pub const SORT_PARAM: &str = "sort";
/// Request parameter carrying the free-text search term.
pub const TERM_PARAM: &str = "search";

/// Parameter names a column id must not shadow.
pub const RESERVED_PARAMS: [&str; 4] = [PAGE_PARAM, SIZE_PARAM, SORT_PARAM, TERM_PARAM];

/// Sort direction for ordering results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// Ascending order (A-Z, 0-9).
    Asc,
    /// Descending order (Z-A, 9-0).
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }

    /// Parses `asc`/`desc`, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Some(Direction::Asc),
            "desc" => Some(Direction::Desc),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the ordered sort sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SortKey {
    pub column: String,
    pub direction: Direction,
}

impl SortKey {
    pub fn new(column: impl Into<String>, direction: Direction) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    /// Parses `column:direction`.
    pub fn parse(s: &str) -> Option<Self> {
        let (column, direction) = s.rsplit_once(':')?;
        if column.is_empty() {
            return None;
        }
        Some(Self::new(column, Direction::parse(direction)?))
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.column, self.direction)
    }
}

/// A per-column filter value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterValue {
    /// Exact or server-interpreted text match.
    Text(String),
    /// Numeric match (ids, counts).
    Number(i64),
    /// Boolean flag.
    Flag(bool),
    /// Any of several values; the parameter repeats once per value.
    List(Vec<String>),
}

impl FilterValue {
    /// Empty text and empty lists mean "no filter".
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Text(s) => s.trim().is_empty(),
            FilterValue::List(values) => values.iter().all(|v| v.trim().is_empty()),
            FilterValue::Number(_) | FilterValue::Flag(_) => false,
        }
    }

    /// The parameter values this filter serializes to.
    pub fn param_values(&self) -> Vec<String> {
        match self {
            FilterValue::Text(s) => vec![s.clone()],
            FilterValue::Number(n) => vec![n.to_string()],
            FilterValue::Flag(b) => vec![b.to_string()],
            FilterValue::List(values) => values
                .iter()
                .filter(|v| !v.trim().is_empty())
                .cloned()
                .collect(),
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.param_values().join(","))
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Number(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Flag(value)
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(values: Vec<String>) -> Self {
        FilterValue::List(values)
    }
}

/// The full description of what data a grid displays.
///
/// Two specs are equal iff every field matches; equality (and hashing) is
/// what keys the result cache. Filters live in an ordered map so insertion
/// order never produces distinct keys for the same query.
///
/// Specs are only changed through the query controller once a grid is
/// mounted; the `with_*` constructors are for building the initial spec.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QuerySpec {
    pub(crate) page: u32,
    pub(crate) size: u32,
    pub(crate) sort: Vec<SortKey>,
    pub(crate) filters: BTreeMap<String, FilterValue>,
    pub(crate) term: String,
}

impl QuerySpec {
    /// Page one of `size` rows, unsorted and unfiltered.
    ///
    /// A size of zero is raised to one.
    pub fn new(size: u32) -> Self {
        Self {
            page: 1,
            size: size.max(1),
            sort: Vec::new(),
            filters: BTreeMap::new(),
            term: String::new(),
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Appends a sort key, replacing an earlier key on the same column.
    pub fn with_sort(mut self, column: impl Into<String>, direction: Direction) -> Self {
        let column = column.into();
        self.sort.retain(|key| key.column != column);
        self.sort.push(SortKey::new(column, direction));
        self
    }

    /// Sets a filter; empty values are ignored.
    pub fn with_filter(mut self, column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.filters.insert(column.into(), value);
        }
        self
    }

    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.term = term.into().trim().to_string();
        self
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn sort(&self) -> &[SortKey] {
        &self.sort
    }

    pub fn filters(&self) -> &BTreeMap<String, FilterValue> {
        &self.filters
    }

    pub fn filter(&self, column: &str) -> Option<&FilterValue> {
        self.filters.get(column)
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    /// Zero-based index of the first row on the current page.
    pub fn first_row_index(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.size)
    }

    /// Serializes the spec into flat request parameters.
    ///
    /// Order: page, size, one `sort=column:direction` per key, filters in
    /// column order (list filters repeat the key), then the search term if
    /// non-empty.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            (PAGE_PARAM.to_string(), self.page.to_string()),
            (SIZE_PARAM.to_string(), self.size.to_string()),
        ];

        for key in &self.sort {
            params.push((SORT_PARAM.to_string(), key.to_string()));
        }

        for (column, value) in &self.filters {
            for v in value.param_values() {
                params.push((column.clone(), v));
            }
        }

        if !self.term.is_empty() {
            params.push((TERM_PARAM.to_string(), self.term.clone()));
        }

        params
    }
}

impl fmt::Display for QuerySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .to_params()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        f.write_str(&parts.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_order_and_encoding() {
        let spec = QuerySpec::new(20)
            .with_page(3)
            .with_sort("priority", Direction::Desc)
            .with_sort("title", Direction::Asc)
            .with_filter("status", "active")
            .with_filter("tags", vec!["smoke".to_string(), "login".to_string()])
            .with_term("checkout");

        assert_eq!(
            spec.to_params(),
            vec![
                ("page".to_string(), "3".to_string()),
                ("size".to_string(), "20".to_string()),
                ("sort".to_string(), "priority:desc".to_string()),
                ("sort".to_string(), "title:asc".to_string()),
                ("status".to_string(), "active".to_string()),
                ("tags".to_string(), "smoke".to_string()),
                ("tags".to_string(), "login".to_string()),
                ("search".to_string(), "checkout".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_term_is_omitted() {
        let spec = QuerySpec::new(10);
        assert_eq!(spec.to_string(), "page=1&size=10");
    }

    #[test]
    fn test_filter_insertion_order_does_not_matter() {
        let a = QuerySpec::new(20)
            .with_filter("status", "active")
            .with_filter("priority", "high");
        let b = QuerySpec::new(20)
            .with_filter("priority", "high")
            .with_filter("status", "active");
        assert_eq!(a, b);
        assert_eq!(a.to_params(), b.to_params());
    }

    #[test]
    fn test_empty_filter_values() {
        assert!(FilterValue::from("  ").is_empty());
        assert!(FilterValue::List(vec![]).is_empty());
        assert!(!FilterValue::Number(0).is_empty());
        let spec = QuerySpec::new(20).with_filter("status", "");
        assert!(spec.filters().is_empty());
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!(
            SortKey::parse("created_at:DESC"),
            Some(SortKey::new("created_at", Direction::Desc))
        );
        assert_eq!(SortKey::parse("title"), None);
        assert_eq!(SortKey::parse(":asc"), None);
        assert_eq!(SortKey::parse("title:sideways"), None);
    }

    #[test]
    fn test_first_row_index() {
        assert_eq!(QuerySpec::new(20).with_page(3).first_row_index(), 40);
        assert_eq!(QuerySpec::new(0).size(), 1);
    }
}
