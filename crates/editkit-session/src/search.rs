//! Paginated searches
//!
//! Filters arrive as string parameters whose key suffix names the
//! comparison: `account_id_equals`, `name_equals`, `name_contains`,
//! `amount_gte`, `amount_lte`. Id filters are read as integers.

use crate::{Error, Result};
use editkit_value::Value;
use serde::{Deserialize, Deserializer};
use std::cell::OnceCell;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

const DEFAULT_PER_PAGE: u32 = 20;

/// Classification of a filter key by suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKey<'a> {
    IdEquals { field: &'a str },
    Equals { field: &'a str },
    Contains { field: &'a str },
    Gte { field: &'a str },
    Lte { field: &'a str },
    Unknown,
}

/// Classify a filter key
#[must_use]
pub fn parse_filter_key(key: &str) -> FilterKey<'_> {
    let field = |suffix: &str| key.strip_suffix(suffix).filter(|field| !field.is_empty());

    if let Some(field) = field("_equals") {
        if field.ends_with("_id") {
            return FilterKey::IdEquals { field };
        }
        return FilterKey::Equals { field };
    }
    if let Some(field) = field("_contains") {
        return FilterKey::Contains { field };
    }
    if let Some(field) = field("_gte") {
        return FilterKey::Gte { field };
    }
    if let Some(field) = field("_lte") {
        return FilterKey::Lte { field };
    }
    FilterKey::Unknown
}

/// Leading integer of a parameter, `0` when there is none
fn leading_integer(raw: &str) -> i64 {
    let raw = raw.trim_start();
    let (sign, digits) = match raw.as_bytes().first() {
        Some(b'-') => (-1, &raw[1..]),
        Some(b'+') => (1, &raw[1..]),
        _ => (1, raw),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().map_or(0, |value| sign * value)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientInt {
    Int(i64),
    Text(String),
}

fn lenient_int<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<LenientInt>::deserialize(deserializer)?.map(|value| match value {
            LenientInt::Int(value) => value,
            LenientInt::Text(text) => leading_integer(&text),
        }),
    )
}

/// Request parameters of a search
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub search: HashMap<String, String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub per_page: Option<i64>,
}

impl SearchParams {
    /// Parse parameters from a JSON object
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParams`] for malformed input.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| Error::InvalidParams(err.to_string()))
    }
}

/// Page size limits of a search type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    pub default_per_page: u32,
    pub max_per_page: Option<u32>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_per_page: DEFAULT_PER_PAGE,
            max_per_page: None,
        }
    }
}

impl SearchConfig {
    #[must_use]
    pub fn with_max_per_page(mut self, max: u32) -> Self {
        self.max_per_page = Some(max);
        self
    }

    #[must_use]
    pub fn with_default_per_page(mut self, per_page: u32) -> Self {
        self.default_per_page = per_page;
        self
    }
}

/// What a source needs to produce one page
#[derive(Debug, Clone, Copy)]
pub struct SearchQuery<'a> {
    pub filters: &'a HashMap<String, String>,
    pub page: u32,
    pub per_page: u32,
}

impl SearchQuery<'_> {
    /// Number of records before this page
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }
}

/// One page of results with totals
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub record_count: u64,
    pub page_count: u64,
}

impl<T> Page<T> {
    /// Build a page, deriving the page count from the total
    #[must_use]
    pub fn from_total(items: Vec<T>, record_count: u64, per_page: u32) -> Self {
        let per_page = u64::from(per_page.max(1));
        Self {
            items,
            record_count,
            page_count: record_count.div_ceil(per_page),
        }
    }
}

/// Storage side of a search
pub trait PaginatedSource {
    type Context;
    type Item;

    /// Produce the requested page
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotImplemented`] unless overridden.
    fn paginated_results(
        &self,
        _context: &Self::Context,
        _query: &SearchQuery<'_>,
    ) -> Result<Page<Self::Item>> {
        Err(Error::not_implemented(
            std::any::type_name::<Self>(),
            "paginated_results",
        ))
    }
}

/// A search bound to its parameters; results are fetched once
pub struct Search<S: PaginatedSource> {
    source: S,
    context: S::Context,
    filters: HashMap<String, String>,
    page: u32,
    per_page: u32,
    results: OnceCell<Page<S::Item>>,
}

impl<S: PaginatedSource> Search<S> {
    pub fn new(source: S, context: S::Context, params: SearchParams, config: SearchConfig) -> Self {
        let page = clamp_to_u32(params.page.unwrap_or(1)).max(1);
        let mut per_page = params
            .per_page
            .map_or(config.default_per_page, |requested| clamp_to_u32(requested).max(1));
        if let Some(max) = config.max_per_page {
            per_page = per_page.min(max);
        }
        debug!(page, per_page, filters = params.search.len(), "Built search");
        Self {
            source,
            context,
            filters: params.search,
            page,
            per_page,
            results: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    #[must_use]
    pub fn filters(&self) -> &HashMap<String, String> {
        &self.filters
    }

    #[must_use]
    pub fn context(&self) -> &S::Context {
        &self.context
    }

    /// Value of a filter parameter
    ///
    /// Id filters read as integers (`0` when absent); other filters as
    /// strings or null.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownFilter`] for keys without a known suffix.
    pub fn filter(&self, key: &str) -> Result<Value> {
        let raw = self.filters.get(key);
        match parse_filter_key(key) {
            FilterKey::IdEquals { .. } => {
                Ok(Value::Integer(raw.map_or(0, |raw| leading_integer(raw))))
            }
            FilterKey::Unknown => Err(Error::UnknownFilter(key.to_string())),
            _ => Ok(raw.map_or(Value::Null, |raw| Value::String(raw.clone()))),
        }
    }

    /// The fetched page, loading it on first use
    ///
    /// # Errors
    ///
    /// Propagates failures of the source; nothing is cached on failure.
    pub fn paginated(&self) -> Result<&Page<S::Item>> {
        if let Some(page) = self.results.get() {
            return Ok(page);
        }
        let query = SearchQuery {
            filters: &self.filters,
            page: self.page,
            per_page: self.per_page,
        };
        let page = self.source.paginated_results(&self.context, &query)?;
        Ok(self.results.get_or_init(|| page))
    }

    /// Items of the current page
    ///
    /// # Errors
    ///
    /// See [`Search::paginated`].
    pub fn results(&self) -> Result<&[S::Item]> {
        Ok(&self.paginated()?.items)
    }

    /// Total matching records across pages
    ///
    /// # Errors
    ///
    /// See [`Search::paginated`].
    pub fn count(&self) -> Result<u64> {
        Ok(self.paginated()?.record_count)
    }

    /// # Errors
    ///
    /// See [`Search::paginated`].
    pub fn page_count(&self) -> Result<u64> {
        Ok(self.paginated()?.page_count)
    }
}

impl<S: PaginatedSource> fmt::Debug for Search<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Search")
            .field("filters", &self.filters)
            .field("page", &self.page)
            .field("per_page", &self.per_page)
            .finish_non_exhaustive()
    }
}

fn clamp_to_u32(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}
