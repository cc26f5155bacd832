//! Ready-made cast functions for [`Key::cast`](crate::Key::cast).
//!
//! ```
//! use typed_config::{casts, key};
//!
//! let debug = key().section("app").cast(casts::boolean);
//! let hosts = key().section("app").cast(casts::list(casts::identity, casts::ListCast::new()));
//! # let _ = (debug, hosts);
//! ```

use std::str::FromStr;

use thiserror::Error;

use crate::constants::{DEFAULT_LIST_DELIMITER, FALSE_WORDS, TRUE_WORDS};
use crate::error::CastError;

/// Failures reported by the helpers in this module.
#[derive(Error, Debug)]
pub enum CastFailure {
    #[error("not a boolean: {0:?}")]
    InvalidBoolean(String),

    #[error("unknown value {value:?}, expected one of: {}", expected.join(", "))]
    UnknownVariant { value: String, expected: Vec<String> },

    #[error("item {index}: {source}")]
    ListItem {
        index: usize,
        #[source]
        source: CastError,
    },
}

/// The raw string, unchanged.
pub fn identity(raw: &str) -> Result<String, CastFailure> {
    Ok(raw.to_string())
}

/// Parse with `T::from_str`.
pub fn parse<T>() -> impl Fn(&str) -> Result<T, T::Err> + Send + Sync + 'static
where
    T: FromStr + 'static,
{
    |raw: &str| raw.parse::<T>()
}

/// `1/yes/true/on` or `0/no/false/off`, any case, surrounding whitespace ignored.
pub fn boolean(raw: &str) -> Result<bool, CastFailure> {
    let word = raw.trim().to_lowercase();
    if TRUE_WORDS.contains(&word.as_str()) {
        Ok(true)
    } else if FALSE_WORDS.contains(&word.as_str()) {
        Ok(false)
    } else {
        Err(CastFailure::InvalidBoolean(raw.to_string()))
    }
}

/// Look the raw string up by exact name in `table`.
///
/// ```
/// use typed_config::casts::one_of;
///
/// #[derive(Clone, Debug, PartialEq)]
/// enum Level { Low, High }
///
/// let cast = one_of([("low", Level::Low), ("high", Level::High)]);
/// assert_eq!(cast("high").unwrap(), Level::High);
/// assert!(cast("HIGH").is_err());
/// ```
pub fn one_of<T, S>(
    table: impl IntoIterator<Item = (S, T)>,
) -> impl Fn(&str) -> Result<T, CastFailure> + Send + Sync + 'static
where
    T: Clone + Send + Sync + 'static,
    S: Into<String>,
{
    let table: Vec<(String, T)> = table
        .into_iter()
        .map(|(name, value)| (name.into(), value))
        .collect();
    move |raw: &str| {
        table
            .iter()
            .find(|(name, _)| name == raw)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| CastFailure::UnknownVariant {
                value: raw.to_string(),
                expected: table.iter().map(|(name, _)| name.clone()).collect(),
            })
    }
}

/// Options for [`list`].
#[derive(Debug, Clone)]
pub struct ListCast {
    delimiter: String,
    strip: bool,
    ignore_trailing_empty: bool,
}

impl Default for ListCast {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_LIST_DELIMITER.to_string(),
            strip: true,
            ignore_trailing_empty: true,
        }
    }
}

impl ListCast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Trim whitespace around each item before casting it.
    pub fn strip(mut self, strip: bool) -> Self {
        self.strip = strip;
        self
    }

    /// Drop a single empty item after a trailing delimiter, so `"a,b,"` is two items.
    pub fn ignore_trailing_empty(mut self, ignore: bool) -> Self {
        self.ignore_trailing_empty = ignore;
        self
    }

    fn split<'a>(&self, raw: &'a str) -> Vec<&'a str> {
        if raw.is_empty() {
            return Vec::new();
        }
        let mut items: Vec<&str> = raw.split(self.delimiter.as_str()).collect();
        if self.strip {
            items = items.into_iter().map(str::trim).collect();
        }
        if self.ignore_trailing_empty && items.last().is_some_and(|item| item.is_empty()) {
            items.pop();
        }
        items
    }
}

/// Split the raw string per `options` and cast each item with `item`.
pub fn list<T, E, F>(
    item: F,
    options: ListCast,
) -> impl Fn(&str) -> Result<Vec<T>, CastFailure> + Send + Sync + 'static
where
    T: 'static,
    F: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
    E: Into<CastError> + 'static,
{
    move |raw: &str| {
        options
            .split(raw)
            .into_iter()
            .enumerate()
            .map(|(index, part)| {
                item(part).map_err(|err| CastFailure::ListItem {
                    index,
                    source: err.into(),
                })
            })
            .collect()
    }
}
