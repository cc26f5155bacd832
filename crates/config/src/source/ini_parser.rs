//! INI document parsing.
//!
//! Responsibilities:
//! - Parse `[section]` headers and `key = value` / `key: value` lines into a
//!   case-insensitive `section -> key -> value` table.
//! - Support full-line `#`/`;` comments, indented continuation lines, and a
//!   `[DEFAULT]` section whose keys are fallbacks for every other section.
//!
//! Does NOT handle:
//! - Value interpolation (`%(name)s`); values are returned exactly as written.
//! - Inline comments; `key = a ; b` yields `a ; b`.
//!
//! Invariants:
//! - Parsing is all-or-nothing: the first error aborts with its 1-based line number.
//! - Section and key names are stored normalized; values are trimmed.

use std::collections::HashMap;
use std::fmt;

use super::normalize_name;
use crate::constants::{INI_COMMENT_PREFIXES, INI_DEFAULT_SECTION, INI_DELIMITERS};
use crate::error::{ConfigError, IniErrorKind, Result};

#[derive(Clone, Default)]
pub(crate) struct IniDocument {
    defaults: HashMap<String, String>,
    sections: HashMap<String, HashMap<String, String>>,
}

/// The key whose value the next indented line extends.
struct OpenValue {
    section: Option<String>,
    key: String,
    indent: usize,
}

impl IniDocument {
    pub(crate) fn parse(text: &str, origin: &str) -> Result<Self> {
        let mut document = IniDocument::default();
        // `None` = no header seen yet, `Some(None)` = [DEFAULT], `Some(Some(name))` = a section.
        let mut current: Option<Option<String>> = None;
        let mut open: Option<OpenValue> = None;

        for (index, raw_line) in text.lines().enumerate() {
            let line_no = index + 1;
            let fail = |kind| ConfigError::IniParse {
                origin: origin.to_string(),
                line: line_no,
                kind,
            };
            let trimmed = raw_line.trim();

            if trimmed.is_empty() {
                open = None;
                continue;
            }
            if trimmed.starts_with(INI_COMMENT_PREFIXES) {
                continue;
            }

            let indent = raw_line.len() - raw_line.trim_start().len();
            if let Some(value) = open.as_ref().filter(|value| indent > value.indent) {
                document.append_line(value, trimmed);
                continue;
            }

            if trimmed.starts_with('[') {
                let name = trimmed
                    .strip_prefix('[')
                    .and_then(|rest| rest.strip_suffix(']'))
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .ok_or_else(|| fail(IniErrorKind::MalformedHeader(trimmed.to_string())))?;
                let normalized = normalize_name(name);
                if normalized == INI_DEFAULT_SECTION {
                    current = Some(None);
                } else {
                    if document.sections.contains_key(&normalized) {
                        return Err(fail(IniErrorKind::DuplicateSection(name.to_string())));
                    }
                    document.sections.insert(normalized.clone(), HashMap::new());
                    current = Some(Some(normalized));
                }
                open = None;
                continue;
            }

            let section = current
                .clone()
                .ok_or_else(|| fail(IniErrorKind::MissingSectionHeader))?;
            let (raw_key, raw_value) = trimmed
                .split_once(INI_DELIMITERS)
                .filter(|(key, _)| !key.trim().is_empty())
                .ok_or_else(|| fail(IniErrorKind::MissingDelimiter(trimmed.to_string())))?;
            let key = normalize_name(raw_key.trim());

            let table = document.table_mut(section.as_deref());
            if table.contains_key(&key) {
                return Err(fail(IniErrorKind::DuplicateKey {
                    section: section.unwrap_or_else(|| INI_DEFAULT_SECTION.to_string()),
                    key,
                }));
            }
            table.insert(key.clone(), raw_value.trim().to_string());
            open = Some(OpenValue {
                section,
                key,
                indent,
            });
        }

        Ok(document)
    }

    fn table_mut(&mut self, section: Option<&str>) -> &mut HashMap<String, String> {
        match section {
            None => &mut self.defaults,
            Some(name) => self.sections.entry(name.to_string()).or_default(),
        }
    }

    fn append_line(&mut self, open: &OpenValue, line: &str) {
        if let Some(value) = self.table_mut(open.section.as_deref()).get_mut(&open.key) {
            if !value.is_empty() {
                value.push('\n');
            }
            value.push_str(line);
        }
    }

    /// Look up a value; keys missing from a section fall back to `[DEFAULT]`.
    pub(crate) fn get(&self, section_name: &str, key_name: &str) -> Option<&str> {
        let section = normalize_name(section_name);
        let key = normalize_name(key_name);
        if section == INI_DEFAULT_SECTION {
            return self.defaults.get(&key).map(String::as_str);
        }
        self.sections
            .get(&section)?
            .get(&key)
            .or_else(|| self.defaults.get(&key))
            .map(String::as_str)
    }

    pub(crate) fn section_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.sections.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for IniDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IniDocument")
            .field("sections", &self.section_names())
            .finish()
    }
}
