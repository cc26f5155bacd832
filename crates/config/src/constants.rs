//! Centralized constants for typed-config.
//!
//! Default labels, separators and word lists shared by the sources and casts.

// =============================================================================
// Environment Source
// =============================================================================

/// Separator placed between prefix, section and key in environment variable names.
pub const ENV_SEPARATOR: char = '_';

/// Environment variable that disables `.env` loading when set to `1` or `true`.
pub const DOTENV_DISABLED_VAR: &str = "DOTENV_DISABLED";

// =============================================================================
// INI Sources
// =============================================================================

/// Origin label used in parse errors for INI documents read from strings.
pub const DEFAULT_INI_ORIGIN: &str = "<string>";

/// Section whose keys act as fallbacks for every other section.
pub const INI_DEFAULT_SECTION: &str = "default";

/// Prefixes that mark a whole INI line as a comment.
pub const INI_COMMENT_PREFIXES: &[char] = &['#', ';'];

/// Characters accepted between an INI key and its value.
pub const INI_DELIMITERS: &[char] = &['=', ':'];

// =============================================================================
// Casts
// =============================================================================

/// Default delimiter for list casts.
pub const DEFAULT_LIST_DELIMITER: &str = ",";

/// Words accepted as `true` by the boolean cast (compared case-insensitively).
pub const TRUE_WORDS: &[&str] = &["1", "yes", "true", "on"];

/// Words accepted as `false` by the boolean cast (compared case-insensitively).
pub const FALSE_WORDS: &[&str] = &["0", "no", "false", "off"];
