//! INI-backed sources: one reading a file, one reading a string.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::ConfigSource;
use super::ini_parser::IniDocument;
use crate::constants::DEFAULT_INI_ORIGIN;
use crate::error::{ConfigError, Result};

/// A source parsed from INI text held in memory.
#[derive(Debug, Clone)]
pub struct IniStringConfigSource {
    document: IniDocument,
}

impl IniStringConfigSource {
    /// Parse `ini`. Errors are reported against the origin `<string>`.
    pub fn new(ini: &str) -> Result<Self> {
        Self::with_origin(ini, DEFAULT_INI_ORIGIN)
    }

    /// Parse `ini`, naming it `origin` in parse errors.
    pub fn with_origin(ini: &str, origin: &str) -> Result<Self> {
        Ok(Self {
            document: IniDocument::parse(ini, origin)?,
        })
    }
}

impl ConfigSource for IniStringConfigSource {
    fn get_config_value(&self, section_name: &str, key_name: &str) -> Option<String> {
        self.document
            .get(section_name, key_name)
            .map(str::to_string)
    }
}

/// A source parsed from an INI file at construction time.
///
/// The file is read once; later edits are not picked up.
#[derive(Clone)]
pub struct IniFileConfigSource {
    path: PathBuf,
    document: IniDocument,
}

impl IniFileConfigSource {
    /// Read a file that must exist.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open(path, true)
    }

    /// Read a file if it exists; otherwise the source is permanently empty.
    pub fn optional(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open(path, false)
    }

    /// Read `path`. When `must_exist` is false a missing file yields an empty source.
    ///
    /// # Errors
    ///
    /// - `ConfigError::FileNotFound` if the file is missing and `must_exist` is true.
    /// - `ConfigError::FileRead` if the file cannot be read or is not UTF-8.
    /// - `ConfigError::IniParse` if the contents are not a valid INI document.
    pub fn open(path: impl Into<PathBuf>, must_exist: bool) -> Result<Self> {
        let path = path.into();
        let document = match std::fs::read_to_string(&path) {
            Ok(content) => {
                let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
                IniDocument::parse(content, &path.display().to_string())?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                if must_exist {
                    return Err(ConfigError::FileNotFound { path });
                }
                tracing::debug!(path = %path.display(), "Optional config file not found, source is empty");
                IniDocument::default()
            }
            Err(source) => return Err(ConfigError::FileRead { path, source }),
        };
        Ok(Self { path, document })
    }

    /// The file this source was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for IniFileConfigSource {
    fn get_config_value(&self, section_name: &str, key_name: &str) -> Option<String> {
        self.document
            .get(section_name, key_name)
            .map(str::to_string)
    }
}

impl fmt::Debug for IniFileConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IniFileConfigSource")
            .field("path", &self.path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SAMPLE: &str = "\n[s]\na = 1\nB = 2\n";

    fn assert_sample_lookups(source: &dyn ConfigSource) {
        assert_eq!(source.get_config_value("s", "A"), Some("1".to_string()));
        assert_eq!(source.get_config_value("s", "a"), Some("1".to_string()));
        assert_eq!(source.get_config_value("s", "B"), Some("2".to_string()));
        assert_eq!(source.get_config_value("s", "b"), Some("2".to_string()));
        assert_eq!(source.get_config_value("t", "A"), None);
        assert_eq!(source.get_config_value("s", "C"), None);
    }

    #[test]
    fn test_ini_string_source() {
        let source = IniStringConfigSource::new(SAMPLE).unwrap();
        assert_sample_lookups(&source);
    }

    #[test]
    fn test_ini_string_parse_error_uses_origin() {
        let err = IniStringConfigSource::with_origin("[s\n", "inline-defaults").unwrap_err();
        assert!(matches!(err, ConfigError::IniParse { ref origin, line: 1, .. } if origin == "inline-defaults"));
    }

    #[test]
    fn test_ini_file_source() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.cfg");
        fs::write(&path, SAMPLE).unwrap();

        let source = IniFileConfigSource::new(&path).unwrap();
        assert_sample_lookups(&source);
        assert_eq!(source.path(), path.as_path());
        assert_eq!(
            format!("{:?}", source),
            format!("IniFileConfigSource {{ path: {:?} }}", path)
        );
    }

    #[test]
    fn test_ini_file_with_byte_order_mark() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bom.ini");
        fs::write(&path, format!("\u{feff}{}", SAMPLE)).unwrap();

        let source = IniFileConfigSource::new(&path).unwrap();
        assert_sample_lookups(&source);
    }

    #[test]
    fn test_missing_file_optional_is_empty() {
        let source =
            IniFileConfigSource::optional("config-this-file-definitely-does-not-exist.cfg").unwrap();
        assert_eq!(source.get_config_value("s", "a"), None);
    }

    #[test]
    fn test_missing_file_must_exist_fails() {
        let err = IniFileConfigSource::open("config-this-file-definitely-does-not-exist.cfg", true)
            .unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_optional_file_still_rejects_bad_contents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.ini");
        fs::write(&path, "no header = here\n").unwrap();

        let err = IniFileConfigSource::optional(&path).unwrap_err();
        assert!(matches!(err, ConfigError::IniParse { .. }));
    }

    #[test]
    fn test_non_utf8_file_is_read_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("latin1.ini");
        fs::write(&path, b"[s]\nname = caf\xe9\n").unwrap();

        let err = IniFileConfigSource::new(&path).unwrap_err();
        assert!(matches!(err, ConfigError::FileRead { .. }));
    }
}
