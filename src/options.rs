//! # Options
//!
//! Page geometry and rendering switches for a transcription run.
//!
//! Options can be written in YAML with kebab-case keys; every key is
//! optional and falls back to its default:
//!
//! ```yaml
//! page-width: 32
//! page-height: 27
//! show-fingering: true
//! unsupported: omit        # or strict
//! compress-repeats: true
//! part-indicators: false
//! ```

use serde::Deserialize;

use crate::error::{BrailleError, Result};

/// Narrowest page the layout can work with
pub const MIN_PAGE_WIDTH: usize = 8;

/// What to do with a sign the braille tables cannot express
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnsupportedPolicy {
    /// Fail with `UnsupportedNotation`
    #[default]
    Strict,
    /// Log a warning and leave the sign out
    Omit,
}

impl UnsupportedPolicy {
    fn from_name(name: &str) -> Result<Self> {
        match name.trim() {
            "strict" => Ok(UnsupportedPolicy::Strict),
            "omit" => Ok(UnsupportedPolicy::Omit),
            other => Err(BrailleError::OptionsError(format!(
                "unsupported must be 'strict' or 'omit', got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// Braille cells per line
    pub page_width: usize,
    /// Lines per page, including the page number line
    pub page_height: usize,
    pub show_fingering: bool,
    pub unsupported: UnsupportedPolicy,
    /// Abbreviate runs of identical notes within a voice
    pub compress_repeats: bool,
    /// Mark the staves of two-staff segments as right and left hand
    pub part_indicators: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            page_width: 40,
            page_height: 25,
            show_fingering: false,
            unsupported: UnsupportedPolicy::Strict,
            compress_repeats: false,
            part_indicators: true,
        }
    }
}

/// Options as written in YAML
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RawOptions {
    pub page_width: Option<usize>,
    pub page_height: Option<usize>,
    pub show_fingering: Option<bool>,
    pub unsupported: Option<String>,
    pub compress_repeats: Option<bool>,
    pub part_indicators: Option<bool>,
}

impl Options {
    pub fn from_yaml(source: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to an empty mapping
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: RawOptions =
            serde_yaml::from_str(source).map_err(|e| BrailleError::OptionsError(e.to_string()))?;
        Self::from_raw(raw)
    }

    pub fn from_raw(raw: RawOptions) -> Result<Self> {
        let defaults = Self::default();

        let page_width = raw.page_width.unwrap_or(defaults.page_width);
        if page_width < MIN_PAGE_WIDTH {
            return Err(BrailleError::OptionsError(format!(
                "page-width must be at least {}, got {}",
                MIN_PAGE_WIDTH, page_width
            )));
        }
        let page_height = raw.page_height.unwrap_or(defaults.page_height);
        if page_height == 0 {
            return Err(BrailleError::OptionsError(
                "page-height must be at least 1".to_string(),
            ));
        }
        let unsupported = match &raw.unsupported {
            Some(name) => UnsupportedPolicy::from_name(name)?,
            None => defaults.unsupported,
        };

        Ok(Self {
            page_width,
            page_height,
            show_fingering: raw.show_fingering.unwrap_or(defaults.show_fingering),
            unsupported,
            compress_repeats: raw.compress_repeats.unwrap_or(defaults.compress_repeats),
            part_indicators: raw.part_indicators.unwrap_or(defaults.part_indicators),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_gives_defaults() {
        assert_eq!(Options::from_yaml("").unwrap(), Options::default());
        assert_eq!(Options::from_yaml("{}").unwrap(), Options::default());
    }

    #[test]
    fn test_all_keys() {
        let yaml = r#"
page-width: 32
page-height: 27
show-fingering: true
unsupported: omit
compress-repeats: true
part-indicators: false
"#;
        let options = Options::from_yaml(yaml).unwrap();
        assert_eq!(options.page_width, 32);
        assert_eq!(options.page_height, 27);
        assert!(options.show_fingering);
        assert_eq!(options.unsupported, UnsupportedPolicy::Omit);
        assert!(options.compress_repeats);
        assert!(!options.part_indicators);
    }

    #[test]
    fn test_invalid_values() {
        let narrow = Options::from_yaml("page-width: 4").unwrap_err();
        assert_eq!(narrow.kind(), crate::ErrorKind::Options);
        assert!(Options::from_yaml("page-height: 0").is_err());
        assert!(Options::from_yaml("unsupported: lenient").is_err());
        assert!(Options::from_yaml("page-colour: blue").is_err(), "unknown keys are rejected");
    }
}
