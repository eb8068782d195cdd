//! # Resource Manifests
//!
//! Parsing for the key/value descriptor block embedded in plugin artifacts at
//! [`MANIFEST_PATH`]. The syntax is the JAR manifest one:
//!
//! ```text
//! Manifest-Version: 1.0
//! Plugin-Loader: manifest
//! Plugin-Id: example
//!
//! Name: assets/
//! Content-Type: text/plain
//! ```
//!
//! Lines starting with a single space continue the previous value, a blank line
//! closes a section, and every section after the first must begin with a
//! `Name` attribute. Attribute names compare case-insensitively.
use std::collections::BTreeMap;
use std::fmt;

/// Location of the manifest inside a directory or archive resource.
pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

/// Well-known attribute names.
pub mod attributes {
    /// Names the language loader that should handle the artifact.
    pub const PLUGIN_LOADER: &str = "Plugin-Loader";
    pub const PLUGIN_ID: &str = "Plugin-Id";
    pub const PLUGIN_NAME: &str = "Plugin-Name";
    pub const PLUGIN_VERSION: &str = "Plugin-Version";
    pub const PLUGIN_ENTRY: &str = "Plugin-Entry";
    /// Semver requirement on the loader API version.
    pub const PLUGIN_API: &str = "Plugin-Api";
    /// Mixin configuration list; artifacts carrying it are handed to the host as launch resources.
    pub const MIXIN_CONFIGS: &str = "MixinConfigs";
    pub const SECTION_NAME: &str = "Name";
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ManifestParseError {
    #[error("manifest is not valid UTF-8")]
    InvalidUtf8,
    #[error("line {line}: {message}")]
    InvalidLine { line: usize, message: String },
}

/// An ordered set of attributes with case-insensitive names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an attribute value by name, ignoring ASCII case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|idx| self.entries[idx].1.as_str())
    }

    /// Insert or replace an attribute, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(idx) => Some(std::mem::replace(&mut self.entries[idx].1, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Attributes in the order they were first inserted.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    fn append_to(&mut self, name: &str, continuation: &str) {
        if let Some(idx) = self.position(name) {
            self.entries[idx].1.push_str(continuation);
        }
    }
}

/// A parsed manifest: the main section plus any named sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    main: Attributes,
    sections: BTreeMap<String, Attributes>,
}

impl Manifest {
    /// Create an empty manifest
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a manifest from raw bytes (must be UTF-8).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ManifestParseError> {
        let text = std::str::from_utf8(bytes).map_err(|_| ManifestParseError::InvalidUtf8)?;
        Self::parse(text)
    }

    /// Parse manifest text.
    pub fn parse(text: &str) -> Result<Self, ManifestParseError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut manifest = Manifest::new();

        let mut in_main = true;
        let mut current = Attributes::new();
        let mut last_key: Option<String> = None;

        for (idx, raw_line) in text.split('\n').enumerate() {
            let line_no = idx + 1;
            let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);

            if line.is_empty() {
                if !current.is_empty() {
                    manifest.close_section(std::mem::take(&mut current), in_main, line_no)?;
                    in_main = false;
                }
                last_key = None;
                continue;
            }

            if let Some(continuation) = line.strip_prefix(' ') {
                let Some(key) = last_key.as_deref() else {
                    return Err(ManifestParseError::InvalidLine {
                        line: line_no,
                        message: "continuation line without a preceding attribute".to_string(),
                    });
                };
                current.append_to(key, continuation);
                continue;
            }

            let (key, value) = split_attribute(line).ok_or_else(|| ManifestParseError::InvalidLine {
                line: line_no,
                message: format!("expected 'Name: value', found '{}'", line),
            })?;

            if !in_main && current.is_empty() && !key.eq_ignore_ascii_case(attributes::SECTION_NAME) {
                return Err(ManifestParseError::InvalidLine {
                    line: line_no,
                    message: format!("section must start with a '{}' attribute", attributes::SECTION_NAME),
                });
            }

            current.insert(key, value);
            last_key = Some(key.to_string());
        }

        if !current.is_empty() {
            manifest.close_section(current, in_main, text.lines().count())?;
        }

        Ok(manifest)
    }

    fn close_section(&mut self, section: Attributes, is_main: bool, line: usize) -> Result<(), ManifestParseError> {
        if is_main {
            self.main = section;
            return Ok(());
        }
        let name = section
            .get(attributes::SECTION_NAME)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ManifestParseError::InvalidLine {
                line,
                message: "section has an empty name".to_string(),
            })?
            .to_string();
        self.sections.insert(name, section);
        Ok(())
    }

    /// Attributes of the main section
    pub fn main_attributes(&self) -> &Attributes {
        &self.main
    }

    /// Shorthand for a trimmed, non-empty main-section attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.main.get(name).map(str::trim).filter(|v| !v.is_empty())
    }

    /// A named section, if present.
    pub fn section(&self, name: &str) -> Option<&Attributes> {
        self.sections.get(name)
    }

    /// Named sections ordered by name.
    pub fn sections(&self) -> impl Iterator<Item = (&str, &Attributes)> {
        self.sections.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The loader name declared by [`attributes::PLUGIN_LOADER`].
    pub fn plugin_loader(&self) -> Option<&str> {
        self.attribute(attributes::PLUGIN_LOADER)
    }

    /// Set a main-section attribute
    pub fn set_attribute(&mut self, name: &str, value: &str) -> &mut Self {
        self.main.insert(name, value);
        self
    }

    /// Add or replace a named section; the `Name` attribute is filled in.
    pub fn add_section(&mut self, name: &str, mut section: Attributes) -> &mut Self {
        let mut named = Attributes::new();
        named.insert(attributes::SECTION_NAME, name);
        for (k, v) in section.entries.drain(..) {
            if !k.eq_ignore_ascii_case(attributes::SECTION_NAME) {
                named.insert(k, v);
            }
        }
        self.sections.insert(name.to_string(), named);
        self
    }
}

/// Writes the manifest back out in its textual form. Long values are not wrapped.
impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (k, v) in self.main.iter() {
            writeln!(f, "{}: {}", k, v)?;
        }
        for section in self.sections.values() {
            writeln!(f)?;
            for (k, v) in section.iter() {
                writeln!(f, "{}: {}", k, v)?;
            }
        }
        Ok(())
    }
}

fn split_attribute(line: &str) -> Option<(&str, &str)> {
    let (key, value) = match line.split_once(": ") {
        Some(pair) => pair,
        None => (line.strip_suffix(':')?, ""),
    };
    let valid_key = !key.is_empty()
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    valid_key.then_some((key, value))
}
