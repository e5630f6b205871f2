use std::fmt;

use thiserror::Error;

/// Where in a source document a grammar error was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub line: Option<usize>,
}

impl Location {
    pub fn new(path: impl Into<String>, line: usize) -> Self {
        Self {
            path: path.into(),
            line: Some(line),
        }
    }

    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            line: None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}", self.path, line),
            None => f.write_str(&self.path),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unrecognised app field: {0}")]
    UnrecognisedField(String),

    #[error("Unrecognised build flag: {0}")]
    UnrecognisedFlag(String),

    #[error("{message} in {location}")]
    Grammar { location: Location, message: String },

    #[error("'{value}' is not a valid {rule} in {app_id}. {detail}")]
    Validation {
        rule: String,
        value: String,
        app_id: String,
        detail: String,
    },

    #[error("Problem with description of {app_id} - {source}")]
    CrossReference {
        app_id: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Cannot resolve app id {0}")]
    UnresolvedLink(String),

    #[error("{0}")]
    Markup(String),

    #[error("Found multiple metadata files for {0}")]
    DuplicatePackage(String),

    #[error("Duplicate build recipe found for vercode {vercode} in {app_id}")]
    DuplicateBuild { app_id: String, vercode: String },

    #[error("Invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },

    #[error("Invalid document {path}: {message}")]
    InvalidDocument { path: String, message: String },

    #[error("\"{path}\" is not in an accepted format, convert to: {accepted}")]
    UnsupportedFormat { path: String, accepted: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("XML parsing failed: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),
}

impl Error {
    pub(crate) fn grammar(location: Location, message: impl Into<String>) -> Self {
        Error::Grammar {
            location,
            message: message.into(),
        }
    }

    pub(crate) fn invalid_value(name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidValue {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Unsupported formats abort the whole run instead of a single document.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::UnsupportedFormat { .. })
    }

    /// Source line of a grammar error, if there is one.
    pub fn location(&self) -> Option<&Location> {
        match self {
            Error::Grammar { location, .. } => Some(location),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grammar_error_location() {
        let err = Error::grammar(Location::new("metadata/org.example.txt", 4), "Extra spacing found");
        assert_eq!(
            err.to_string(),
            "Extra spacing found in metadata/org.example.txt:4"
        );
        assert_eq!(err.location().and_then(|l| l.line), Some(4));

        let err = Error::grammar(Location::file("a.txt"), "Unterminated build");
        assert_eq!(err.to_string(), "Unterminated build in a.txt");
    }

    #[test]
    fn test_only_unsupported_format_is_fatal() {
        let err = Error::UnsupportedFormat {
            path: "a.toml".into(),
            accepted: "txt".into(),
        };
        assert!(err.is_fatal());
        assert!(!Error::UnrecognisedField("Foo".into()).is_fatal());
    }

    #[test]
    fn test_cross_reference_chains_source() {
        let err = Error::CrossReference {
            app_id: "org.example".into(),
            source: Box::new(Error::UnresolvedLink("org.missing".into())),
        };
        assert_eq!(
            err.to_string(),
            "Problem with description of org.example - Cannot resolve app id org.missing"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
