//! On-disk metadata formats and extension-based selection.

use std::{fmt, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Txt,
    Json,
    Xml,
    Yaml,
}

impl Format {
    pub const ALL: [Format; 4] = [Format::Txt, Format::Json, Format::Xml, Format::Yaml];

    pub fn extension(self) -> &'static str {
        match self {
            Format::Txt => "txt",
            Format::Json => "json",
            Format::Xml => "xml",
            Format::Yaml => "yaml",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Format> {
        Format::ALL.into_iter().find(|f| f.extension() == ext)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Format::from_extension(s).ok_or_else(|| Error::UnsupportedFormat {
            path: s.to_string(),
            accepted: join_formats(&Format::ALL),
        })
    }
}

fn join_formats(formats: &[Format]) -> String {
    formats
        .iter()
        .map(|f| f.extension())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Split a file name at its last `.` into `(stem, extension)`.
///
/// The directory part is dropped. A name without a dot has an empty
/// extension.
pub fn get_extension(path: &Path) -> (String, String) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.rsplit_once('.') {
        Some((stem, ext)) => (stem.to_string(), ext.to_string()),
        None => (name, String::new()),
    }
}

/// Format of `path`, provided its extension is one of `accepted`.
pub fn select_format(path: &Path, accepted: &[Format]) -> Result<Format> {
    let (_, ext) = get_extension(path);
    Format::from_extension(&ext)
        .filter(|format| accepted.contains(format))
        .ok_or_else(|| Error::UnsupportedFormat {
            path: path.display().to_string(),
            accepted: join_formats(accepted),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_extension() {
        assert_eq!(
            get_extension(Path::new("metadata/org.example.app.yaml")),
            ("org.example.app".to_string(), "yaml".to_string())
        );
        assert_eq!(
            get_extension(Path::new("README")),
            ("README".to_string(), String::new())
        );
    }

    #[test]
    fn test_select_format_respects_accepted_list() {
        let accepted = [Format::Txt, Format::Yaml];
        assert_eq!(
            select_format(Path::new("a/org.example.txt"), &accepted).unwrap(),
            Format::Txt
        );

        let err = select_format(Path::new("a/org.example.json"), &accepted).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(
            err.to_string(),
            "\"a/org.example.json\" is not in an accepted format, convert to: txt, yaml"
        );
        assert!(select_format(Path::new("org.example.toml"), &Format::ALL).is_err());
    }

    #[test]
    fn test_parse_format_name() {
        assert_eq!("xml".parse::<Format>().unwrap(), Format::Xml);
        assert!("toml".parse::<Format>().is_err());
        assert_eq!(Format::Json.to_string(), "json");
    }
}
