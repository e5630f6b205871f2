//! Format-specific readers.
//!
//! Every reader fills a blank [`Package`] through the same per-field and
//! per-flag setters, then [`normalize::post_parse`] runs once. A package
//! therefore looks the same whichever format it was loaded from.

pub mod json;
pub mod txt;
pub mod xml;
pub mod yaml;

use std::{fs, path::Path};

use tracing::debug;

use crate::{
    format::{select_format, Format},
    normalize,
    package::Package,
    recipe::Build,
    value::Value,
    Error, Result,
};

/// Parse one metadata document, choosing the reader by file extension.
pub fn parse_metadata(path: &Path, accepted: &[Format]) -> Result<Package> {
    let format = select_format(path, accepted)?;
    let content = fs::read_to_string(path)?;
    let mut package = Package::from_path(path);
    parse_str(format, &path.display().to_string(), &content, &mut package)?;
    debug!(
        "Parsed {} ({}) with {} build(s)",
        package.id(),
        format,
        package.builds.len()
    );
    Ok(package)
}

/// Fill `package` from `content` and normalise it. `source` names the
/// document in error messages.
pub fn parse_str(format: Format, source: &str, content: &str, package: &mut Package) -> Result<()> {
    match format {
        Format::Txt => txt::parse(source, content, package)?,
        Format::Json => json::parse(source, content, package)?,
        Format::Xml => xml::parse(source, content, package)?,
        Format::Yaml => yaml::parse(source, content, package)?,
    }
    check_recipes(source, package)?;
    normalize::post_parse(package)
}

/// Every recipe needs a version code, and a commit unless it is disabled.
/// The native grammar enforces this line by line; structured documents
/// are checked here.
fn check_recipes(source: &str, package: &Package) -> Result<()> {
    for build in &package.builds {
        if build.vercode.is_empty() {
            return Err(invalid_document(
                source,
                format!("No version code specified for {}", build.version),
            ));
        }
        if build.commit.is_empty() && build.disable.is_empty() {
            return Err(invalid_document(
                source,
                format!("No commit specified for {}", build.version),
            ));
        }
    }
    Ok(())
}

/// Key under which the structured formats nest build recipes.
pub(crate) const BUILDS_KEY: &str = "builds";

/// Key some structured documents carry for comments. It has no slot on the
/// package and is skipped.
pub(crate) const COMMENTS_KEY: &str = "comments";

/// One build recipe from a structured document, given as flag/value pairs.
pub(crate) fn build_from_pairs<I>(pairs: I) -> Result<Build>
where
    I: IntoIterator<Item = (String, Value)>,
{
    let mut build = Build::default();
    for (name, value) in pairs {
        build.set(&name, value)?;
    }
    Ok(build)
}

/// Top-level keys of a structured document with no package slot.
pub(crate) fn skip_key(package: &Package, name: &str) -> bool {
    if name == COMMENTS_KEY {
        debug!("Ignoring comments block in {}", package.id());
        return true;
    }
    false
}

/// Apply one top-level key of a structured document.
pub(crate) fn apply_field(package: &mut Package, name: &str, value: Value) -> Result<()> {
    if skip_key(package, name) {
        return Ok(());
    }
    package.set(name, value)
}

pub(crate) fn invalid_document(source: &str, message: impl Into<String>) -> Error {
    Error::InvalidDocument {
        path: source.to_string(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_parse_metadata_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("org.example.app.txt");
        fs::write(
            &path,
            "License:MIT\nBuild:1.1,11\n    commit=v1.1\nBuild:1.0,10\n    commit=v1.0\n\
             Update Check Mode:Tags\n",
        )
        .unwrap();

        let package = parse_metadata(&path, &Format::ALL).unwrap();
        assert_eq!(package.id(), "org.example.app");
        assert_eq!(package.description, vec![normalize::NO_DESCRIPTION]);
        let codes: Vec<_> = package.builds.iter().map(|b| b.vercode.as_str()).collect();
        assert_eq!(codes, vec!["10", "11"]);
    }

    #[test]
    fn test_unaccepted_format_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("org.example.app.json");
        fs::write(&path, "{}").unwrap();
        let err = parse_metadata(&path, &[Format::Txt]).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_formats_agree() {
        let txt = "Categories:Internet\nLicense:GPLv3\nSummary:An app\nDescription:\nDoes things.\n.\n\
                   Requires Root:yes\nRepo Type:git\nRepo:https://example.org/app.git\n\
                   Build:1.0,1\n    commit=v1.0\n    gradle=yes\n    submodules=yes\n\
                   Auto Update Mode:None\nUpdate Check Mode:Tags\n";
        let json = r#"{
            "Categories": ["Internet"],
            "License": "GPLv3",
            "Summary": "An app",
            "Description": "Does things.\n",
            "Requires Root": true,
            "Repo Type": "git",
            "Repo": "https://example.org/app.git",
            "builds": [{"versionName": "1.0", "versionCode": 1, "commit": "v1.0",
                        "gradle": ["yes"], "submodules": true}],
            "Auto Update Mode": "None",
            "Update Check Mode": "Tags"
        }"#;
        let yaml = "Categories:\n  - Internet\nLicense: GPLv3\nSummary: An app\n\
                    Description: |\n  Does things.\nRequires Root: yes\nRepo Type: git\n\
                    Repo: https://example.org/app.git\nbuilds:\n  - versionName: '1.0'\n\
                    \x20   versionCode: 1\n    commit: v1.0\n    gradle:\n      - yes\n\
                    \x20   submodules: true\nAuto Update Mode: None\nUpdate Check Mode: Tags\n";
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
            <resources>
              <string-array name="Categories"><item>Internet</item></string-array>
              <string name="License">GPLv3</string>
              <string name="Summary">An app</string>
              <string name="Description">Does things.</string>
              <string name="Requires Root">true</string>
              <string name="Repo Type">git</string>
              <string name="Repo">https://example.org/app.git</string>
              <builds>
                <build>
                  <version>1.0</version>
                  <vercode>1</vercode>
                  <commit>v1.0</commit>
                  <gradle>yes</gradle>
                  <submodules>yes</submodules>
                </build>
              </builds>
              <string name="Auto Update Mode">None</string>
              <string name="Update Check Mode">Tags</string>
            </resources>"#;

        let mut expected = Package::new("org.example.app");
        parse_str(Format::Txt, "txt", txt, &mut expected).unwrap();
        assert!(expected.requires_root.is_set());

        for (format, content) in [(Format::Json, json), (Format::Yaml, yaml), (Format::Xml, xml)] {
            let mut package = Package::new("org.example.app");
            parse_str(format, "doc", content, &mut package).unwrap();
            assert_eq!(package.field_dict(), expected.field_dict(), "{format}");
            assert_eq!(package.builds, expected.builds, "{format}");
        }
    }

    #[test]
    fn test_structured_recipes_need_commit_and_vercode() {
        let cases = [
            (
                Format::Json,
                r#"{"builds": [{"versionName": "1.0", "gradle": ["yes"]}]}"#,
                "No version code specified for 1.0",
            ),
            (
                Format::Json,
                r#"{"builds": [{"versionName": "1.0", "versionCode": 1, "gradle": ["yes"]}]}"#,
                "No commit specified for 1.0",
            ),
            (
                Format::Yaml,
                "builds:\n  - versionName: '1.0'\n    versionCode: 1\n",
                "No commit specified for 1.0",
            ),
            (
                Format::Xml,
                "<resources><builds><build><version>1.0</version><commit>v1</commit>\
                 </build></builds></resources>",
                "No version code specified for 1.0",
            ),
        ];
        for (format, content, expected) in cases {
            let mut package = Package::new("org.example.app");
            let err = parse_str(format, "doc", content, &mut package).unwrap_err();
            assert!(
                matches!(&err, Error::InvalidDocument { path, message } if path == "doc" && message == expected),
                "{format}: {err}"
            );
        }

        let disabled = r#"{"builds": [{"versionName": "1.0", "versionCode": 1, "disable": "broken"}]}"#;
        let mut package = Package::new("org.example.app");
        parse_str(Format::Json, "doc", disabled, &mut package).unwrap();
        assert!(package.builds[0].is_disabled());
    }

    #[test]
    fn test_boolean_gradle_selects_gradle() {
        let json = r#"{"builds": [{"versionCode": "1", "commit": "a", "gradle": true}]}"#;
        let yaml = "builds:\n  - versionCode: 1\n    commit: a\n    gradle: true\n";
        for (format, content) in [(Format::Json, json), (Format::Yaml, yaml)] {
            let mut package = Package::new("org.example.app");
            parse_str(format, "doc", content, &mut package).unwrap();
            assert_eq!(package.builds[0].gradle, vec!["yes"], "{format}");
            assert_eq!(package.builds[0].method(), crate::recipe::Method::Gradle);
        }
    }

    #[test]
    fn test_structured_duplicate_vercodes_rejected() {
        let json = r#"{"builds": [{"versionCode": "3", "commit": "a"},
                                  {"versionCode": "3", "commit": "b"}]}"#;
        let mut package = Package::new("org.example.app");
        assert!(matches!(
            parse_str(Format::Json, "doc", json, &mut package),
            Err(Error::DuplicateBuild { vercode, .. }) if vercode == "3"
        ));
    }
}
