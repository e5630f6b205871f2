//! Format-specific writers sharing one document layout.
//!
//! The layout (which fields appear, in what order, with which blank-line
//! separators and where captured comments go) lives in [`write_layout`].
//! A format only decides how a single comment, field or build recipe is
//! spelled, by implementing [`MetadataWriter`].

pub mod txt;
pub mod yaml;

use std::io::Write;

use crate::{
    comments::CommentKey,
    format::Format,
    package::Package,
    recipe::{sorted_builds, Build},
    taxonomy::Field,
    value::Value,
    Error, Result,
};

pub use txt::TxtWriter;
pub use yaml::YamlWriter;

/// Recipes with this version name are placeholders and never written.
pub const IGNORED_VERSION: &str = "Ignore";

const DEFAULT_VERSION_CODE: &str = "0";

pub trait MetadataWriter {
    fn write_comment(&mut self, line: &str) -> Result<()>;
    fn write_field(&mut self, field: Field, value: &Value) -> Result<()>;
    fn write_build(&mut self, build: &Build) -> Result<()>;
    /// Blank line between blocks of the layout.
    fn write_separator(&mut self) -> Result<()>;
}

struct Layout<'a, W: ?Sized> {
    writer: &'a mut W,
    package: &'a Package,
}

impl<W: MetadataWriter + ?Sized> Layout<'_, W> {
    fn comments(&mut self, key: &CommentKey) -> Result<()> {
        for line in self.package.comments.get(key) {
            self.writer.write_comment(line)?;
        }
        Ok(())
    }

    fn has_comments(&self, field: Field) -> bool {
        !self.package.comments.get(&CommentKey::Field(field)).is_empty()
    }

    /// Optional fields are still written, possibly empty, when comments
    /// are attached to them, so the comments keep their place.
    fn keep(&self, field: Field, present: bool) -> bool {
        present || self.has_comments(field)
    }

    fn always(&mut self, field: Field) -> Result<()> {
        self.comments(&CommentKey::Field(field))?;
        self.writer
            .write_field(field, &self.package.get_field(field))
    }

    fn nonempty(&mut self, field: Field) -> Result<()> {
        self.comments(&CommentKey::Field(field))?;
        let value = self.package.get_field(field);
        if !value.is_empty() {
            self.writer.write_field(field, &value)?;
        }
        Ok(())
    }

    fn write(&mut self) -> Result<()> {
        let package = self.package;

        self.nonempty(Field::Disabled)?;
        if self.keep(Field::AntiFeatures, !package.anti_features.is_empty()) {
            self.always(Field::AntiFeatures)?;
        }
        self.nonempty(Field::Provides)?;
        self.always(Field::Categories)?;
        self.always(Field::License)?;
        self.always(Field::WebSite)?;
        self.always(Field::SourceCode)?;
        self.always(Field::IssueTracker)?;
        for field in [
            Field::Changelog,
            Field::Donate,
            Field::FlattrId,
            Field::Bitcoin,
            Field::Litecoin,
        ] {
            self.nonempty(field)?;
        }
        self.writer.write_separator()?;

        self.nonempty(Field::Name)?;
        self.nonempty(Field::AutoName)?;
        self.always(Field::Summary)?;
        self.always(Field::Description)?;
        self.writer.write_separator()?;

        if self.keep(Field::RequiresRoot, package.requires_root.is_set()) {
            self.always(Field::RequiresRoot)?;
            self.writer.write_separator()?;
        }

        let has_repo = !package.repo_type.is_empty()
            || self.has_comments(Field::Repo)
            || self.has_comments(Field::Binaries);
        if self.keep(Field::RepoType, has_repo) {
            self.always(Field::RepoType)?;
            self.always(Field::Repo)?;
            if self.keep(Field::Binaries, !package.binaries.is_empty()) {
                self.always(Field::Binaries)?;
            }
            self.writer.write_separator()?;
        }

        for build in sorted_builds(&package.builds) {
            if build.version == IGNORED_VERSION {
                continue;
            }
            self.comments(&CommentKey::Build(build.vercode.clone()))?;
            self.writer.write_build(build)?;
            self.writer.write_separator()?;
        }

        if self.keep(Field::MaintainerNotes, !package.maintainer_notes.is_empty()) {
            self.always(Field::MaintainerNotes)?;
            self.writer.write_separator()?;
        }

        self.nonempty(Field::ArchivePolicy)?;
        self.always(Field::AutoUpdateMode)?;
        self.always(Field::UpdateCheckMode)?;
        for field in [
            Field::UpdateCheckIgnore,
            Field::VercodeOperation,
            Field::UpdateCheckName,
            Field::UpdateCheckData,
        ] {
            self.nonempty(field)?;
        }
        let has_version = !package.current_version.is_empty();
        if self.keep(Field::CurrentVersion, has_version) {
            self.always(Field::CurrentVersion)?;
        }
        if self.keep(
            Field::CurrentVersionCode,
            has_version || package.current_version_code != DEFAULT_VERSION_CODE,
        ) {
            self.always(Field::CurrentVersionCode)?;
        }

        if self.keep(Field::NoSourceSince, !package.no_source_since.is_empty()) {
            self.writer.write_separator()?;
            self.always(Field::NoSourceSince)?;
        }
        self.comments(&CommentKey::End)
    }
}

/// Emit `package` through `writer` in the canonical field order.
pub fn write_layout<W: MetadataWriter + ?Sized>(writer: &mut W, package: &Package) -> Result<()> {
    Layout { writer, package }.write()
}

/// Serialise `package` in `format`. Only the native and YAML formats can
/// be written.
pub fn write_metadata<O: Write>(format: Format, out: &mut O, package: &Package) -> Result<()> {
    match format {
        Format::Txt => write_layout(&mut TxtWriter::new(out), package),
        Format::Yaml => write_layout(&mut YamlWriter::new(out), package),
        Format::Json | Format::Xml => Err(Error::UnsupportedFormat {
            path: package
                .metadata_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| format!("{}.{}", package.id(), format)),
            accepted: [Format::Txt, Format::Yaml]
                .iter()
                .map(Format::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}

/// Convenience wrapper returning the document as a string.
pub fn write_to_string(format: Format, package: &Package) -> Result<String> {
    let mut out = Vec::new();
    write_metadata(format, &mut out, package)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;

    const DOCUMENT: &str = "\
# Checked against upstream
Categories:Internet,System
License:GPLv3
Web Site:https://example.org
Source Code:https://example.org/src
Issue Tracker:https://example.org/issues
Donate:https://example.org/donate

Auto Name:Example
Summary:Does example things
Description:
An ''example'' app.

* fast
* small
.

Requires Root:yes

Repo Type:git
Repo:https://example.org/app.git

# first release
Build:1.0,1
    commit=v1.0
    subdir=app
    gradle=yes
    prebuild=sed -i 's/a/b/' build.gradle && \\
        echo done

Build:1.1,2
    disable=crashes on start
    commit=v1.1
    submodules=yes
    rm=libs/a.jar,libs/b.jar

Maintainer Notes:
Watch the upstream tags.
.

Archive Policy:2 versions
Auto Update Mode:Version v%v
Update Check Mode:Tags
Current Version:1.1
Current Version Code:2

No Source Since:1.2
# end of file
";

    fn parse(format: Format, content: &str) -> Package {
        let mut package = Package::new("org.example.app");
        parse_str(format, "doc", content, &mut package).unwrap();
        package
    }

    #[test]
    fn test_txt_round_trip() {
        let first = parse(Format::Txt, DOCUMENT);
        let written = write_to_string(Format::Txt, &first).unwrap();
        assert_eq!(written, DOCUMENT);
        assert_eq!(parse(Format::Txt, &written), first);
    }

    #[test]
    fn test_yaml_round_trip() {
        let first = parse(Format::Txt, DOCUMENT);
        let written = write_to_string(Format::Yaml, &first).unwrap();
        let second = parse(Format::Yaml, &written);
        assert_eq!(second.field_dict(), first.field_dict());
        assert_eq!(second.builds, first.builds);
    }

    #[test]
    fn test_indented_description_converts_to_yaml() {
        let first = parse(Format::Txt, "Description:\n\n  indented code\nplain text\n.\n");
        let written = write_to_string(Format::Yaml, &first).unwrap();
        let second = parse(Format::Yaml, &written);
        assert_eq!(second.description, vec!["indented code", "plain text"]);
    }

    #[test]
    fn test_version_code_without_version_survives() {
        let first = parse(Format::Txt, "License:MIT\nCurrent Version Code:5\n");
        let written = write_to_string(Format::Txt, &first).unwrap();
        assert!(written.contains("Current Version Code:5\n"));
        assert!(!written.contains("Current Version:"));
        assert_eq!(parse(Format::Txt, &written), first);

        let defaulted = write_to_string(Format::Txt, &parse(Format::Txt, "License:MIT\n")).unwrap();
        assert!(!defaulted.contains("Current Version Code"));
    }

    #[test]
    fn test_comments_on_omitted_fields_are_kept() {
        let document = "# checked, needs no root\nRequires Root:no\n# moved away\nRepo:\n\
                        # nothing yet\nMaintainer Notes:\n.\n";
        let first = parse(Format::Txt, document);
        assert!(!first.requires_root.is_set());

        let written = write_to_string(Format::Txt, &first).unwrap();
        assert!(written.contains("# checked, needs no root\nRequires Root:\n"));
        assert!(written.contains("# moved away\nRepo:\n"));
        assert!(written.contains("# nothing yet\nMaintainer Notes:\n.\n"));
        assert_eq!(parse(Format::Txt, &written), first);
    }

    #[test]
    fn test_ignored_builds_are_skipped() {
        let mut package = Package::new("org.example.app");
        package.builds.push(Build::new(IGNORED_VERSION, "5"));
        let mut build = Build::new("1.0", "1");
        build.commit = "v1.0".into();
        package.builds.push(build);

        let written = write_to_string(Format::Txt, &package).unwrap();
        assert!(written.contains("Build:1.0,1\n"));
        assert!(!written.contains("Ignore"));
    }

    #[test]
    fn test_unwritable_formats() {
        let package = Package::new("org.example.app");
        let err = write_to_string(Format::Json, &package).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(
            err.to_string(),
            "\"org.example.app.json\" is not in an accepted format, convert to: txt, yaml"
        );
    }
}
