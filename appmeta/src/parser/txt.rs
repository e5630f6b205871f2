//! The native line-oriented format.
//!
//! ```text
//! # comment, attached to the next field
//! Categories:Internet,System
//! Description:
//! Free-form text, one element per line.
//! .
//! Build:1.0,1
//!     commit=v1.0
//!     prebuild=sed -i 's/a/b/' build.gradle && \
//!         echo done
//! ```

use std::{collections::HashSet, mem};

use tracing::warn;

use crate::{
    comments::CommentKey,
    error::Location,
    package::Package,
    recipe::Build,
    taxonomy::{field_type, Field, FieldType, Flag, FlagType},
    value::{split_list_values, Toggle, Value},
    Error, Result,
};

enum Mode {
    TopLevel,
    /// Inside a `.`-terminated multi-line field.
    Multiline(Field),
    /// A `Build Version:` line continued with trailing backslashes.
    BuildLine(Vec<String>),
    /// Indented flag lines of a `Build:` block.
    BuildBlock { build: Build, pending: Vec<String> },
}

struct TxtParser<'a> {
    source: String,
    package: &'a mut Package,
    mode: Mode,
    comments: Vec<String>,
    seen_vercodes: HashSet<String>,
    line_number: usize,
}

/// Split on commas that are not escaped with a backslash, then unescape.
fn split_unescaped_commas(line: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut prev = None;
    for c in line.chars() {
        if c == ',' && prev != Some('\\') {
            parts.push(mem::take(&mut current));
        } else {
            current.push(c);
        }
        prev = Some(c);
    }
    parts.push(current);
    parts.into_iter().map(|p| p.replace("\\,", ",")).collect()
}

impl<'a> TxtParser<'a> {
    fn new(source: String, package: &'a mut Package) -> Self {
        Self {
            source,
            package,
            mode: Mode::TopLevel,
            comments: Vec::new(),
            seen_vercodes: HashSet::new(),
            line_number: 0,
        }
    }

    fn here(&self) -> Location {
        Location::new(self.source.clone(), self.line_number)
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::grammar(self.here(), message)
    }

    fn attach_comments(&mut self, key: CommentKey) {
        let lines = mem::take(&mut self.comments);
        self.package.comments.attach(key, lines);
    }

    fn add_build_flag(&self, text: &str, build: &mut Build) -> Result<()> {
        if text.trim().is_empty() {
            return Err(self.error("Empty build flag"));
        }
        let Some((key, value)) = text.split_once('=') else {
            return Err(self.error(format!("Invalid build flag {}", text)));
        };
        let key = key.trim_start();
        let flag = Flag::from_name(key)
            .ok_or_else(|| self.error(format!("Unrecognised build flag {}", key)))?;

        match flag.flag_type() {
            FlagType::List => {
                let mut items = split_list_values(value);
                if flag == Flag::Gradle && matches!(items.as_slice(), [only] if only == "main" || only == "yes") {
                    items = vec!["yes".to_string()];
                }
                build.set_flag(flag, Value::List(items))?;
            }
            FlagType::Scalar | FlagType::Script => build.set_flag(flag, Value::text(value))?,
            FlagType::Boolean => {
                if value == "yes" {
                    build.set_flag(flag, Value::Toggle(Toggle::Yes))?;
                }
            }
        }
        Ok(())
    }

    /// Legacy single-line recipe: `version,vercode,commit[,flag=value...]`.
    fn parse_build_line(&self, lines: &[String]) -> Result<Build> {
        let joined = lines.concat();
        let parts = split_unescaped_commas(&joined);
        if parts.len() < 3 {
            return Err(self.error(format!("Invalid build format: {}", joined)));
        }

        let mut build = Build::new(parts[0].as_str(), parts[1].as_str());
        if let Some(reason) = parts[2].strip_prefix('!') {
            build.disable = reason.to_string();
            build.commit = match parts[2].rfind("at ") {
                Some(index) => {
                    let commit = &parts[2][index + 3..];
                    commit.strip_suffix(')').unwrap_or(commit).to_string()
                }
                None => "unknown - see disabled".to_string(),
            };
        } else {
            build.commit = parts[2].clone();
        }

        for part in &parts[3..] {
            self.add_build_flag(part, &mut build)?;
        }
        Ok(build)
    }

    fn push_build(&mut self, build: Build) {
        self.attach_comments(CommentKey::Build(build.vercode.clone()));
        self.package.builds.push(build);
    }

    fn close_build_block(&mut self, build: Build) -> Result<()> {
        if build.commit.is_empty() && build.disable.is_empty() {
            return Err(self.error(format!("No commit specified for {}", build.version)));
        }
        self.push_build(build);
        Ok(())
    }

    fn top_level(&mut self, line: &str) -> Result<()> {
        if line.is_empty() {
            return Ok(());
        }
        if let Some(comment) = line.strip_prefix('#') {
            self.comments.push(comment.trim().to_string());
            return Ok(());
        }

        let Some((name, value)) = line.split_once(':') else {
            return Err(self.error("Invalid metadata"));
        };
        if name != name.trim() || value != value.trim() {
            return Err(self.error("Extra spacing found"));
        }

        let name = match name {
            "Market Version" => "Current Version",
            "Market Version Code" => "Current Version Code",
            other => other,
        };

        match field_type(name) {
            FieldType::BuildV1 => {
                if let Some(head) = value.strip_suffix('\\') {
                    self.mode = Mode::BuildLine(vec![head.to_string()]);
                } else {
                    let build = self.parse_build_line(&[value.to_string()])?;
                    self.push_build(build);
                }
            }
            FieldType::BuildV2 => {
                let parts: Vec<&str> = value.split(',').collect();
                let [version, vercode] = parts[..] else {
                    return Err(self.error(format!(
                        "Build should have comma-separated version and vercode, not \"{}\"",
                        value
                    )));
                };
                if !self.seen_vercodes.insert(vercode.to_string()) {
                    return Err(self.error(format!(
                        "Duplicate build recipe found for vercode {}",
                        vercode
                    )));
                }
                self.mode = Mode::BuildBlock {
                    build: Build::new(version, vercode),
                    pending: Vec::new(),
                };
            }
            FieldType::Obsolete => {
                warn!("Discarding obsolete field {} in {}", name, self.here());
            }
            FieldType::Unknown => {
                return Err(self.error(format!("Unrecognised field type for {}", name)));
            }
            field_kind => {
                let field = Field::lookup(name)?;
                self.attach_comments(CommentKey::Field(field));
                match field_kind {
                    FieldType::Multiline => {
                        if !value.is_empty() {
                            return Err(self.error(format!(
                                "Unexpected text on same line as {}",
                                name
                            )));
                        }
                        self.package.set_field(field, Value::List(Vec::new()))?;
                        self.mode = Mode::Multiline(field);
                    }
                    FieldType::List => {
                        self.package
                            .set_field(field, Value::List(split_list_values(value)))?;
                    }
                    _ => self.package.set_field(field, Value::text(value))?,
                }
            }
        }
        Ok(())
    }

    fn feed(&mut self, line: &str) -> Result<()> {
        match mem::replace(&mut self.mode, Mode::TopLevel) {
            Mode::TopLevel => self.top_level(line),
            Mode::Multiline(field) => {
                if line != "." {
                    self.package.append_field(field, line)?;
                    self.mode = Mode::Multiline(field);
                }
                Ok(())
            }
            Mode::BuildLine(mut lines) => {
                if let Some(head) = line.strip_suffix('\\') {
                    lines.push(head.to_string());
                    self.mode = Mode::BuildLine(lines);
                } else {
                    lines.push(line.to_string());
                    let build = self.parse_build_line(&lines)?;
                    self.push_build(build);
                }
                Ok(())
            }
            Mode::BuildBlock {
                mut build,
                mut pending,
            } => {
                if !line.starts_with([' ', '\t']) {
                    if !pending.is_empty() {
                        return Err(self.error("Unterminated continuation"));
                    }
                    self.close_build_block(build)?;
                    return self.top_level(line);
                }
                match line.strip_suffix('\\') {
                    Some(head) => pending.push(head.trim_start().to_string()),
                    None => {
                        pending.push(line.trim_start().to_string());
                        let flag_line = mem::take(&mut pending).concat();
                        self.add_build_flag(&flag_line, &mut build)?;
                    }
                }
                self.mode = Mode::BuildBlock { build, pending };
                Ok(())
            }
        }
    }

    fn finish(mut self) -> Result<()> {
        self.attach_comments(CommentKey::End);
        let location = Location::file(self.source.clone());
        match self.mode {
            Mode::TopLevel => Ok(()),
            Mode::Multiline(field) => Err(Error::grammar(
                location,
                format!("{} not terminated", field),
            )),
            Mode::BuildLine(_) => Err(Error::grammar(location, "Unterminated continuation")),
            Mode::BuildBlock { .. } => Err(Error::grammar(location, "Unterminated build")),
        }
    }
}

/// Populate `package` from a native document. `source` names the document
/// in error locations.
pub fn parse(source: &str, content: &str, package: &mut Package) -> Result<()> {
    let mut parser = TxtParser::new(source.to_string(), package);
    for (index, line) in content.lines().enumerate() {
        parser.line_number = index + 1;
        parser.feed(line.trim_end_matches('\r'))?;
    }
    parser.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::Method;

    fn parse_doc(content: &str) -> Result<Package> {
        let mut package = Package::new("org.example.app");
        parse("org.example.app.txt", content, &mut package)?;
        Ok(package)
    }

    #[test]
    fn test_scalar_list_and_multiline_fields() {
        let package = parse_doc(
            "Categories:Internet;Office\nLicense:GPLv3\nWeb Site:https://example.org\n\
             Summary:Does things\nDescription:\nFirst line.\n\n* item\n.\n\
             Market Version:1.2\nMarket Version Code:12\n",
        )
        .unwrap();
        assert_eq!(package.categories, vec!["Internet", "Office"]);
        assert_eq!(package.license, "GPLv3");
        assert_eq!(package.description, vec!["First line.", "", "* item"]);
        assert_eq!(package.current_version, "1.2");
        assert_eq!(package.current_version_code, "12");
    }

    #[test]
    fn test_build_block() {
        let package = parse_doc(
            "Build:1.0,1\n    commit=abc123\n    gradle=yes\n\nAuto Update Mode:None\n",
        )
        .unwrap();
        assert_eq!(package.builds.len(), 1);
        let build = &package.builds[0];
        assert_eq!(build.version, "1.0");
        assert_eq!(build.vercode, "1");
        assert_eq!(build.commit, "abc123");
        assert_eq!(build.gradle, vec!["yes"]);
        assert_eq!(build.method(), Method::Gradle);
    }

    #[test]
    fn test_build_block_continuations_and_flags() {
        let package = parse_doc(
            "Build:2.0,20\n\tcommit=v2.0\n    gradle=main\n    submodules=yes\n    novcheck=true\n\
             \x20   prebuild=sed -i 's/a/b/' x && \\\n        make\n    rm=libs/a.jar;libs/b.jar\n\
             Update Check Mode:Tags\n",
        )
        .unwrap();
        let build = &package.builds[0];
        assert_eq!(build.gradle, vec!["yes"]);
        assert_eq!(build.submodules, Toggle::Yes);
        assert_eq!(build.novcheck, Toggle::Unset);
        assert_eq!(build.prebuild, "sed -i 's/a/b/' x && make");
        assert_eq!(build.rm, vec!["libs/a.jar", "libs/b.jar"]);
        assert_eq!(package.update_check_mode, "Tags");
    }

    #[test]
    fn test_duplicate_vercode_is_rejected() {
        let err = parse_doc(
            "Build:1.0,1\n    commit=a\nBuild:1.0.1,1\n    commit=b\nLicense:MIT\n",
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Duplicate build recipe found for vercode 1 in org.example.app.txt:3"
        );
    }

    #[test]
    fn test_build_without_commit() {
        let err = parse_doc("Build:1.0,1\n    gradle=yes\nLicense:MIT\n").unwrap_err();
        assert_eq!(err.to_string(), "No commit specified for 1.0 in org.example.app.txt:3");
    }

    #[test]
    fn test_legacy_build_version_line() {
        let package = parse_doc(
            "Build Version:1.1,11,!Broken build (fixed at 4f2a9c),subdir=app\\,core\n\
             Build Version:1.0,10,v1.0,\\\nsubmodules=yes\n",
        )
        .unwrap();
        let disabled = &package.builds[0];
        assert_eq!(disabled.disable, "Broken build (fixed at 4f2a9c)");
        assert_eq!(disabled.commit, "4f2a9c");
        assert_eq!(disabled.subdir, "app,core");

        let continued = &package.builds[1];
        assert_eq!(continued.commit, "v1.0");
        assert_eq!(continued.submodules, Toggle::Yes);

        let err = parse_doc("Build Version:1.0,10\n").unwrap_err();
        assert!(err.to_string().starts_with("Invalid build format: 1.0,10"));
    }

    #[test]
    fn test_comments_are_attached() {
        let package = parse_doc(
            "# licence checked\nLicense:MIT\n# first release\nBuild:1.0,1\n    commit=a\n\
             Auto Update Mode:None\n# trailing\n",
        )
        .unwrap();
        assert_eq!(
            package.comments.get(&CommentKey::Field(Field::License)),
            ["licence checked".to_string()]
        );
        assert_eq!(
            package.comments.get(&CommentKey::Build("1".into())),
            ["first release".to_string()]
        );
        assert_eq!(package.comments.get(&CommentKey::End), ["trailing".to_string()]);
    }

    #[test]
    fn test_grammar_errors() {
        let cases = [
            ("License: MIT\n", "Extra spacing found in org.example.app.txt:1"),
            ("Summary\n", "Invalid metadata in org.example.app.txt:1"),
            ("Homepage:x\n", "Unrecognised field type for Homepage in org.example.app.txt:1"),
            ("Description:inline\n.\n", "Unexpected text on same line as Description in org.example.app.txt:1"),
            ("Description:\nnever closed\n", "Description not terminated in org.example.app.txt"),
            ("Build Version:1,1,a,\\\n", "Unterminated continuation in org.example.app.txt"),
            ("Build:1.0,1\n    commit=a\n", "Unterminated build in org.example.app.txt"),
            ("Build:1.0\n", "Build should have comma-separated version and vercode, not \"1.0\" in org.example.app.txt:1"),
            ("Build:1.0,1\n    bogus=1\nLicense:MIT\n", "Unrecognised build flag bogus in org.example.app.txt:2"),
            ("Build:1.0,1\n    commit\nLicense:MIT\n", "Invalid build flag commit in org.example.app.txt:2"),
        ];
        for (doc, expected) in cases {
            assert_eq!(parse_doc(doc).unwrap_err().to_string(), expected, "{doc:?}");
        }
    }

    #[test]
    fn test_build_block_closed_mid_continuation() {
        let doc = "Build:1.0,1\n    commit=a\n    prebuild=make && \\\nLicense:MIT\n";
        let err = parse_doc(doc).unwrap_err();
        assert_eq!(err.to_string(), "Unterminated continuation in org.example.app.txt:4");
    }

    #[test]
    fn test_obsolete_fields_are_discarded() {
        let package = parse_doc("Use Built:yes\nLicense:MIT\n").unwrap();
        assert_eq!(package.license, "MIT");
    }

    #[test]
    fn test_split_unescaped_commas() {
        assert_eq!(
            split_unescaped_commas(r"a,b\,c,,d"),
            vec!["a", "b,c", "", "d"]
        );
    }
}
