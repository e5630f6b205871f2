//! Static registry of package fields and build flags.
//!
//! Every name that may appear in a metadata document is listed here together
//! with its semantic type. Parsers, writers and validators all go through
//! these tables, so an unknown name is rejected at the boundary.

use std::fmt;

use crate::{Error, Result};

/// Semantic type of a top-level metadata line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Scalar,
    List,
    Multiline,
    Boolean,
    Script,
    /// Legacy single-line `Build Version:` recipe.
    BuildV1,
    /// Block-style `Build:` recipe.
    BuildV2,
    Obsolete,
    Unknown,
}

/// Semantic type of a build flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagType {
    Scalar,
    List,
    Boolean,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Disabled,
    AntiFeatures,
    Provides,
    Categories,
    License,
    WebSite,
    SourceCode,
    IssueTracker,
    Changelog,
    Donate,
    FlattrId,
    Bitcoin,
    Litecoin,
    Name,
    AutoName,
    Summary,
    Description,
    RequiresRoot,
    RepoType,
    Repo,
    Binaries,
    MaintainerNotes,
    ArchivePolicy,
    AutoUpdateMode,
    UpdateCheckMode,
    UpdateCheckIgnore,
    VercodeOperation,
    UpdateCheckName,
    UpdateCheckData,
    CurrentVersion,
    CurrentVersionCode,
    NoSourceSince,
}

impl Field {
    pub const ALL: [Field; 32] = [
        Field::Disabled,
        Field::AntiFeatures,
        Field::Provides,
        Field::Categories,
        Field::License,
        Field::WebSite,
        Field::SourceCode,
        Field::IssueTracker,
        Field::Changelog,
        Field::Donate,
        Field::FlattrId,
        Field::Bitcoin,
        Field::Litecoin,
        Field::Name,
        Field::AutoName,
        Field::Summary,
        Field::Description,
        Field::RequiresRoot,
        Field::RepoType,
        Field::Repo,
        Field::Binaries,
        Field::MaintainerNotes,
        Field::ArchivePolicy,
        Field::AutoUpdateMode,
        Field::UpdateCheckMode,
        Field::UpdateCheckIgnore,
        Field::VercodeOperation,
        Field::UpdateCheckName,
        Field::UpdateCheckData,
        Field::CurrentVersion,
        Field::CurrentVersionCode,
        Field::NoSourceSince,
    ];

    /// Human-readable name, as written in metadata documents.
    pub const fn name(self) -> &'static str {
        match self {
            Field::Disabled => "Disabled",
            Field::AntiFeatures => "AntiFeatures",
            Field::Provides => "Provides",
            Field::Categories => "Categories",
            Field::License => "License",
            Field::WebSite => "Web Site",
            Field::SourceCode => "Source Code",
            Field::IssueTracker => "Issue Tracker",
            Field::Changelog => "Changelog",
            Field::Donate => "Donate",
            Field::FlattrId => "FlattrID",
            Field::Bitcoin => "Bitcoin",
            Field::Litecoin => "Litecoin",
            Field::Name => "Name",
            Field::AutoName => "Auto Name",
            Field::Summary => "Summary",
            Field::Description => "Description",
            Field::RequiresRoot => "Requires Root",
            Field::RepoType => "Repo Type",
            Field::Repo => "Repo",
            Field::Binaries => "Binaries",
            Field::MaintainerNotes => "Maintainer Notes",
            Field::ArchivePolicy => "Archive Policy",
            Field::AutoUpdateMode => "Auto Update Mode",
            Field::UpdateCheckMode => "Update Check Mode",
            Field::UpdateCheckIgnore => "Update Check Ignore",
            Field::VercodeOperation => "Vercode Operation",
            Field::UpdateCheckName => "Update Check Name",
            Field::UpdateCheckData => "Update Check Data",
            Field::CurrentVersion => "Current Version",
            Field::CurrentVersionCode => "Current Version Code",
            Field::NoSourceSince => "No Source Since",
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Like [`Field::from_name`], but an unknown name is an error.
    pub fn lookup(name: &str) -> Result<Field> {
        Field::from_name(name).ok_or_else(|| Error::UnrecognisedField(name.to_string()))
    }

    pub fn from_attr(attr: &str) -> Option<Field> {
        Field::from_name(&to_field(attr))
    }

    pub fn attr(self) -> String {
        to_attr(self.name())
    }

    pub const fn field_type(self) -> FieldType {
        match self {
            Field::Description | Field::MaintainerNotes => FieldType::Multiline,
            Field::Categories | Field::AntiFeatures => FieldType::List,
            Field::RequiresRoot => FieldType::Boolean,
            _ => FieldType::Scalar,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Flag {
    Version,
    Vercode,
    Disable,
    Commit,
    Subdir,
    Submodules,
    Init,
    Patch,
    Gradle,
    Maven,
    Kivy,
    Output,
    Srclibs,
    Oldsdkloc,
    Encoding,
    Forceversion,
    Forcevercode,
    Rm,
    Extlibs,
    Prebuild,
    Update,
    Target,
    Scanignore,
    Scandelete,
    Build,
    Buildjni,
    Ndk,
    Preassemble,
    Gradleprops,
    Antcommands,
    Novcheck,
}

/// Flags in the order in which they are laid out on files. `version` and
/// `vercode` are written in the recipe header instead.
pub const FLAG_ORDER: [Flag; 29] = [
    Flag::Disable,
    Flag::Commit,
    Flag::Subdir,
    Flag::Submodules,
    Flag::Init,
    Flag::Patch,
    Flag::Gradle,
    Flag::Maven,
    Flag::Kivy,
    Flag::Output,
    Flag::Srclibs,
    Flag::Oldsdkloc,
    Flag::Encoding,
    Flag::Forceversion,
    Flag::Forcevercode,
    Flag::Rm,
    Flag::Extlibs,
    Flag::Prebuild,
    Flag::Update,
    Flag::Target,
    Flag::Scanignore,
    Flag::Scandelete,
    Flag::Build,
    Flag::Buildjni,
    Flag::Ndk,
    Flag::Preassemble,
    Flag::Gradleprops,
    Flag::Antcommands,
    Flag::Novcheck,
];

impl Flag {
    pub const fn name(self) -> &'static str {
        match self {
            Flag::Version => "version",
            Flag::Vercode => "vercode",
            Flag::Disable => "disable",
            Flag::Commit => "commit",
            Flag::Subdir => "subdir",
            Flag::Submodules => "submodules",
            Flag::Init => "init",
            Flag::Patch => "patch",
            Flag::Gradle => "gradle",
            Flag::Maven => "maven",
            Flag::Kivy => "kivy",
            Flag::Output => "output",
            Flag::Srclibs => "srclibs",
            Flag::Oldsdkloc => "oldsdkloc",
            Flag::Encoding => "encoding",
            Flag::Forceversion => "forceversion",
            Flag::Forcevercode => "forcevercode",
            Flag::Rm => "rm",
            Flag::Extlibs => "extlibs",
            Flag::Prebuild => "prebuild",
            Flag::Update => "update",
            Flag::Target => "target",
            Flag::Scanignore => "scanignore",
            Flag::Scandelete => "scandelete",
            Flag::Build => "build",
            Flag::Buildjni => "buildjni",
            Flag::Ndk => "ndk",
            Flag::Preassemble => "preassemble",
            Flag::Gradleprops => "gradleprops",
            Flag::Antcommands => "antcommands",
            Flag::Novcheck => "novcheck",
        }
    }

    pub fn from_name(name: &str) -> Option<Flag> {
        match name {
            "version" => Some(Flag::Version),
            "vercode" => Some(Flag::Vercode),
            _ => FLAG_ORDER.into_iter().find(|f| f.name() == name),
        }
    }

    pub fn lookup(name: &str) -> Result<Flag> {
        Flag::from_name(name).ok_or_else(|| Error::UnrecognisedFlag(name.to_string()))
    }

    /// Lookup used by the structured formats, which spell the recipe header
    /// as `versionName` and `versionCode`.
    pub fn lookup_with_aliases(name: &str) -> Result<Flag> {
        match name {
            "versionName" => Ok(Flag::Version),
            "versionCode" => Ok(Flag::Vercode),
            other => Flag::lookup(other),
        }
    }

    pub const fn flag_type(self) -> FlagType {
        match self {
            Flag::Extlibs
            | Flag::Srclibs
            | Flag::Patch
            | Flag::Rm
            | Flag::Buildjni
            | Flag::Preassemble
            | Flag::Update
            | Flag::Scanignore
            | Flag::Scandelete
            | Flag::Gradle
            | Flag::Antcommands
            | Flag::Gradleprops => FlagType::List,
            Flag::Init | Flag::Prebuild | Flag::Build => FlagType::Script,
            Flag::Submodules
            | Flag::Oldsdkloc
            | Flag::Forceversion
            | Flag::Forcevercode
            | Flag::Novcheck => FlagType::Boolean,
            _ => FlagType::Scalar,
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Type of any top-level name, including the recipe markers and obsolete
/// names that have no [`Field`] of their own.
pub fn field_type(name: &str) -> FieldType {
    match name {
        "Build Version" => FieldType::BuildV1,
        "Build" => FieldType::BuildV2,
        "Use Built" => FieldType::Obsolete,
        _ => Field::from_name(name)
            .map(Field::field_type)
            .unwrap_or(FieldType::Unknown),
    }
}

pub fn flag_type(name: &str) -> Result<FlagType> {
    Flag::lookup(name).map(Flag::flag_type)
}

/// Names kept as a single word even though they are camel-cased.
const COMPOUND_FIELDS: [&str; 2] = ["AntiFeatures", "FlattrID"];

/// `Auto Name` -> `AutoName`
pub fn to_attr(field: &str) -> String {
    field.replace(' ', "")
}

/// `AutoName` -> `Auto Name`
pub fn to_field(attr: &str) -> String {
    if COMPOUND_FIELDS.contains(&attr) {
        return attr.to_string();
    }
    let mut out = String::with_capacity(attr.len() + 4);
    let mut prev_lower = false;
    for c in attr.chars() {
        if prev_lower && c.is_ascii_uppercase() {
            out.push(' ');
        }
        prev_lower = c.is_ascii_lowercase();
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_translation_round_trips() {
        for field in Field::ALL {
            let attr = field.attr();
            assert!(!attr.contains(' '));
            assert_eq!(to_field(&attr), field.name());
            assert_eq!(to_attr(&to_field(&attr)), attr);
            assert_eq!(Field::from_attr(&attr), Some(field));
        }
    }

    #[test]
    fn test_compound_names_keep_their_spelling() {
        assert_eq!(to_field("AntiFeatures"), "AntiFeatures");
        assert_eq!(to_field("FlattrID"), "FlattrID");
        assert_eq!(to_field("CurrentVersionCode"), "Current Version Code");
        assert_eq!(to_attr("Web Site"), "WebSite");
    }

    #[test]
    fn test_field_types() {
        assert_eq!(field_type("Description"), FieldType::Multiline);
        assert_eq!(field_type("Maintainer Notes"), FieldType::Multiline);
        assert_eq!(field_type("Categories"), FieldType::List);
        assert_eq!(field_type("AntiFeatures"), FieldType::List);
        assert_eq!(field_type("Requires Root"), FieldType::Boolean);
        assert_eq!(field_type("Summary"), FieldType::Scalar);
        assert_eq!(field_type("Build Version"), FieldType::BuildV1);
        assert_eq!(field_type("Build"), FieldType::BuildV2);
        assert_eq!(field_type("Use Built"), FieldType::Obsolete);
        assert_eq!(field_type("Market Version"), FieldType::Unknown);
    }

    #[test]
    fn test_flag_types() {
        assert_eq!(flag_type("gradle").unwrap(), FlagType::List);
        assert_eq!(flag_type("prebuild").unwrap(), FlagType::Script);
        assert_eq!(flag_type("novcheck").unwrap(), FlagType::Boolean);
        assert_eq!(flag_type("maven").unwrap(), FlagType::Scalar);
        assert_eq!(flag_type("vercode").unwrap(), FlagType::Scalar);
        assert!(matches!(
            flag_type("nosuchflag"),
            Err(Error::UnrecognisedFlag(_))
        ));
    }

    #[test]
    fn test_flag_lookup_aliases() {
        assert_eq!(Flag::lookup_with_aliases("versionName").unwrap(), Flag::Version);
        assert_eq!(Flag::lookup_with_aliases("versionCode").unwrap(), Flag::Vercode);
        assert!(Flag::lookup("versionName").is_err());
        assert_eq!(FLAG_ORDER.len() + 2, 31);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(matches!(
            Field::lookup("Web site"),
            Err(Error::UnrecognisedField(name)) if name == "Web site"
        ));
    }
}
