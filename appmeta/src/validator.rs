//! Per-field value rules applied after a package is loaded.

use std::{
    collections::HashMap,
    sync::{Mutex, OnceLock},
};

use regex::Regex;
use tracing::debug;

use crate::{
    package::Package,
    taxonomy::{Field, Flag},
    value::Value,
    Error, Result,
};

pub enum Matcher {
    Pattern(&'static str),
    OneOf(&'static [&'static str]),
}

pub struct FieldValidator {
    pub name: &'static str,
    matcher: Matcher,
    sep: Option<char>,
    pub fields: &'static [Field],
    pub flags: &'static [Flag],
}

const HTTP_LINK: &str = r"^http[s]?://";

pub const FIELD_VALIDATORS: [FieldValidator; 12] = [
    FieldValidator::new(
        "Integer",
        Matcher::Pattern(r"^[1-9][0-9]*$"),
        None,
        &[],
        &[Flag::Vercode],
    ),
    FieldValidator::new(
        "Hexadecimal",
        Matcher::Pattern(r"^[0-9a-f]+$"),
        None,
        &[Field::FlattrId],
        &[],
    ),
    FieldValidator::new(
        "HTTP link",
        Matcher::Pattern(HTTP_LINK),
        None,
        &[
            Field::WebSite,
            Field::SourceCode,
            Field::IssueTracker,
            Field::Changelog,
            Field::Donate,
        ],
        &[],
    ),
    FieldValidator::new(
        "Bitcoin address",
        Matcher::Pattern(r"^[a-zA-Z0-9]{27,34}$"),
        None,
        &[Field::Bitcoin],
        &[],
    ),
    FieldValidator::new(
        "Litecoin address",
        Matcher::Pattern(r"^L[a-zA-Z0-9]{33}$"),
        None,
        &[Field::Litecoin],
        &[],
    ),
    FieldValidator::new(
        "bool",
        Matcher::Pattern(r"^([Yy]es|[Nn]o|[Tt]rue|[Ff]alse)"),
        None,
        &[Field::RequiresRoot],
        &[
            Flag::Submodules,
            Flag::Oldsdkloc,
            Flag::Forceversion,
            Flag::Forcevercode,
            Flag::Novcheck,
        ],
    ),
    FieldValidator::new(
        "Repo Type",
        Matcher::OneOf(&["git", "git-svn", "svn", "hg", "bzr", "srclib"]),
        None,
        &[Field::RepoType],
        &[],
    ),
    FieldValidator::new(
        "Binaries",
        Matcher::Pattern(HTTP_LINK),
        None,
        &[Field::Binaries],
        &[],
    ),
    FieldValidator::new(
        "Archive Policy",
        Matcher::Pattern(r"^[0-9]+ versions$"),
        None,
        &[Field::ArchivePolicy],
        &[],
    ),
    FieldValidator::new(
        "Anti-Feature",
        Matcher::OneOf(&[
            "Ads",
            "Tracking",
            "NonFreeNet",
            "NonFreeDep",
            "NonFreeAdd",
            "UpstreamNonFree",
        ]),
        Some(','),
        &[Field::AntiFeatures],
        &[],
    ),
    FieldValidator::new(
        "Auto Update Mode",
        Matcher::Pattern(r"^(Version .+|None)$"),
        None,
        &[Field::AutoUpdateMode],
        &[],
    ),
    FieldValidator::new(
        "Update Check Mode",
        Matcher::Pattern(r"^(Tags|Tags .+|RepoManifest|RepoManifest/.+|RepoTrunk|HTTP|Static|None)$"),
        None,
        &[Field::UpdateCheckMode],
        &[],
    ),
];

/// Compiled rule patterns, shared by every validator in the process.
fn compiled(pattern: &'static str) -> Result<Regex> {
    static CACHE: OnceLock<Mutex<HashMap<&'static str, Regex>>> = OnceLock::new();
    let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut cache = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(re) = cache.get(pattern) {
        return Ok(re.clone());
    }
    let re = Regex::new(pattern)?;
    cache.insert(pattern, re.clone());
    Ok(re)
}

/// The textual values a rule applies to. Unset and empty values are never
/// checked.
fn textual_values(value: &Value) -> Vec<&str> {
    match value {
        Value::Text(s) if !s.is_empty() => vec![s.as_str()],
        Value::Text(_) => Vec::new(),
        Value::List(items) => items
            .iter()
            .map(String::as_str)
            .filter(|s| !s.is_empty())
            .collect(),
        Value::Toggle(t) => t.as_text().into_iter().collect(),
    }
}

impl FieldValidator {
    const fn new(
        name: &'static str,
        matcher: Matcher,
        sep: Option<char>,
        fields: &'static [Field],
        flags: &'static [Flag],
    ) -> Self {
        Self {
            name,
            matcher,
            sep,
            fields,
            flags,
        }
    }

    fn fail(&self, value: &str, app_id: &str, detail: String) -> Error {
        Error::Validation {
            rule: self.name.to_string(),
            value: value.to_string(),
            app_id: app_id.to_string(),
            detail,
        }
    }

    fn check_one(&self, value: &str, app_id: &str) -> Result<()> {
        match self.matcher {
            Matcher::Pattern(pattern) => {
                if !compiled(pattern)?.is_match(value) {
                    return Err(self.fail(value, app_id, format!("Regex pattern: {}", pattern)));
                }
            }
            Matcher::OneOf(allowed) => {
                if !allowed.contains(&value) {
                    return Err(self.fail(
                        value,
                        app_id,
                        format!("Possible values: {}", allowed.join(", ")),
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn check(&self, value: &Value, app_id: &str) -> Result<()> {
        for text in textual_values(value) {
            match self.sep {
                Some(sep) => {
                    for part in text.split(sep) {
                        self.check_one(part, app_id)?;
                    }
                }
                None => self.check_one(text, app_id)?,
            }
        }
        Ok(())
    }
}

/// Run every rule over the package and its build recipes. The first
/// violation is returned.
pub fn check_metadata(package: &Package) -> Result<()> {
    for validator in &FIELD_VALIDATORS {
        for field in validator.fields {
            validator.check(&package.get_field(*field), package.id())?;
        }
        for build in &package.builds {
            for flag in validator.flags {
                validator.check(&build.get_flag(*flag), package.id())?;
            }
        }
    }
    debug!("Validated {}", package.id());
    Ok(())
}
