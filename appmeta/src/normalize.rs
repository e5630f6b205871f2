//! Value coercion and the post-parse pass shared by every format.
//!
//! The setters on [`Package`] and [`Build`] route through the coercion
//! helpers here, so a value loaded from any format ends up with the same
//! in-memory shape. [`post_parse`] then runs once per loaded package.

use std::{collections::HashSet, sync::OnceLock};

use regex::Regex;
use tracing::debug;

use crate::{
    package::Package,
    recipe::{sort_builds, Build},
    taxonomy::{FlagType, FLAG_ORDER},
    value::{split_list_values, Toggle, Value},
    Error, Result,
};

pub const NO_DESCRIPTION: &str = "No description available";

pub(crate) fn text_value(name: &str, value: Value) -> Result<String> {
    match value {
        Value::Text(s) => Ok(s),
        Value::Toggle(t) if t.is_set() => Ok("yes".to_string()),
        Value::Toggle(Toggle::Raw(s)) => Ok(s),
        Value::Toggle(_) => Ok(String::new()),
        Value::List(_) => Err(Error::invalid_value(name, "expected a single value, found a list")),
    }
}

pub(crate) fn list_value(name: &str, value: Value) -> Result<Vec<String>> {
    match value {
        Value::Text(s) => Ok(split_list_values(&s)),
        Value::List(items) => Ok(items
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()),
        Value::Toggle(Toggle::Yes) => Ok(vec!["yes".to_string()]),
        Value::Toggle(Toggle::Unset) => Ok(Vec::new()),
        Value::Toggle(Toggle::Raw(s)) => Ok(split_list_values(&s)),
    }
}

/// A block of text becomes a line sequence, trimmed as a whole.
pub(crate) fn lines_value(name: &str, value: Value) -> Result<Vec<String>> {
    match value {
        Value::Text(s) => {
            let text = s.trim();
            if text.is_empty() {
                return Ok(Vec::new());
            }
            Ok(text.split('\n').map(|l| l.trim_end_matches('\r').to_string()).collect())
        }
        Value::List(lines) => Ok(lines),
        Value::Toggle(_) => Err(Error::invalid_value(name, "expected text, found a boolean")),
    }
}

pub(crate) fn toggle_value(name: &str, value: Value) -> Result<Toggle> {
    match value {
        Value::Toggle(t) => Ok(t),
        Value::Text(s) => Ok(Toggle::from_literal(&s)),
        Value::List(_) => Err(Error::invalid_value(name, "expected a boolean, found a list")),
    }
}

fn escaped_newlines() -> Result<&'static Regex> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    if let Some(re) = PATTERN.get() {
        return Ok(re);
    }
    let re = Regex::new(r"\\( |\n)")?;
    Ok(PATTERN.get_or_init(|| re))
}

/// Drop backslash line continuations from a shell fragment.
pub fn strip_continuations(script: &str) -> Result<String> {
    Ok(escaped_newlines()?.replace_all(script, "").trim().to_string())
}

fn normalize_build(build: &mut Build) -> Result<()> {
    for flag in FLAG_ORDER {
        match flag.flag_type() {
            FlagType::Script => {
                if let Value::Text(script) = build.get_flag(flag) {
                    if !script.is_empty() {
                        build.set_flag(flag, Value::Text(strip_continuations(&script)?))?;
                    }
                }
            }
            FlagType::Boolean => {
                if let Value::Toggle(t) = build.get_flag(flag) {
                    build.set_flag(flag, Value::Toggle(t.canonical()))?;
                }
            }
            FlagType::Scalar | FlagType::List => {}
        }
    }
    Ok(())
}

/// Canonicalise a freshly loaded package. Runs exactly once per load.
pub fn post_parse(package: &mut Package) -> Result<()> {
    package.requires_root = std::mem::take(&mut package.requires_root).canonical();

    for build in &mut package.builds {
        normalize_build(build)?;
    }

    if package.description.is_empty() {
        package.description = vec![NO_DESCRIPTION.to_string()];
    }

    sort_builds(&mut package.builds);

    let mut seen = HashSet::new();
    for build in &package.builds {
        if !seen.insert(build.vercode.as_str()) {
            return Err(Error::DuplicateBuild {
                app_id: package.id().to_string(),
                vercode: build.vercode.clone(),
            });
        }
    }

    debug!(
        "Normalised {} with {} build(s)",
        package.id(),
        package.builds.len()
    );
    Ok(())
}
