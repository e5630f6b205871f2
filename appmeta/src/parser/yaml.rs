//! Block-mapping documents in YAML.

use serde_yaml::Value as Yaml;

use crate::{
    package::Package,
    parser::{apply_field, build_from_pairs, invalid_document, skip_key, BUILDS_KEY},
    value::{Toggle, Value},
    Error, Result,
};

fn scalar_text(value: &Yaml) -> Option<String> {
    match value {
        Yaml::String(s) => Some(s.clone()),
        Yaml::Number(n) => Some(n.to_string()),
        Yaml::Bool(true) => Some("yes".to_string()),
        Yaml::Bool(false) => Some(String::new()),
        _ => None,
    }
}

fn to_value(name: &str, value: Yaml) -> Result<Option<Value>> {
    let converted = match value {
        Yaml::Null => return Ok(None),
        Yaml::Bool(b) => Value::Toggle(Toggle::from_bool(b)),
        Yaml::Number(n) => Value::Text(n.to_string()),
        Yaml::String(s) => Value::Text(s),
        Yaml::Sequence(items) => Value::List(
            items
                .iter()
                .map(|item| {
                    scalar_text(item)
                        .ok_or_else(|| Error::invalid_value(name, "nested values are not allowed"))
                })
                .collect::<Result<_>>()?,
        ),
        Yaml::Mapping(_) => return Err(Error::invalid_value(name, "unexpected mapping")),
        Yaml::Tagged(tagged) => return to_value(name, tagged.value),
    };
    Ok(Some(converted))
}

fn key_name(source: &str, key: Yaml) -> Result<String> {
    match key {
        Yaml::String(s) => Ok(s),
        other => scalar_text(&other)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| invalid_document(source, "mapping keys must be scalars")),
    }
}

pub fn parse(source: &str, content: &str, package: &mut Package) -> Result<()> {
    if content.trim().is_empty() {
        return Ok(());
    }
    let document: Yaml = serde_yaml::from_str(content)?;
    let fields = match document {
        Yaml::Mapping(fields) => fields,
        Yaml::Null => return Ok(()),
        _ => return Err(invalid_document(source, "top level is not a mapping")),
    };

    for (key, value) in fields {
        let name = key_name(source, key)?;
        if name == BUILDS_KEY {
            let Yaml::Sequence(builds) = value else {
                return Err(invalid_document(source, "builds is not a list"));
            };
            for entry in builds {
                let Yaml::Mapping(flags) = entry else {
                    return Err(invalid_document(source, "build entry is not a mapping"));
                };
                let mut pairs = Vec::with_capacity(flags.len());
                for (flag, value) in flags {
                    let flag = key_name(source, flag)?;
                    if let Some(value) = to_value(&flag, value)? {
                        pairs.push((flag, value));
                    }
                }
                package.builds.push(build_from_pairs(pairs)?);
            }
            continue;
        }
        if skip_key(package, &name) {
            continue;
        }
        if let Some(value) = to_value(&name, value)? {
            apply_field(package, &name, value)?;
        }
    }
    Ok(())
}
