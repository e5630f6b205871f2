//! Key/value documents in JSON.

use serde_json::Value as Json;

use crate::{
    package::Package,
    parser::{apply_field, build_from_pairs, invalid_document, skip_key, BUILDS_KEY},
    value::{Toggle, Value},
    Error, Result,
};

/// Numbers keep their source spelling, so `1.10` stays `1.10`.
fn scalar_text(value: &Json) -> Option<String> {
    match value {
        Json::String(s) => Some(s.clone()),
        Json::Number(n) => Some(n.to_string()),
        Json::Bool(true) => Some("yes".to_string()),
        Json::Bool(false) => Some(String::new()),
        _ => None,
    }
}

fn to_value(name: &str, value: Json) -> Result<Option<Value>> {
    let converted = match value {
        Json::Null => return Ok(None),
        Json::Bool(b) => Value::Toggle(Toggle::from_bool(b)),
        Json::Number(n) => Value::Text(n.to_string()),
        Json::String(s) => Value::Text(s),
        Json::Array(items) => Value::List(
            items
                .iter()
                .map(|item| {
                    scalar_text(item)
                        .ok_or_else(|| Error::invalid_value(name, "nested values are not allowed"))
                })
                .collect::<Result<_>>()?,
        ),
        Json::Object(_) => return Err(Error::invalid_value(name, "unexpected object")),
    };
    Ok(Some(converted))
}

pub fn parse(source: &str, content: &str, package: &mut Package) -> Result<()> {
    let document: Json = serde_json::from_str(content)?;
    let Json::Object(fields) = document else {
        return Err(invalid_document(source, "top level is not an object"));
    };

    for (name, value) in fields {
        if name == BUILDS_KEY {
            let Json::Array(builds) = value else {
                return Err(invalid_document(source, "builds is not a list"));
            };
            for entry in builds {
                let Json::Object(flags) = entry else {
                    return Err(invalid_document(source, "build entry is not an object"));
                };
                let mut pairs = Vec::with_capacity(flags.len());
                for (flag, value) in flags {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_stay_textual() {
        let mut package = Package::new("org.example");
        parse(
            "doc",
            r#"{"Current Version": 1.10, "Current Version Code": 110,
                "builds": [{"versionName": 2.0, "versionCode": 200, "commit": "abc"}]}"#,
            &mut package,
        )
        .unwrap();
        assert_eq!(package.current_version, "1.10");
        assert_eq!(package.current_version_code, "110");
        assert_eq!(package.builds[0].version, "2.0");
        assert_eq!(package.builds[0].vercode, "200");
    }

    #[test]
    fn test_nulls_are_skipped_and_unknown_names_rejected() {
        let mut package = Package::new("org.example");
        parse("doc", r#"{"Summary": null, "comments": {"x": 1}}"#, &mut package).unwrap();
        assert!(package.summary.is_empty());

        assert!(matches!(
            parse("doc", r#"{"Homepage": "x"}"#, &mut package),
            Err(Error::UnrecognisedField(name)) if name == "Homepage"
        ));
        assert!(matches!(
            parse("doc", r#"{"builds": [{"colour": "red"}]}"#, &mut package),
            Err(Error::UnrecognisedFlag(name)) if name == "colour"
        ));
    }

    #[test]
    fn test_malformed_documents() {
        let mut package = Package::new("org.example");
        assert!(matches!(
            parse("doc", "[1, 2]", &mut package),
            Err(Error::InvalidDocument { .. })
        ));
        assert!(matches!(
            parse("doc", "{not json", &mut package),
            Err(Error::Json(_))
        ));
        assert!(matches!(
            parse("doc", r#"{"Categories": [["a"]]}"#, &mut package),
            Err(Error::InvalidValue { .. })
        ));
    }
}
