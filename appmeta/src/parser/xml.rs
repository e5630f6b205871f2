//! Tree documents in XML.
//!
//! ```xml
//! <resources>
//!   <string name="License">GPLv3</string>
//!   <string-array name="Categories"><item>Internet</item></string-array>
//!   <builds>
//!     <build><version>1.0</version><vercode>1</vercode><commit>v1.0</commit></build>
//!   </builds>
//! </resources>
//! ```

use quick_xml::{events::BytesStart, events::Event, Reader};

use crate::{
    package::Package,
    parser::{apply_field, build_from_pairs, invalid_document, BUILDS_KEY},
    value::Value,
    Result,
};

#[derive(Debug, Default)]
struct Element {
    tag: String,
    name: Option<String>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> Result<Self> {
        let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let name = match start
            .try_get_attribute("name")
            .map_err(quick_xml::Error::from)?
        {
            Some(attr) => Some(attr.unescape_value()?.into_owned()),
            None => None,
        };
        Ok(Self {
            tag,
            name,
            ..Default::default()
        })
    }
}

fn read_tree(source: &str, content: &str) -> Result<Element> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(Element::open(&start)?),
            Event::Empty(start) => {
                let element = Element::open(&start)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| invalid_document(source, "unbalanced closing tag"))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(invalid_document(source, "unclosed element"));
    }
    root.ok_or_else(|| invalid_document(source, "document has no root element"))
}

fn field_name<'e>(source: &str, element: &'e Element) -> Result<&'e str> {
    element
        .name
        .as_deref()
        .ok_or_else(|| invalid_document(source, format!("<{}> without a name", element.tag)))
}

pub fn parse(source: &str, content: &str, package: &mut Package) -> Result<()> {
    let root = read_tree(source, content)?;
    if root.tag != "resources" {
        return Err(invalid_document(
            source,
            "root element must be <resources></resources>",
        ));
    }

    for child in root.children {
        match child.tag.as_str() {
            "string" => {
                let name = field_name(source, &child)?;
                apply_field(package, name, Value::Text(child.text.clone()))?;
            }
            "string-array" => {
                let name = field_name(source, &child)?;
                let items = child.children.iter().map(|item| item.text.clone());
                apply_field(package, name, Value::list(items))?;
            }
            BUILDS_KEY => {
                for build in child.children {
                    let pairs = build
                        .children
                        .into_iter()
                        .map(|flag| (flag.tag, Value::Text(flag.text)));
                    package.builds.push(build_from_pairs(pairs)?);
                }
            }
            other => {
                return Err(invalid_document(
                    source,
                    format!("unexpected element <{}>", other),
                ))
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_string_arrays_replace_defaults() {
        let mut package = Package::new("org.example");
        parse(
            "doc",
            r#"<resources>
                 <string-array name="Categories"><item>Internet</item><item>Office</item></string-array>
                 <string name="Summary">Tom &amp; Jerry</string>
                 <string name="Description"><![CDATA[Line <one>
Line two]]></string>
               </resources>"#,
            &mut package,
        )
        .unwrap();
        assert_eq!(package.categories, vec!["Internet", "Office"]);
        assert_eq!(package.summary, "Tom & Jerry");
        assert_eq!(package.description, vec!["Line <one>", "Line two"]);
    }

    #[test]
    fn test_wrong_root_is_rejected() {
        let mut package = Package::new("org.example");
        let err = parse("a.xml", "<metadata/>", &mut package).unwrap_err();
        assert!(matches!(err, Error::InvalidDocument { ref path, .. } if path == "a.xml"));
    }

    #[test]
    fn test_unnamed_string_is_rejected() {
        let mut package = Package::new("org.example");
        assert!(matches!(
            parse("doc", "<resources><string>x</string></resources>", &mut package),
            Err(Error::InvalidDocument { .. })
        ));
    }

    #[test]
    fn test_empty_build_flag_element() {
        let mut package = Package::new("org.example");
        parse(
            "doc",
            "<resources><builds><build><version>1.0</version><vercode>1</vercode>\
             <commit>v1</commit><subdir/></build></builds></resources>",
            &mut package,
        )
        .unwrap();
        assert_eq!(package.builds[0].commit, "v1");
        assert!(package.builds[0].subdir.is_empty());
    }
}
