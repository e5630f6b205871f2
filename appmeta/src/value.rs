/// State of a boolean field or flag.
///
/// Absence means false. A literal that is neither a recognised truthy nor a
/// recognised falsy form is kept verbatim so validation can report it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Toggle {
    #[default]
    Unset,
    Yes,
    Raw(String),
}

impl Toggle {
    pub fn from_bool(value: bool) -> Self {
        if value {
            Toggle::Yes
        } else {
            Toggle::Unset
        }
    }

    /// Keep the literal as loaded; [`Toggle::canonical`] decides what it means.
    pub fn from_literal(literal: &str) -> Self {
        if literal.is_empty() {
            Toggle::Unset
        } else {
            Toggle::Raw(literal.to_string())
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Toggle::Yes)
    }

    pub fn canonical(self) -> Self {
        match self {
            Toggle::Raw(literal) => match literal.as_str() {
                "yes" | "Yes" | "true" | "True" => Toggle::Yes,
                "no" | "No" | "false" | "False" => Toggle::Unset,
                _ => Toggle::Raw(literal),
            },
            other => other,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Toggle::Unset => None,
            Toggle::Yes => Some("yes"),
            Toggle::Raw(literal) => Some(literal),
        }
    }
}

/// A field or flag value crossing the name-keyed boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    List(Vec<String>),
    Toggle(Toggle),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }

    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Value::Text(s) => s.is_empty(),
            Value::List(items) => items.is_empty(),
            Value::Toggle(t) => !t.is_set(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Split a list value on commas. `;` is a deprecated alias for `,`.
pub fn split_list_values(s: &str) -> Vec<String> {
    s.replace(';', ",")
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .collect()
}
