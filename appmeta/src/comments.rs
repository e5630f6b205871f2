use indexmap::IndexMap;

use crate::taxonomy::Field;

/// What a captured comment block was written in front of.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CommentKey {
    Field(Field),
    /// A build recipe, by version code.
    Build(String),
    /// Trailing comments after the last field.
    End,
}

/// Comments captured from a native document, kept only so that the
/// document can be written back with them in place.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Comments {
    entries: IndexMap<CommentKey, Vec<String>>,
}

impl Comments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, key: CommentKey, lines: Vec<String>) {
        if lines.is_empty() {
            return;
        }
        self.entries.entry(key).or_default().extend(lines);
    }

    pub fn get(&self, key: &CommentKey) -> &[String] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CommentKey, &Vec<String>)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_keeps_order_and_skips_empty() {
        let mut comments = Comments::new();
        comments.attach(CommentKey::Field(Field::License), vec![]);
        assert!(comments.is_empty());

        comments.attach(CommentKey::Build("3".into()), vec!["first".into()]);
        comments.attach(CommentKey::End, vec!["last".into()]);
        comments.attach(CommentKey::Build("3".into()), vec!["second".into()]);

        assert_eq!(
            comments.get(&CommentKey::Build("3".into())),
            ["first".to_string(), "second".to_string()]
        );
        let keys: Vec<_> = comments.iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(keys, vec![CommentKey::Build("3".into()), CommentKey::End]);
        assert!(comments.get(&CommentKey::Field(Field::Summary)).is_empty());
    }
}
