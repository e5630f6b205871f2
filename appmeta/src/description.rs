//! Wiki-style markup used in descriptions and maintainer notes.
//!
//! A description is a sequence of lines. Lines starting with `* ` or `# `
//! are list items, blank lines end the current block and anything else is
//! paragraph text. Inside a block, `''` toggles italics, `'''` toggles bold,
//! `[[app.id]]` links to another package and `[url text]` links out.
//!
//! [`DescriptionFormatter`] renders the same lines three ways at once:
//! wrapped plain text, HTML, and the wiki source itself.

use crate::{Error, Result};

const WRAP_WIDTH: usize = 80;

/// Resolves a `[[id]]` link into `(target, display text)`.
pub type LinkResolver<'a> = &'a dyn Fn(&str) -> Result<(String, String)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    None,
    Paragraph,
    UnorderedList,
    OrderedList,
}

#[derive(Debug, Default, Clone, Copy)]
struct InlineStyle {
    bold: bool,
    italic: bool,
}

/// Output of a finished formatter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    pub plain: String,
    pub html: String,
    pub wiki: String,
}

pub struct DescriptionFormatter<'a> {
    resolver: Option<LinkResolver<'a>>,
    block: Block,
    style: InlineStyle,
    paragraph: Vec<String>,
    out: Rendered,
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Greedy fill at `width` columns. Words are never split, so a word longer
/// than the width gets a line to itself.
fn wrap(text: &str, width: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut line_len = 0;
    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if line_len > 0 && line_len + 1 + word_len > width {
            out.push('\n');
            line_len = 0;
        } else if line_len > 0 {
            out.push(' ');
            line_len += 1;
        }
        out.push_str(word);
        line_len += word_len;
    }
    out
}

impl<'a> DescriptionFormatter<'a> {
    pub fn new(resolver: Option<LinkResolver<'a>>) -> Self {
        Self {
            resolver,
            block: Block::None,
            style: InlineStyle::default(),
            paragraph: Vec::new(),
            out: Rendered::default(),
        }
    }

    /// Strip or translate the quote markers in `text`, returning the plain
    /// and HTML renditions.
    fn formatted(&mut self, text: &str) -> (String, String) {
        let mut plain = String::with_capacity(text.len());
        let mut html = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(index) = rest.find("''") {
            plain.push_str(&rest[..index]);
            html.push_str(&escape_html(&rest[..index]));
            rest = &rest[index..];
            if rest.starts_with("'''") {
                html.push_str(if self.style.bold { "</b>" } else { "<b>" });
                self.style.bold = !self.style.bold;
                rest = &rest[3..];
            } else {
                html.push_str(if self.style.italic { "</i>" } else { "<i>" });
                self.style.italic = !self.style.italic;
                rest = &rest[2..];
            }
        }
        plain.push_str(rest);
        html.push_str(&escape_html(rest));
        (plain, html)
    }

    fn linkify(&mut self, text: &str) -> Result<(String, String)> {
        let mut plain = String::new();
        let mut html = String::new();
        let mut rest = text;
        while let Some(index) = rest.find('[') {
            let (p, h) = self.formatted(&rest[..index]);
            plain.push_str(&p);
            html.push_str(&h);
            rest = &rest[index..];

            if let Some(inner) = rest.strip_prefix("[[") {
                let end = inner
                    .find("]]")
                    .ok_or_else(|| Error::Markup("Unterminated ]]".into()))?;
                let id = &inner[..end];
                let (target, label) = match self.resolver {
                    Some(resolve) => resolve(id)?,
                    None => (id.to_string(), id.to_string()),
                };
                html.push_str(&format!(
                    "<a href=\"{}\">{}</a>",
                    escape_html(&target),
                    escape_html(&label)
                ));
                plain.push_str(&label);
                rest = &inner[end + 2..];
            } else {
                let inner = &rest[1..];
                let end = inner
                    .find(']')
                    .ok_or_else(|| Error::Markup("Unterminated ]".into()))?;
                let link = &inner[..end];
                let (url, label) = match link.split_once(' ') {
                    Some((url, label)) => {
                        if url == label {
                            return Err(Error::Markup(
                                "Url title is just the URL - use [url]".into(),
                            ));
                        }
                        (url, label)
                    }
                    None => (link, link),
                };
                html.push_str(&format!(
                    "<a href=\"{}\">{}</a>",
                    escape_html(url),
                    escape_html(label)
                ));
                plain.push_str(label);
                if label != url {
                    plain.push_str(&format!(" ({})", url));
                }
                rest = &inner[end + 1..];
            }
        }
        let (p, h) = self.formatted(rest);
        plain.push_str(&p);
        html.push_str(&h);
        Ok((plain, html))
    }

    fn end_block(&mut self) -> Result<()> {
        match self.block {
            Block::None => {}
            Block::Paragraph => {
                let whole = self.paragraph.join(" ");
                self.paragraph.clear();
                let (plain, html) = self.linkify(&whole)?;
                self.out.html.push_str(&html);
                self.out.html.push_str("</p>");
                self.out.plain.push_str(&wrap(&plain, WRAP_WIDTH));
                self.out.plain.push_str("\n\n");
            }
            Block::UnorderedList => {
                self.out.html.push_str("</ul>");
                self.out.plain.push('\n');
            }
            Block::OrderedList => {
                self.out.html.push_str("</ol>");
                self.out.plain.push('\n');
            }
        }
        self.block = Block::None;
        Ok(())
    }

    fn list_item(&mut self, block: Block, marker: &str, item: &str) -> Result<()> {
        if self.block != block {
            self.end_block()?;
            self.out.html.push_str(match block {
                Block::OrderedList => "<ol>",
                _ => "<ul>",
            });
            self.block = block;
        }
        let (plain, html) = self.linkify(item)?;
        self.out.plain.push_str(marker);
        self.out.plain.push_str(&plain);
        self.out.plain.push('\n');
        self.out.html.push_str("<li>");
        self.out.html.push_str(&html);
        self.out.html.push_str("</li>");
        Ok(())
    }

    pub fn parse_line(&mut self, line: &str) -> Result<()> {
        self.out.wiki.push_str(line);
        self.out.wiki.push('\n');

        if line.is_empty() {
            self.end_block()
        } else if let Some(item) = line.strip_prefix("* ") {
            self.list_item(Block::UnorderedList, "* ", item)
        } else if let Some(item) = line.strip_prefix("# ") {
            self.list_item(Block::OrderedList, "# ", item)
        } else {
            if self.block != Block::Paragraph {
                self.end_block()?;
                self.out.html.push_str("<p>");
                self.block = Block::Paragraph;
            }
            self.paragraph.push(line.to_string());
            Ok(())
        }
    }

    /// Flush the open block and return all three renditions.
    pub fn finish(mut self) -> Result<Rendered> {
        self.end_block()?;
        self.out.plain = self.out.plain.trim().to_string();
        Ok(self.out)
    }
}

pub fn render<S: AsRef<str>>(lines: &[S], resolver: Option<LinkResolver<'_>>) -> Result<Rendered> {
    let mut formatter = DescriptionFormatter::new(resolver);
    for line in lines {
        formatter.parse_line(line.as_ref())?;
    }
    formatter.finish()
}

/// Plain text, wrapped at 80 columns.
pub fn description_txt<S: AsRef<str>>(lines: &[S]) -> Result<String> {
    Ok(render(lines, None)?.plain)
}

pub fn description_html<S: AsRef<str>>(
    lines: &[S],
    resolver: Option<LinkResolver<'_>>,
) -> Result<String> {
    Ok(render(lines, resolver)?.html)
}

/// The wiki source, one line per input line. Also used for maintainer notes.
pub fn description_wiki<S: AsRef<str>>(lines: &[S]) -> Result<String> {
    Ok(render(lines, None)?.wiki)
}
