use std::io::Write;

use crate::{
    recipe::Build,
    taxonomy::{Field, FieldType, FlagType, FLAG_ORDER},
    value::Value,
    writer::MetadataWriter,
    Result,
};

/// Writer for YAML block-mapping documents.
pub struct YamlWriter<W: Write> {
    out: W,
    builds_started: bool,
}

impl<W: Write> YamlWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            builds_started: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn scalar(&mut self, indent: &str, key: &str, value: &str) -> Result<()> {
        writeln!(self.out, "{}{}: {}", indent, key, quote(value)?)?;
        Ok(())
    }

    fn list(&mut self, indent: &str, key: &str, items: &[String]) -> Result<()> {
        if items.is_empty() {
            writeln!(self.out, "{}{}: []", indent, key)?;
            return Ok(());
        }
        writeln!(self.out, "{}{}:", indent, key)?;
        for item in items {
            writeln!(self.out, "{}  - {}", indent, quote(item)?)?;
        }
        Ok(())
    }

    /// Literal block; the text keeps its line structure.
    fn block<S: AsRef<str>>(&mut self, indent: &str, key: &str, lines: &[S]) -> Result<()> {
        if lines.is_empty() {
            writeln!(self.out, "{}{}: ''", indent, key)?;
            return Ok(());
        }
        // Indentation is detected from the first non-blank line, so an
        // indented one needs an explicit indicator.
        let leading_space = lines
            .iter()
            .map(AsRef::as_ref)
            .find(|line| !line.is_empty())
            .is_some_and(|line| line.starts_with(' '));
        writeln!(
            self.out,
            "{}{}: |{}",
            indent,
            key,
            if leading_space { "2" } else { "" }
        )?;
        for line in lines {
            let line = line.as_ref();
            if line.is_empty() {
                writeln!(self.out)?;
            } else {
                writeln!(self.out, "{}  {}", indent, line)?;
            }
        }
        Ok(())
    }
}

/// YAML spelling of a plain string, quoted wherever the bare text would
/// read back as something else.
fn quote(value: &str) -> Result<String> {
    if value.is_empty() {
        return Ok("''".to_string());
    }
    Ok(serde_yaml::to_string(value)?.trim_end().to_string())
}

/// Scripts are broken after each `&&` with a backslash continuation,
/// which the reader strips again.
fn script_block(script: &str) -> Vec<String> {
    let parts: Vec<&str> = script.split("&& ").collect();
    let last = parts.len().saturating_sub(1);
    parts
        .iter()
        .enumerate()
        .map(|(index, part)| {
            if index < last {
                format!("{}&& \\", part)
            } else {
                part.to_string()
            }
        })
        .collect()
}

impl<W: Write> MetadataWriter for YamlWriter<W> {
    fn write_comment(&mut self, line: &str) -> Result<()> {
        writeln!(self.out, "# {}", line)?;
        Ok(())
    }

    fn write_field(&mut self, field: Field, value: &Value) -> Result<()> {
        let key = field.name();
        match (field.field_type(), value) {
            (FieldType::Multiline, Value::List(lines)) => self.block("", key, lines),
            (_, Value::List(items)) => self.list("", key, items),
            (_, Value::Text(text)) => self.scalar("", key, text),
            (_, Value::Toggle(toggle)) => self.scalar("", key, toggle.as_text().unwrap_or_default()),
        }
    }

    fn write_build(&mut self, build: &Build) -> Result<()> {
        if !self.builds_started {
            writeln!(self.out, "builds:")?;
            self.builds_started = true;
        }
        self.scalar("  - ", "versionName", &build.version)?;
        self.scalar("    ", "versionCode", &build.vercode)?;

        for flag in FLAG_ORDER {
            let value = build.get_flag(flag);
            if value.is_empty() {
                continue;
            }
            let key = flag.name();
            match (flag.flag_type(), &value) {
                (FlagType::Script, Value::Text(script)) => {
                    self.block("    ", key, &script_block(script))?
                }
                (FlagType::Boolean, _) => self.scalar("    ", key, "yes")?,
                (_, Value::List(items)) => self.list("    ", key, items)?,
                (_, Value::Text(text)) => self.scalar("    ", key, text)?,
                (_, Value::Toggle(_)) => {}
            }
        }
        Ok(())
    }

    fn write_separator(&mut self) -> Result<()> {
        writeln!(self.out)?;
        Ok(())
    }
}
