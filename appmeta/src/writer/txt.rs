use std::io::Write;

use crate::{
    recipe::Build,
    taxonomy::{Field, FieldType, FlagType, FLAG_ORDER},
    value::Value,
    writer::MetadataWriter,
    Result,
};

/// Continuation used when a script is spread over several lines.
const SCRIPT_CONTINUATION: &str = "&& \\\n        ";

/// Writer for the native line-oriented format.
pub struct TxtWriter<W: Write> {
    out: W,
}

impl<W: Write> TxtWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn script_lines(script: &str) -> String {
    script
        .split("&& ")
        .map(str::trim_start)
        .collect::<Vec<_>>()
        .join(SCRIPT_CONTINUATION)
}

impl<W: Write> MetadataWriter for TxtWriter<W> {
    fn write_comment(&mut self, line: &str) -> Result<()> {
        writeln!(self.out, "# {}", line)?;
        Ok(())
    }

    fn write_field(&mut self, field: Field, value: &Value) -> Result<()> {
        match (field.field_type(), value) {
            (FieldType::Multiline, Value::List(lines)) => {
                writeln!(self.out, "{}:", field)?;
                for line in lines {
                    writeln!(self.out, "{}", line)?;
                }
                writeln!(self.out, ".")?;
            }
            (_, Value::List(items)) => writeln!(self.out, "{}:{}", field, items.join(","))?,
            (_, Value::Text(text)) => writeln!(self.out, "{}:{}", field, text)?,
            (_, Value::Toggle(toggle)) => {
                writeln!(self.out, "{}:{}", field, toggle.as_text().unwrap_or_default())?
            }
        }
        Ok(())
    }

    fn write_build(&mut self, build: &Build) -> Result<()> {
        writeln!(self.out, "Build:{},{}", build.version, build.vercode)?;
        for flag in FLAG_ORDER {
            let value = build.get_flag(flag);
            if value.is_empty() {
                continue;
            }
            match (flag.flag_type(), &value) {
                (FlagType::Script, Value::Text(script)) => {
                    writeln!(self.out, "    {}={}", flag, script_lines(script))?
                }
                (FlagType::Boolean, _) => writeln!(self.out, "    {}=yes", flag)?,
                (_, Value::List(items)) => writeln!(self.out, "    {}={}", flag, items.join(","))?,
                (_, Value::Text(text)) => writeln!(self.out, "    {}={}", flag, text)?,
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
