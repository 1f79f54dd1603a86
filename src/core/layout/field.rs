//! Field specifications and record rendering

use super::formatters::ValueFormatter;
use crate::domain::Record;
use std::borrow::Cow;

/// Output column of a layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Staging column the value is read from
    pub key: Cow<'static, str>,
    /// Maximum output width in characters; longer values are cut
    pub width: Option<usize>,
    /// Non-empty values are left-padded with zeros to this length
    pub zero_pad: Option<usize>,
    /// Formatter applied to the raw value
    pub formatter: Option<ValueFormatter>,
}

impl FieldSpec {
    /// Plain pass-through field
    pub const fn new(key: &'static str) -> Self {
        Self {
            key: Cow::Borrowed(key),
            width: None,
            zero_pad: None,
            formatter: None,
        }
    }

    /// Sets the output width
    pub fn width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    /// Sets the zero-pad length
    pub fn zero_pad(mut self, length: usize) -> Self {
        self.zero_pad = Some(length);
        self
    }

    /// Attaches a formatter
    pub fn formatter(mut self, formatter: ValueFormatter) -> Self {
        self.formatter = Some(formatter);
        self
    }

    /// Renders this field from a record
    pub fn render(&self, record: &Record) -> String {
        let raw = record.get(&self.key);
        let value = match &self.formatter {
            Some(formatter) => Some(formatter.apply(raw)),
            None => raw.map(str::to_string),
        };
        prepare_field(value.as_deref(), self.width, self.zero_pad)
    }
}

/// Trims, zero-pads and truncates one output value
///
/// Truncation is silent; downstream consumers read fixed widths.
pub fn prepare_field(value: Option<&str>, width: Option<usize>, zero_pad: Option<usize>) -> String {
    let mut output = value.map(str::trim).unwrap_or("").to_string();

    if let Some(length) = zero_pad {
        let current = output.chars().count();
        if !output.is_empty() && current < length {
            output = format!("{}{}", "0".repeat(length - current), output);
        }
    }

    if let Some(width) = width {
        if output.chars().count() > width {
            output = output.chars().take(width).collect();
        }
    }

    output
}

/// Ordered field list rendered as one tab-delimited line per record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    name: String,
    fields: Vec<FieldSpec>,
}

impl Layout {
    /// Field separator in rendered lines
    pub const SEPARATOR: char = '\t';

    /// Creates a layout from its fields
    pub fn new(name: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Layout name, used in logs
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field specifications in output order
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Staging columns the layout reads
    pub fn keys(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.key.as_ref()).collect()
    }

    /// Reads `to` wherever the layout reads `from`
    pub fn rename_column(mut self, from: &str, to: &str) -> Self {
        for field in self.fields.iter_mut().filter(|f| f.key == from) {
            field.key = Cow::Owned(to.to_string());
        }
        self
    }

    /// Renders one record
    pub fn render(&self, record: &Record) -> String {
        let mut line = String::new();
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                line.push(Self::SEPARATOR);
            }
            line.push_str(&field.render(record));
        }
        line
    }
}
