use chrono::NaiveDateTime;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Output format for date cells.
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A single spreadsheet cell after it has left the workbook reader.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDateTime),
    Absent,
}

impl CellValue {
    /// Empty, whitespace-only and absent cells all count as missing.
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Absent => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn normalized(self) -> CellValue {
        if self.is_missing() {
            CellValue::Absent
        } else {
            self
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Text rendering used when the cell acts as a column label.
    pub fn label(&self) -> Option<String> {
        if self.is_missing() {
            return None;
        }
        let label = match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 => {
                format!("{:.0}", f)
            }
            CellValue::Float(f) => f.to_string(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Date(d) => d.format("%Y-%m-%d %H:%M:%S").to_string(),
            CellValue::Absent => return None,
        };
        Some(label)
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Text(s) => serializer.serialize_str(s),
            CellValue::Int(i) => serializer.serialize_i64(*i),
            CellValue::Float(f) => serializer.serialize_f64(*f),
            CellValue::Bool(b) => serializer.serialize_bool(*b),
            CellValue::Date(d) => serializer.collect_str(&d.format(DATE_FORMAT)),
            CellValue::Absent => serializer.serialize_none(),
        }
    }
}

/// One data row keyed by canonical column name.
///
/// Fields stay in header order. Duplicate names are kept as-is and come out
/// as repeated keys in the serialized object.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: Vec<(String, CellValue)>,
}

impl Record {
    /// Zips `header` with `row` positionally. Missing trailing cells become
    /// [`CellValue::Absent`] so every record carries the full header.
    pub fn from_row(header: &[String], row: &[CellValue]) -> Self {
        let fields = header
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let value = row.get(idx).cloned().unwrap_or(CellValue::Absent).normalized();
                (name.clone(), value)
            })
            .collect();
        Self { fields }
    }

    /// First value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.fields.iter().find(|(key, _)| key == name).map(|(_, value)| value)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &CellValue> {
        self.fields.iter().map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
