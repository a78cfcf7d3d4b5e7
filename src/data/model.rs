use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// RawValue – a single untyped cell as delivered by a record source
// ---------------------------------------------------------------------------

/// A loosely-typed cell value, mirroring what spreadsheet APIs hand back.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Empty,
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Text(s) => write!(f, "{s}"),
            RawValue::Integer(i) => write!(f, "{i}"),
            RawValue::Float(v) => write!(f, "{v}"),
            RawValue::Bool(b) => write!(f, "{b}"),
            RawValue::Empty => Ok(()),
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Float(v)
    }
}

impl From<i64> for RawValue {
    fn from(v: i64) -> Self {
        RawValue::Integer(v)
    }
}

// ---------------------------------------------------------------------------
// RawRecord – one source row, column name → raw value
// ---------------------------------------------------------------------------

/// One row as handed over by a [`RecordSource`](super::source::RecordSource).
///
/// Column names are kept verbatim (including stray whitespace); only the
/// normalizer looks inside.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub fields: BTreeMap<String, RawValue>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, handy for sources and tests.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.fields.insert(column.into(), value.into());
        self
    }
}

impl FromIterator<(String, RawValue)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (String, RawValue)>>(iter: I) -> Self {
        RawRecord {
            fields: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// RawRows – one fetched table: header plus rows
// ---------------------------------------------------------------------------

/// Everything a source returns for one table.
///
/// `columns` is the header as read, so a table without data rows still
/// tells the normalizer which columns it has.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRows {
    pub columns: Vec<String>,
    pub records: Vec<RawRecord>,
}

impl RawRows {
    pub fn new(columns: Vec<String>, records: Vec<RawRecord>) -> Self {
        RawRows { columns, records }
    }

    /// For headerless formats: the columns are every key seen in `records`,
    /// in first-seen order.
    pub fn from_records(records: Vec<RawRecord>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in &records {
            for key in record.fields.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }
        RawRows { columns, records }
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<RawRecord>> for RawRows {
    fn from(records: Vec<RawRecord>) -> Self {
        RawRows::from_records(records)
    }
}

// ---------------------------------------------------------------------------
// Column – the fixed inventory schema
// ---------------------------------------------------------------------------

/// The six retained columns, in canonical (export) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Code,
    Description,
    OutletPrice,
    Brand,
    Model,
    Category,
}

impl Column {
    pub const ALL: [Column; 6] = [
        Column::Code,
        Column::Description,
        Column::OutletPrice,
        Column::Brand,
        Column::Model,
        Column::Category,
    ];

    /// Header as it appears in the source sheet and in every export.
    pub fn header(self) -> &'static str {
        match self {
            Column::Code => "Código",
            Column::Description => "Descripción",
            Column::OutletPrice => "Precio Outlet",
            Column::Brand => "Marca",
            Column::Model => "Modelo",
            Column::Category => "Categoria",
        }
    }

    pub fn headers() -> [&'static str; 6] {
        Column::ALL.map(Column::header)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

// ---------------------------------------------------------------------------
// PartRecord / PartTable – the normalized inventory
// ---------------------------------------------------------------------------

/// A single normalized inventory row.
#[derive(Debug, Clone, PartialEq)]
pub struct PartRecord {
    pub code: String,
    pub description: String,
    /// Always non-negative.
    pub outlet_price: f64,
    pub brand: String,
    pub model: String,
    pub category: String,
}

/// Ordered, immutable sequence of [`PartRecord`]s.
///
/// Order is source order. Filtering builds new tables; nothing mutates one
/// after construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartTable {
    records: Vec<PartRecord>,
}

impl PartTable {
    pub fn from_records(records: Vec<PartRecord>) -> Self {
        PartTable { records }
    }

    pub fn records(&self) -> &[PartRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PartRecord> {
        self.records.iter()
    }

    /// Number of parts.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a PartTable {
    type Item = &'a PartRecord;
    type IntoIter = std::slice::Iter<'a, PartRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
