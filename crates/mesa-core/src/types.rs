//! Common types, errors, and constants for MESA file operations

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Constants
// ============================================================================

/// Library version, also reported by the Python module as `__version__`
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Number of structural lines preceding the first data row
pub const HEADER_LINES: usize = 6;
/// Zero-based line holding the header field names
pub const HEADER_NAMES_LINE: usize = 1;
/// Zero-based line holding the header field values
pub const HEADER_VALUES_LINE: usize = 2;
/// Zero-based line holding the column names
pub const COLUMN_NAMES_LINE: usize = 5;

/// Origin label used in errors for data parsed from memory
pub const MEMORY_ORIGIN: &str = "<memory>";

// ============================================================================
// Enums
// ============================================================================

/// A decoded scalar token
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(untagged))]
pub enum Value {
    Int(i64),
    Float(f64),
    /// Token matching neither numeric grammar, kept verbatim
    Text(String),
}

impl Value {
    /// Numeric view of the value; integers are widened
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Text(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, Value::Text(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            // Debug keeps the shortest round-trip form and switches to
            // exponent notation for very large or small magnitudes
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// Row ordering applied when building columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowOrder {
    /// Physical file order (history files)
    #[default]
    AsStored,
    /// Last row first (profile files, which are written surface-first)
    Reversed,
}

impl RowOrder {
    pub fn from_reversed(reversed: bool) -> Self {
        if reversed {
            RowOrder::Reversed
        } else {
            RowOrder::AsStored
        }
    }
}

/// Model-number matching policy for profile lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchPolicy {
    /// Only an identical model number is accepted
    #[default]
    Exact,
    /// Fall back to the closest model number
    Nearest,
}

impl MatchPolicy {
    pub fn from_nearest(nearest: bool) -> Self {
        if nearest {
            MatchPolicy::Nearest
        } else {
            MatchPolicy::Exact
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Error type for MESA reading and export operations
#[derive(Debug, Error)]
pub enum MesaError {
    #[error("cannot access '{}': {source}", path.display())]
    Access {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed data in {origin}: {reason}")]
    Format { origin: String, reason: String },

    #[error(
        "no profile with model number {requested} in index (closest is {nearest}); \
         retry with nearest matching enabled"
    )]
    ModelNotFound { requested: i64, nearest: i64 },

    #[error("column '{0}' not present in data")]
    MissingColumn(String),

    #[error("write failed: {0}")]
    Write(#[from] io::Error),
}

impl MesaError {
    pub(crate) fn format(origin: &str, reason: impl Into<String>) -> Self {
        MesaError::Format {
            origin: origin.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn access(path: impl Into<PathBuf>, source: io::Error) -> Self {
        MesaError::Access {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, MesaError>;

// ============================================================================
// Data Structures
// ============================================================================

/// One named body column
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All values as `f64`, or `None` if any value is text
    pub fn to_f64(&self) -> Option<Vec<f64>> {
        self.values.iter().map(Value::as_f64).collect()
    }

    /// All values as `i64`, or `None` if any value is not an integer
    pub fn to_i64(&self) -> Option<Vec<i64>> {
        self.values.iter().map(Value::as_i64).collect()
    }
}

/// Entry of the merged field mapping
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field<'a> {
    Scalar(&'a Value),
    Column(&'a [Value]),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Slot {
    Header(usize),
    Column(usize),
}

/// Parsed contents of one history or profile file.
///
/// Header fields and body columns share one ordered key space. When a column
/// has the same name as a header field, the column replaces the header entry
/// in the merged view ([`MesaData::get`], [`MesaData::fields`]) while keeping
/// its position. The shadowed header value is still reachable through
/// [`MesaData::header`].
#[derive(Debug, Clone, PartialEq)]
pub struct MesaData {
    header: Vec<(String, Value)>,
    columns: Vec<Column>,
    num_rows: usize,
    entries: Vec<(String, Slot)>,
    lookup: HashMap<String, usize>,
}

impl MesaData {
    /// Assemble a record from decoded header pairs and columns.
    ///
    /// Callers guarantee every column has `num_rows` values.
    pub(crate) fn new(header: Vec<(String, Value)>, columns: Vec<Column>, num_rows: usize) -> Self {
        let mut entries: Vec<(String, Slot)> = Vec::with_capacity(header.len() + columns.len());
        let mut lookup: HashMap<String, usize> = HashMap::with_capacity(entries.capacity());

        let header_slots = header
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (name, Slot::Header(i)));
        let column_slots = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (&c.name, Slot::Column(i)));

        for (name, slot) in header_slots.chain(column_slots) {
            match lookup.get(name) {
                Some(&pos) => entries[pos].1 = slot,
                None => {
                    lookup.insert(name.clone(), entries.len());
                    entries.push((name.clone(), slot));
                }
            }
        }

        Self {
            header,
            columns,
            num_rows,
            entries,
            lookup,
        }
    }

    /// Number of body rows (length of every column)
    pub fn len(&self) -> usize {
        self.num_rows
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    /// Header fields in file order
    pub fn header(&self) -> &[(String, Value)] {
        &self.header
    }

    /// Body columns in file order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Header value by name; the last entry wins if a name repeats
    pub fn header_value(&self, name: &str) -> Option<&Value> {
        self.header.iter().rev().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Column by name; the last column wins if a name repeats
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().rev().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Look up a name in the merged mapping
    pub fn get(&self, name: &str) -> Option<Field<'_>> {
        let &pos = self.lookup.get(name)?;
        Some(self.resolve(self.entries[pos].1))
    }

    /// Keys of the merged mapping in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// The merged mapping in insertion order
    pub fn fields(&self) -> impl Iterator<Item = (&str, Field<'_>)> {
        self.entries
            .iter()
            .map(|(n, slot)| (n.as_str(), self.resolve(*slot)))
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.lookup.contains_key(name)
    }

    fn resolve(&self, slot: Slot) -> Field<'_> {
        match slot {
            Slot::Header(i) => Field::Scalar(&self.header[i].1),
            Slot::Column(i) => Field::Column(&self.columns[i].values),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, values: &[i64]) -> Column {
        Column {
            name: name.to_string(),
            values: values.iter().map(|&v| Value::Int(v)).collect(),
        }
    }

    #[test]
    fn test_merged_mapping_order() {
        let data = MesaData::new(
            vec![("version_number".into(), Value::Int(15140))],
            vec![column("model_number", &[1, 2]), column("star_age", &[0, 5])],
            2,
        );

        let keys: Vec<_> = data.keys().collect();
        assert_eq!(keys, ["version_number", "model_number", "star_age"]);
        assert_eq!(data.get("version_number"), Some(Field::Scalar(&Value::Int(15140))));
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn test_column_overrides_header_in_place() {
        let data = MesaData::new(
            vec![
                ("model_number".into(), Value::Int(99)),
                ("burn_min1".into(), Value::Float(50.0)),
            ],
            vec![column("model_number", &[1, 2, 3])],
            3,
        );

        let keys: Vec<_> = data.keys().collect();
        assert_eq!(keys, ["model_number", "burn_min1"]);
        match data.get("model_number") {
            Some(Field::Column(values)) => assert_eq!(values.len(), 3),
            other => panic!("expected column, got {:?}", other),
        }
        // Shadowed header value stays reachable
        assert_eq!(data.header_value("model_number"), Some(&Value::Int(99)));
    }

    #[test]
    fn test_repeated_header_name_last_wins() {
        let data = MesaData::new(
            vec![("x".into(), Value::Int(1)), ("x".into(), Value::Int(2))],
            vec![column("y", &[5])],
            1,
        );

        assert_eq!(data.header_value("x"), Some(&Value::Int(2)));
        assert_eq!(data.get("x"), Some(Field::Scalar(&Value::Int(2))));
        assert_eq!(data.header().len(), 2);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Int(-3).to_string(), "-3");
        assert_eq!(Value::Float(150.0).to_string(), "150.0");
        assert_eq!(Value::Float(1.234e-56).to_string(), "1.234e-56");
        assert_eq!(Value::Text("\"gfortran\"".into()).to_string(), "\"gfortran\"");
    }

    #[test]
    fn test_column_numeric_views() {
        let mixed = Column {
            name: "x".into(),
            values: vec![Value::Int(1), Value::Float(2.5)],
        };
        assert_eq!(mixed.to_f64(), Some(vec![1.0, 2.5]));
        assert_eq!(mixed.to_i64(), None);

        let text = Column {
            name: "y".into(),
            values: vec![Value::Text("abc".into())],
        };
        assert_eq!(text.to_f64(), None);
    }

    #[test]
    fn test_error_messages() {
        let err = MesaError::ModelNotFound {
            requested: 6,
            nearest: 5,
        };
        assert!(err.to_string().contains("nearest"));

        let err = MesaError::format("history.data", "row 7 has 3 values, expected 4");
        assert!(err.to_string().contains("history.data"));
    }
}
