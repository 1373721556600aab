//! Output adapters
//!
//! An adapter converts a parsed record into the container a caller wants
//! (a CSV string, a Python dict, a JS object, ...). Readers hand the record
//! to the adapter only after parsing succeeded, so adapters never see
//! partial data.

use crate::types::{MesaData, MesaError, Result, MEMORY_ORIGIN};
use crate::writer::write_csv;

/// Converts a parsed record into a caller-chosen output
pub trait RecordAdapter {
    type Output;

    fn adapt(&mut self, data: MesaData) -> Result<Self::Output>;
}

/// Returns the record unchanged
#[derive(Debug, Default, Clone, Copy)]
pub struct KeepRecord;

impl RecordAdapter for KeepRecord {
    type Output = MesaData;

    fn adapt(&mut self, data: MesaData) -> Result<MesaData> {
        Ok(data)
    }
}

/// Renders selected columns as CSV text
#[derive(Debug, Default, Clone)]
pub struct CsvAdapter {
    columns: Vec<String>,
}

impl CsvAdapter {
    /// Export the given columns, in the given order
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Export every column in file order
    pub fn all() -> Self {
        Self::default()
    }
}

impl RecordAdapter for CsvAdapter {
    type Output = String;

    fn adapt(&mut self, data: MesaData) -> Result<String> {
        let names: Vec<&str> = self.columns.iter().map(String::as_str).collect();
        let mut buf = Vec::new();
        write_csv(&data, &names, &mut buf)?;
        String::from_utf8(buf).map_err(|e| MesaError::format(MEMORY_ORIGIN, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;
    use crate::types::RowOrder;

    const DATA: &str = "1\nversion\n1\n\n1 2\nmodel_number log_L\n1 0.5\n2 0.75\n";

    #[test]
    fn test_keep_record() {
        let data = parse_str(DATA, RowOrder::AsStored).unwrap();
        let kept = KeepRecord.adapt(data.clone()).unwrap();
        assert_eq!(kept, data);
    }

    #[test]
    fn test_csv_adapter() {
        let data = parse_str(DATA, RowOrder::AsStored).unwrap();
        let csv = CsvAdapter::new(["log_L"]).adapt(data).unwrap();
        assert_eq!(csv, "log_L\n0.5\n0.75\n");
    }

    #[test]
    fn test_csv_adapter_all_columns() {
        let data = parse_str(DATA, RowOrder::AsStored).unwrap();
        let csv = CsvAdapter::all().adapt(data).unwrap();
        assert!(csv.starts_with("model_number,log_L\n"));
    }
}
