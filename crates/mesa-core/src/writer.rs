//! CSV export and MESA layout writer

use crate::types::{Column, MesaData, MesaError, Result, RowOrder};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Width of one field in the MESA layout
const MESA_FIELD_WIDTH: usize = 40;

// ============================================================================
// CSV
// ============================================================================

/// Resolve a column selection; an empty selection means every column
fn select_columns<'a>(data: &'a MesaData, names: &[&str]) -> Result<Vec<&'a Column>> {
    if names.is_empty() {
        return Ok(data.columns().iter().collect());
    }
    names
        .iter()
        .map(|&name| {
            data.column(name)
                .ok_or_else(|| MesaError::MissingColumn(name.to_string()))
        })
        .collect()
}

/// Write selected columns as CSV: a header row of column names, then one
/// line per row. Nothing is written if a selected column is missing.
pub fn write_csv<W: Write>(data: &MesaData, columns: &[&str], writer: &mut W) -> Result<()> {
    let selected = select_columns(data, columns)?;

    let mut csv_writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(writer);

    csv_writer
        .write_record(selected.iter().map(|c| c.name.as_str()))
        .map_err(io::Error::from)?;

    for row in 0..data.len() {
        csv_writer
            .write_record(selected.iter().map(|c| c.values[row].to_string()))
            .map_err(io::Error::from)?;
    }
    csv_writer.flush()?;

    Ok(())
}

/// Write selected columns to a CSV file
#[instrument(skip_all, fields(output = %path.as_ref().display()))]
pub fn write_csv_file<P: AsRef<Path>>(data: &MesaData, columns: &[&str], path: P) -> Result<()> {
    let path = path.as_ref();
    // Fail on a bad selection before creating the file
    select_columns(data, columns)?;

    let file = File::create(path).map_err(|e| MesaError::access(path, e))?;
    let mut writer = BufWriter::new(file);
    write_csv(data, columns, &mut writer)?;
    writer.flush()?;

    info!(rows = data.len(), "CSV written");
    Ok(())
}

// ============================================================================
// MESA layout
// ============================================================================

fn write_fields<W, I, T>(writer: &mut W, fields: I) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = T>,
    T: std::fmt::Display,
{
    for field in fields {
        // Leading space keeps over-long fields separated
        let text = field.to_string();
        write!(writer, " {:>width$}", text, width = MESA_FIELD_WIDTH - 1)?;
    }
    writeln!(writer)?;
    Ok(())
}

/// Serialize a record back into the six-line MESA layout.
///
/// Pass the order the record was parsed with; re-parsing the output with
/// that order yields an identical record.
pub fn write_mesa<W: Write>(data: &MesaData, order: RowOrder, writer: &mut W) -> Result<()> {
    let header = data.header();
    let columns = data.columns();

    write_fields(writer, 1..=header.len())?;
    write_fields(writer, header.iter().map(|(name, _)| name))?;
    write_fields(writer, header.iter().map(|(_, value)| value))?;
    writeln!(writer)?;
    write_fields(writer, 1..=columns.len())?;
    write_fields(writer, columns.iter().map(|c| &c.name))?;

    let rows: Box<dyn Iterator<Item = usize>> = match order {
        RowOrder::AsStored => Box::new(0..data.len()),
        RowOrder::Reversed => Box::new((0..data.len()).rev()),
    };
    for row in rows {
        write_fields(writer, columns.iter().map(|c| &c.values[row]))?;
    }

    debug!(rows = data.len(), columns = columns.len(), "MESA layout written");
    Ok(())
}

/// Serialize a record to a file in the MESA layout
#[instrument(skip_all, fields(output = %path.as_ref().display(), order = ?order))]
pub fn write_mesa_file<P: AsRef<Path>>(data: &MesaData, order: RowOrder, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| MesaError::access(path, e))?;
    let mut writer = BufWriter::new(file);
    write_mesa(data, order, &mut writer)?;
    writer.flush()?;
    Ok(())
}
