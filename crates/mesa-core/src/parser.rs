//! MESA history/profile file parser
//!
//! Both file kinds share one layout:
//!
//! ```text
//! line 1   column numbers for the header block (ignored)
//! line 2   header field names
//! line 3   header field values
//! line 4   blank (ignored)
//! line 5   column numbers for the body (ignored)
//! line 6   body column names
//! line 7+  one row per model (history) or zone (profile)
//! ```

use crate::decode::{decode_line, decode_token};
use crate::types::*;
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info, instrument, trace};

// ============================================================================
// Entry points
// ============================================================================

/// Read and parse a file from disk.
///
/// The file is memory-mapped for the duration of the call; the mapping and
/// handle are released before returning, on success and on error.
#[instrument(skip_all, fields(path = %path.display(), order = ?order))]
pub fn read_file(path: &Path, order: RowOrder) -> Result<MesaData> {
    let origin = path.display().to_string();

    let file = File::open(path).map_err(|e| MesaError::access(path, e))?;
    let size = file
        .metadata()
        .map_err(|e| MesaError::access(path, e))?
        .len();

    // Zero-length files cannot be mapped on every platform
    if size == 0 {
        return parse_content("", order, &origin);
    }

    let mmap = unsafe { Mmap::map(&file) }.map_err(|e| MesaError::access(path, e))?;
    debug!(bytes = mmap.len(), "File mapped");

    let data = parse_bytes_from(&mmap, order, &origin)?;

    info!(
        header_fields = data.header().len(),
        columns = data.columns().len(),
        rows = data.len(),
        "File parsed"
    );
    Ok(data)
}

/// Parse file contents held in memory
pub fn parse_bytes(bytes: &[u8], order: RowOrder) -> Result<MesaData> {
    parse_bytes_from(bytes, order, MEMORY_ORIGIN)
}

/// Parse file contents held in a string
pub fn parse_str(content: &str, order: RowOrder) -> Result<MesaData> {
    parse_content(content, order, MEMORY_ORIGIN)
}

fn parse_bytes_from(bytes: &[u8], order: RowOrder, origin: &str) -> Result<MesaData> {
    let content = std::str::from_utf8(bytes).map_err(|e| {
        MesaError::format(origin, format!("not valid UTF-8 text: {}", e))
    })?;
    parse_content(content, order, origin)
}

// ============================================================================
// Layout parsing
// ============================================================================

fn parse_content(content: &str, order: RowOrder, origin: &str) -> Result<MesaData> {
    let mut lines = content.lines();

    let mut structural = [""; HEADER_LINES];
    for (i, slot) in structural.iter_mut().enumerate() {
        *slot = lines.next().ok_or_else(|| {
            MesaError::format(
                origin,
                format!(
                    "truncated header: expected {} structural lines, found {}",
                    HEADER_LINES, i
                ),
            )
        })?;
    }

    let header = parse_header(
        structural[HEADER_NAMES_LINE],
        structural[HEADER_VALUES_LINE],
        origin,
    )?;

    let column_names: Vec<&str> = structural[COLUMN_NAMES_LINE].split_whitespace().collect();
    let num_columns = column_names.len();

    let mut vectors: Vec<Vec<Value>> = vec![Vec::new(); num_columns];
    let mut row: Vec<Value> = Vec::with_capacity(num_columns);
    let mut num_rows = 0usize;

    for (offset, line) in lines.enumerate() {
        let line_number = HEADER_LINES + offset + 1;

        if line.trim().is_empty() {
            trace!(line = line_number, "Blank line ends data");
            break;
        }

        row.clear();
        row.extend(line.split_whitespace().map(decode_token));

        if row.len() != num_columns {
            return Err(MesaError::format(
                origin,
                format!(
                    "line {}: found {} values, expected {} (one per column)",
                    line_number,
                    row.len(),
                    num_columns
                ),
            ));
        }

        for (vector, value) in vectors.iter_mut().zip(row.drain(..)) {
            vector.push(value);
        }
        num_rows += 1;
    }

    if order == RowOrder::Reversed {
        for vector in &mut vectors {
            vector.reverse();
        }
    }

    let columns = column_names
        .into_iter()
        .zip(vectors)
        .map(|(name, values)| Column {
            name: name.to_string(),
            values,
        })
        .collect();

    Ok(MesaData::new(header, columns, num_rows))
}

/// Pair header names with their decoded values
fn parse_header(names_line: &str, values_line: &str, origin: &str) -> Result<Vec<(String, Value)>> {
    let names: Vec<&str> = names_line.split_whitespace().collect();
    let values = decode_line(values_line);

    if names.len() != values.len() {
        return Err(MesaError::format(
            origin,
            format!(
                "header has {} names but {} values",
                names.len(),
                values.len()
            ),
        ));
    }

    Ok(names
        .into_iter()
        .map(str::to_string)
        .zip(values)
        .collect())
}
