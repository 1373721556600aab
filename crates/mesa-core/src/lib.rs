//! # MESA Data Reader - Core Library
//!
//! A library for reading the text output of the MESA stellar evolution code.
//!
//! ## Supported Files
//!
//! - History files (`history.data`): one row per model/timestep
//! - Profile files (`profileN.data`): one row per zone, read center-first
//! - Profile indexes (`profiles.index`): model number to profile lookup
//!
//! ## Features
//!
//! - Fortran number forms (`1.5D+02`, `1.234-156`) decoded transparently
//! - Header scalars and body columns merged into one ordered record
//! - Exact or nearest model-number profile lookup
//! - CSV export and MESA layout re-serialization
//! - Structured logging via `tracing` for diagnostics
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mesa_core::{read_history, Field};
//!
//! let history = read_history("LOGS/history.data").unwrap();
//! println!("Models: {}", history.len());
//!
//! if let Some(Field::Column(log_l)) = history.get("log_L") {
//!     println!("First log_L: {}", log_l[0]);
//! }
//! ```
//!
//! ## Profiles by Model Number
//!
//! ```rust,no_run
//! use mesa_core::{find_read_profile, MatchPolicy};
//!
//! let profile = find_read_profile("LOGS/profiles.index", 300, MatchPolicy::Nearest).unwrap();
//! println!("Zones: {}", profile.len());
//! ```
//!
//! ## Enabling Logging
//!
//! This library uses `tracing` for structured logging. To see log output,
//! initialize a tracing subscriber in your application:
//!
//! ```rust,ignore
//! tracing_subscriber::fmt::init();
//! let history = mesa_core::read_history("history.data").unwrap();
//! ```

mod adapter;
mod decode;
mod locator;
mod parser;
mod types;
mod writer;

use std::path::Path;

// Re-export public types
pub use types::{
    // Record types
    Column,
    Field,
    // Lookup and ordering
    MatchPolicy,
    MesaData,
    // Error types
    MesaError,
    Result,
    RowOrder,
    Value,
    // Constants
    COLUMN_NAMES_LINE,
    HEADER_LINES,
    HEADER_NAMES_LINE,
    HEADER_VALUES_LINE,
    MEMORY_ORIGIN,
    VERSION,
};

pub use adapter::{CsvAdapter, KeepRecord, RecordAdapter};
pub use decode::{decode_line, decode_token};
pub use locator::{IndexEntry, ProfileIndex};
pub use parser::{parse_bytes, parse_str};
pub use writer::{write_csv, write_csv_file, write_mesa, write_mesa_file};

// ============================================================================
// Public API Functions
// ============================================================================

/// Read a MESA data file with an explicit row order.
///
/// # Arguments
/// * `path` - Path to a history or profile file
/// * `order` - Whether body rows keep file order or are reversed
///
/// # Returns
/// * `Ok(MesaData)` - Header fields and columns
/// * `Err(MesaError)` - If the file cannot be read or its layout is broken
pub fn read<P: AsRef<Path>>(path: P, order: RowOrder) -> Result<MesaData> {
    parser::read_file(path.as_ref(), order)
}

/// Read a history file; rows stay in chronological (file) order.
///
/// # Example
/// ```rust,no_run
/// let history = mesa_core::read_history("history.data").unwrap();
/// let ages = history.column("star_age").and_then(|c| c.to_f64());
/// ```
pub fn read_history<P: AsRef<Path>>(path: P) -> Result<MesaData> {
    parser::read_file(path.as_ref(), RowOrder::AsStored)
}

/// Read a profile file; zones are reversed so the center comes first.
pub fn read_profile<P: AsRef<Path>>(path: P) -> Result<MesaData> {
    parser::read_file(path.as_ref(), RowOrder::Reversed)
}

/// Find the profile for a model number through a profile index and read it.
///
/// # Arguments
/// * `index_path` - Path to `profiles.index`; profile files are resolved in
///   the same directory
/// * `model_number` - Requested model number
/// * `policy` - `Exact` fails with [`MesaError::ModelNotFound`] when the model
///   is absent, `Nearest` reads the closest model instead
pub fn find_read_profile<P: AsRef<Path>>(
    index_path: P,
    model_number: i64,
    policy: MatchPolicy,
) -> Result<MesaData> {
    ProfileIndex::load(index_path)?.read_profile(model_number, policy)
}

/// Read a history file and pass the record through an adapter
pub fn read_history_with<P, A>(path: P, adapter: &mut A) -> Result<A::Output>
where
    P: AsRef<Path>,
    A: RecordAdapter,
{
    adapter.adapt(read_history(path)?)
}

/// Read a profile file and pass the record through an adapter
pub fn read_profile_with<P, A>(path: P, adapter: &mut A) -> Result<A::Output>
where
    P: AsRef<Path>,
    A: RecordAdapter,
{
    adapter.adapt(read_profile(path)?)
}

/// Locate and read a profile, then pass the record through an adapter
pub fn find_read_profile_with<P, A>(
    index_path: P,
    model_number: i64,
    policy: MatchPolicy,
    adapter: &mut A,
) -> Result<A::Output>
where
    P: AsRef<Path>,
    A: RecordAdapter,
{
    adapter.adapt(find_read_profile(index_path, model_number, policy)?)
}
