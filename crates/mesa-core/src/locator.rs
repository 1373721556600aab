//! Profile index lookup
//!
//! MESA writes a `profiles.index` file next to the numbered profile files.
//! After a one-line banner, each line holds `model_number priority
//! profile_number`.

use crate::decode::decode_token;
use crate::parser::read_file;
use crate::types::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, trace};

/// Minimum number of columns on an index line
const INDEX_COLUMNS: usize = 3;

/// One line of a profile index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub model_number: i64,
    /// Column 1 of the index; carried along but not used for lookup
    pub priority: i64,
    pub profile_number: i64,
}

impl IndexEntry {
    /// File name of the profile this entry points at
    pub fn profile_file_name(&self) -> String {
        format!("profile{}.data", self.profile_number)
    }
}

/// Parsed profile index, anchored at the directory holding the index file
#[derive(Debug, Clone)]
pub struct ProfileIndex {
    directory: PathBuf,
    entries: Vec<IndexEntry>,
}

impl ProfileIndex {
    /// Load an index file from disk
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| MesaError::access(path, e))?;
        let entries = parse_entries(&content, &path.display().to_string())?;

        let directory = path.parent().map(Path::to_path_buf).unwrap_or_default();
        debug!(entries = entries.len(), "Profile index loaded");

        Ok(Self { directory, entries })
    }

    /// Parse index text; profile paths resolve against `directory`
    pub fn parse_str<P: Into<PathBuf>>(content: &str, directory: P) -> Result<Self> {
        Ok(Self {
            directory: directory.into(),
            entries: parse_entries(content, MEMORY_ORIGIN)?,
        })
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Find the entry for `model_number`.
    ///
    /// The candidate is the entry with the smallest absolute distance to the
    /// requested model, the earliest one on ties. Under
    /// [`MatchPolicy::Exact`] a candidate with a different model number is
    /// rejected.
    pub fn locate(&self, model_number: i64, policy: MatchPolicy) -> Result<&IndexEntry> {
        let entry = self
            .entries
            .iter()
            .enumerate()
            .min_by_key(|(i, e)| (e.model_number.abs_diff(model_number), *i))
            .map(|(_, e)| e)
            .ok_or_else(|| MesaError::format(MEMORY_ORIGIN, "profile index has no entries"))?;

        if policy == MatchPolicy::Exact && entry.model_number != model_number {
            return Err(MesaError::ModelNotFound {
                requested: model_number,
                nearest: entry.model_number,
            });
        }

        debug!(
            requested = model_number,
            model = entry.model_number,
            profile = entry.profile_number,
            "Profile located"
        );
        Ok(entry)
    }

    /// Full path of the profile file for an entry
    pub fn profile_path(&self, entry: &IndexEntry) -> PathBuf {
        self.directory.join(entry.profile_file_name())
    }

    /// Locate and read a profile, zones ordered center-first
    pub fn read_profile(&self, model_number: i64, policy: MatchPolicy) -> Result<MesaData> {
        let entry = self.locate(model_number, policy)?;
        read_file(&self.profile_path(entry), RowOrder::Reversed)
    }
}

fn parse_entries(content: &str, origin: &str) -> Result<Vec<IndexEntry>> {
    let mut entries = Vec::new();

    // Line 1 is a banner
    for (offset, line) in content.lines().enumerate().skip(1) {
        let line_number = offset + 1;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            trace!(line = line_number, "Skipping blank index line");
            continue;
        }
        if tokens.len() < INDEX_COLUMNS {
            return Err(MesaError::format(
                origin,
                format!(
                    "index line {}: found {} columns, expected at least {}",
                    line_number,
                    tokens.len(),
                    INDEX_COLUMNS
                ),
            ));
        }

        let field = |i: usize| -> Result<i64> {
            decode_token(tokens[i]).as_i64().ok_or_else(|| {
                MesaError::format(
                    origin,
                    format!(
                        "index line {}: column {} ('{}') is not an integer",
                        line_number, i, tokens[i]
                    ),
                )
            })
        };

        entries.push(IndexEntry {
            model_number: field(0)?,
            priority: field(1)?,
            profile_number: field(2)?,
        });
    }

    if entries.is_empty() {
        return Err(MesaError::format(origin, "profile index has no entries"));
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = "model prof x\n1 0 10\n5 0 11\n9 0 12\n";

    fn index() -> ProfileIndex {
        ProfileIndex::parse_str(INDEX, "LOGS").unwrap()
    }

    #[test]
    fn test_parse_entries() {
        let idx = index();
        assert_eq!(idx.entries().len(), 3);
        assert_eq!(
            idx.entries()[1],
            IndexEntry {
                model_number: 5,
                priority: 0,
                profile_number: 11
            }
        );
    }

    #[test]
    fn test_exact_match() {
        let idx = index();
        let entry = idx.locate(5, MatchPolicy::Exact).unwrap();
        assert_eq!(entry.profile_number, 11);
        assert_eq!(idx.profile_path(entry), Path::new("LOGS").join("profile11.data"));
    }

    #[test]
    fn test_exact_miss_is_not_found() {
        let err = index().locate(6, MatchPolicy::Exact).unwrap_err();
        match err {
            MesaError::ModelNotFound { requested, nearest } => {
                assert_eq!(requested, 6);
                assert_eq!(nearest, 5);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_nearest_match() {
        let idx = index();
        assert_eq!(idx.locate(6, MatchPolicy::Nearest).unwrap().profile_number, 11);
        assert_eq!(idx.locate(100, MatchPolicy::Nearest).unwrap().profile_number, 12);
        assert_eq!(idx.locate(-4, MatchPolicy::Nearest).unwrap().profile_number, 10);
    }

    #[test]
    fn test_tie_prefers_first_entry() {
        // 3 is equally far from 1 and 5
        assert_eq!(index().locate(3, MatchPolicy::Nearest).unwrap().profile_number, 10);

        let dup = ProfileIndex::parse_str("banner\n7 1 1\n7 2 2\n", "").unwrap();
        assert_eq!(dup.locate(7, MatchPolicy::Exact).unwrap().profile_number, 1);
    }

    #[test]
    fn test_short_line_is_format_error() {
        let err = ProfileIndex::parse_str("banner\n1 0\n", "").unwrap_err();
        assert!(err.to_string().contains("index line 2"));
    }

    #[test]
    fn test_non_integer_is_format_error() {
        let err = ProfileIndex::parse_str("banner\n1 0 1.5\n", "").unwrap_err();
        assert!(err.to_string().contains("not an integer"));
    }

    #[test]
    fn test_empty_index_is_format_error() {
        let err = ProfileIndex::parse_str("banner\n\n", "").unwrap_err();
        assert!(matches!(err, MesaError::Format { .. }));
    }

    #[test]
    fn test_extra_columns_ignored() {
        let idx = ProfileIndex::parse_str("banner\n10 1 3 extra\n", "").unwrap();
        assert_eq!(idx.entries()[0].profile_number, 3);
    }
}
