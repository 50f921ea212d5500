//! Identity and group roster loading
//!
//! Builds a [`Directory`] from the optional members (`group,id,name`) and
//! people (`id,name`) files. Both files are small lookup tables, so they are
//! read eagerly. Malformed rows are logged and skipped; they never fail the
//! query.

use crate::core::Directory;
use crate::io::csv_format::{CsvMemberRecord, CsvPersonRecord};
use crate::types::SettlementError;
use csv::{ReaderBuilder, Trim};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::path::Path;

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, SettlementError> {
    let file = File::open(path).map_err(|e| SettlementError::open_failed(path, e))?;
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(file);

    let mut rows = Vec::new();
    for row in reader.deserialize::<T>() {
        match row {
            Ok(row) => rows.push(row),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping malformed roster row")
            }
        }
    }
    Ok(rows)
}

/// Load a directory from the optional roster files
///
/// With neither file the directory is empty and every name resolves to
/// "Unknown".
///
/// # Errors
///
/// `FileNotFound` or `IoError` if a given file cannot be opened.
pub fn load_directory(
    members: Option<&Path>,
    people: Option<&Path>,
) -> Result<Directory, SettlementError> {
    let mut directory = Directory::new();

    if let Some(path) = members {
        let rows: Vec<CsvMemberRecord> = read_rows(path)?;
        tracing::debug!(path = %path.display(), rows = rows.len(), "loaded group roster");
        for row in rows.into_iter().filter(|row| !row.group.is_empty() && !row.id.is_empty()) {
            directory.add_member(row.group, row.id, row.name);
        }
    }

    if let Some(path) = people {
        let rows: Vec<CsvPersonRecord> = read_rows(path)?;
        tracing::debug!(path = %path.display(), rows = rows.len(), "loaded identities");
        for row in rows.into_iter().filter(|row| !row.id.is_empty()) {
            directory.add_identity(row.id, row.name);
        }
    }

    Ok(directory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_load_without_files() {
        let directory = load_directory(None, None).unwrap();
        assert!(!directory.has_roster());
        assert_eq!(directory.resolve("a").name, "Unknown");
    }

    #[test]
    fn test_load_members_and_people() {
        let members = create_temp_csv("group,id,name\ntrip,a,Al\ntrip,b,Bob\nflat,a,Al\n");
        let people = create_temp_csv("id,name\na,Alice\n");

        let directory = load_directory(Some(members.path()), Some(people.path())).unwrap();

        assert_eq!(directory.member_count("trip"), 2);
        assert_eq!(directory.member_count("flat"), 1);
        assert_eq!(directory.resolve("a").name, "Alice");
        assert_eq!(directory.resolve("b").name, "Bob");
    }

    #[test]
    fn test_load_skips_malformed_rows() {
        let members = create_temp_csv("group,id,name\ntrip\n,b,Bob\ntrip,c,Carol\n");

        let directory = load_directory(Some(members.path()), None).unwrap();

        assert_eq!(directory.member_count("trip"), 1);
        assert_eq!(directory.resolve("c").name, "Carol");
        assert_eq!(directory.resolve("b").name, "Unknown");
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_directory(None, Some(Path::new("no_such_people.csv")));
        assert_eq!(
            result.unwrap_err(),
            SettlementError::FileNotFound {
                path: "no_such_people.csv".to_string()
            }
        );
    }
}
