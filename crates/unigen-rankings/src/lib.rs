// SPDX-FileCopyrightText: 2026 Unigen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Static ranking tables and program lists, loaded from CSV files.
//!
//! The data directory holds one CSV per ranking publication (the file stem
//! is the source label, e.g. `2024 QS News.csv`) with `university,rank`
//! columns, plus an optional `programs.csv` with `university,program` rows.
//! Lookups match by case-insensitive substring and demand exactly one
//! matching university, so "University of Toronto" never silently picks up
//! its Mississauga campus.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};
use unigen_core::UnigenError;

const PROGRAMS_FILE_STEM: &str = "programs";

#[derive(Debug, Deserialize)]
struct RankRow {
    university: String,
    rank: String,
}

#[derive(Debug, Deserialize)]
struct ProgramRow {
    university: String,
    program: String,
}

/// One ranking publication.
#[derive(Debug, Clone)]
pub struct RankingTable {
    /// Source label, taken from the file stem.
    pub label: String,
    rows: Vec<(String, String)>,
}

impl RankingTable {
    fn from_csv(label: String, path: &Path) -> Result<Self, UnigenError> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| {
            UnigenError::Internal(format!("cannot read ranking table {}: {e}", path.display()))
        })?;
        let mut rows = Vec::new();
        for record in reader.deserialize::<RankRow>() {
            let row = record.map_err(|e| {
                UnigenError::Internal(format!("bad row in {}: {e}", path.display()))
            })?;
            rows.push((row.university, row.rank));
        }
        Ok(Self { label, rows })
    }

    /// Rank of the named university, or `None` when absent or ambiguous.
    pub fn lookup(&self, university_name: &str) -> Option<&str> {
        unique_match(self.rows.iter(), university_name).map(|(_, rank)| rank.as_str())
    }
}

/// All ranking tables plus the program list from one data directory.
#[derive(Debug, Clone, Default)]
pub struct RankingStore {
    tables: Vec<RankingTable>,
    programs: Vec<(String, String)>,
    data_dir: PathBuf,
}

impl RankingStore {
    /// Loads every CSV in `data_dir`. A missing directory yields an empty
    /// store (rankings are optional data), a malformed CSV is an error.
    pub fn load(data_dir: impl Into<PathBuf>) -> Result<Self, UnigenError> {
        let data_dir = data_dir.into();
        if !data_dir.is_dir() {
            warn!(dir = %data_dir.display(), "ranking data directory missing, tables disabled");
            return Ok(Self {
                data_dir,
                ..Self::default()
            });
        }

        let mut tables = Vec::new();
        let mut programs = Vec::new();
        let mut entries: Vec<PathBuf> = fs::read_dir(&data_dir)
            .map_err(|e| {
                UnigenError::Internal(format!("cannot list {}: {e}", data_dir.display()))
            })?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "csv"))
            .collect();
        entries.sort();

        for path in entries {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            if stem == PROGRAMS_FILE_STEM {
                programs = load_programs(&path)?;
            } else {
                tables.push(RankingTable::from_csv(stem, &path)?);
            }
        }

        debug!(
            tables = tables.len(),
            programs = programs.len(),
            dir = %data_dir.display(),
            "ranking data loaded"
        );
        Ok(Self {
            tables,
            programs,
            data_dir,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.programs.is_empty()
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Source-labelled ranking lines for a university, one per table that
    /// lists it, formatted `<label> |<rank>`.
    pub fn ranking_lines(&self, university_name: &str) -> Vec<String> {
        self.tables
            .iter()
            .filter_map(|table| {
                table
                    .lookup(university_name)
                    .map(|rank| format!("{} |{rank}", table.label))
            })
            .collect()
    }

    /// Popular programs for a university, in file order.
    ///
    /// Program matching keeps every row whose university is the unique
    /// substring match for the query.
    pub fn programs(&self, university_name: &str) -> Vec<String> {
        let Some((matched, _)) = unique_match(self.programs.iter(), university_name) else {
            return Vec::new();
        };
        let matched = matched.clone();
        self.programs
            .iter()
            .filter(|(uni, _)| *uni == matched)
            .map(|(_, program)| program.clone())
            .collect()
    }
}

fn load_programs(path: &Path) -> Result<Vec<(String, String)>, UnigenError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| {
        UnigenError::Internal(format!("cannot read program list {}: {e}", path.display()))
    })?;
    let mut rows = Vec::new();
    for record in reader.deserialize::<ProgramRow>() {
        let row =
            record.map_err(|e| UnigenError::Internal(format!("bad row in {}: {e}", path.display())))?;
        rows.push((row.university, row.program));
    }
    Ok(rows)
}

/// Case-insensitive substring match over `(university, value)` rows that
/// demands exactly one distinct matching university.
fn unique_match<'a, I>(rows: I, university_name: &str) -> Option<&'a (String, String)>
where
    I: Iterator<Item = &'a (String, String)>,
{
    let needle = university_name.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    let mut found: Option<&(String, String)> = None;
    for row in rows {
        let hay = row.0.to_lowercase();
        if hay.contains(&needle) || needle.contains(&hay) {
            match found {
                // Repeated rows for the same university are fine.
                Some(prev) if prev.0.eq_ignore_ascii_case(&row.0) => {}
                Some(_) => return None,
                None => found = Some(row),
            }
        }
    }
    found
}
