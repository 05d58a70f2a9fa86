//! Looking for a fragment across many saved drawings at once.
//!
//! Files are loaded independently on the rayon pool, each into its own
//! [`Document`], and checked for any molecule containing the pattern.

use std::io;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::document::Document;
use crate::mol::Molecule;
use crate::substruct::{has_match, MatchOptions};

/// File extensions loaded by [`search_directory`]. SVG exports embed the
/// drawing as CDML.
pub const SEARCHED_EXTENSIONS: &[&str] = &["cdml", "svg"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchReport {
    /// Files that were attempted.
    pub searched: usize,
    /// Files with at least one molecule containing the pattern, in input
    /// order.
    pub matches: Vec<PathBuf>,
    /// Files that could not be loaded, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

enum Outcome {
    Match,
    NoMatch,
    Failed(String),
}

fn search_file(path: &Path, pattern: &Molecule, options: MatchOptions) -> Outcome {
    match Document::load(path) {
        Ok(doc) => {
            if doc.molecules().any(|(_, mol)| has_match(mol, pattern, options)) {
                Outcome::Match
            } else {
                Outcome::NoMatch
            }
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable file");
            Outcome::Failed(e.to_string())
        }
    }
}

pub fn search_paths<P>(paths: &[P], pattern: &Molecule, options: MatchOptions) -> SearchReport
where
    P: AsRef<Path> + Sync,
{
    let outcomes: Vec<(PathBuf, Outcome)> = paths
        .par_iter()
        .map(|p| {
            let path = p.as_ref();
            (path.to_path_buf(), search_file(path, pattern, options))
        })
        .collect();

    let mut report = SearchReport {
        searched: outcomes.len(),
        ..SearchReport::default()
    };
    for (path, outcome) in outcomes {
        match outcome {
            Outcome::Match => report.matches.push(path),
            Outcome::NoMatch => {}
            Outcome::Failed(reason) => report.failed.push((path, reason)),
        }
    }
    tracing::debug!(
        searched = report.searched,
        matching = report.matches.len(),
        failed = report.failed.len(),
        "fragment search finished"
    );
    report
}

/// Searches every `.cdml` and `.svg` file directly inside `dir`, in file
/// name order.
/// Subdirectories are not entered.
pub fn search_directory(
    dir: impl AsRef<Path>,
    pattern: &Molecule,
    options: MatchOptions,
) -> io::Result<SearchReport> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let searched = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| SEARCHED_EXTENSIONS.contains(&e));
        if searched && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(search_paths(&paths, pattern, options))
}
