//! Staging directory scan: pair `<name>.txt` with `<name>.pdf`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::ImportError;

/// A text/source pair ready to import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedReceipt {
    pub basename: String,
    pub text: PathBuf,
    pub source: PathBuf,
}

/// Result of scanning the staging directory.
#[derive(Debug, Clone, Default)]
pub struct StagingBatch {
    /// Complete pairs, ordered by basename.
    pub receipts: Vec<StagedReceipt>,
    /// Files whose counterpart is missing. They stay where they are.
    pub unpaired: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Text,
    Source,
}

/// Split `name` into its kind and basename.
///
/// Extensions match case-insensitively; the basename keeps its case.
fn classify(name: &str) -> Option<(FileKind, &str)> {
    let split = name.len().checked_sub(4)?;
    if !name.is_char_boundary(split) {
        return None;
    }
    let (basename, ext) = name.split_at(split);
    if ext.eq_ignore_ascii_case(".txt") {
        Some((FileKind::Text, basename))
    } else if ext.eq_ignore_ascii_case(".pdf") {
        Some((FileKind::Source, basename))
    } else {
        None
    }
}

fn insert_unique(
    files: &mut BTreeMap<String, String>,
    basename: &str,
    name: &str,
) -> Result<(), ImportError> {
    if let Some(first) = files.insert(basename.to_string(), name.to_string()) {
        return Err(ImportError::ExtensionConflict {
            basename: basename.to_string(),
            first,
            second: name.to_string(),
        });
    }
    Ok(())
}

/// Scan `dir` for receipt pairs.
///
/// Two files with the same basename and kind (`a.txt`, `a.TXT`) are a
/// conflict and fail the whole scan.
pub fn scan_staging(dir: &Path) -> Result<StagingBatch, ImportError> {
    let staging_err = |source| ImportError::Staging {
        path: dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(staging_err)? {
        let entry = entry.map_err(staging_err)?;
        if !entry.file_type().map_err(staging_err)?.is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(name) => warn!("Ignoring non UTF-8 file name {:?}", name),
        }
    }
    names.sort();

    let mut texts = BTreeMap::new();
    let mut sources = BTreeMap::new();
    for name in &names {
        match classify(name) {
            Some((FileKind::Text, basename)) => insert_unique(&mut texts, basename, name)?,
            Some((FileKind::Source, basename)) => insert_unique(&mut sources, basename, name)?,
            None => debug!("Ignoring staged file {}", name),
        }
    }

    let mut batch = StagingBatch::default();
    for (basename, text_name) in &texts {
        match sources.remove(basename) {
            Some(source_name) => batch.receipts.push(StagedReceipt {
                basename: basename.clone(),
                text: dir.join(text_name),
                source: dir.join(source_name),
            }),
            None => {
                warn!("{} exists but PDF is missing. Skipping!", text_name);
                batch.unpaired.push(dir.join(text_name));
            }
        }
    }
    for source_name in sources.values() {
        warn!("{} exists but TXT is missing. Skipping!", source_name);
        batch.unpaired.push(dir.join(source_name));
    }

    Ok(batch)
}
