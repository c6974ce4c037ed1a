use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use super::contents::StoreContents;
use crate::error::StoreError;

pub const FORMAT_VERSION: u32 = 1;

#[derive(Deserialize)]
struct Snapshot {
    version: u32,
    #[serde(flatten)]
    contents: StoreContents,
}

/// Write `contents` to `path` through a temp file in the same directory,
/// so a crash mid-write never leaves a truncated store behind.
pub fn save(path: &Path, contents: &StoreContents) -> Result<(), StoreError> {
    let parent_dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent_dir)?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        serde_json::to_writer(
            &mut writer,
            &SnapshotRef {
                version: FORMAT_VERSION,
                contents,
            },
        )?;
        writer.flush()?;
    }
    temp_file.as_file().sync_all()?;

    temp_file.persist(path).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}

/// Read a snapshot. A missing file is an empty store.
pub fn load(path: &Path) -> Result<StoreContents, StoreError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("No store at {:?}, starting empty", path);
            return Ok(StoreContents::default());
        }
        Err(e) => return Err(e.into()),
    };

    let snapshot: Snapshot = serde_json::from_reader(BufReader::new(file))?;
    if snapshot.version != FORMAT_VERSION {
        return Err(StoreError::UnsupportedVersion {
            found: snapshot.version,
            expected: FORMAT_VERSION,
        });
    }

    Ok(snapshot.contents)
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    #[serde(flatten)]
    contents: &'a StoreContents,
}
