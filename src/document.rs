//! Loading and saving entity documents on disk.
//!
//! Files are opened only for the duration of a call and closed on every exit
//! path. Saves go through a temporary file in the destination directory that
//! is renamed over the target once fully written, so a failed save leaves the
//! previous document in place.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::codec::Codec;
use crate::error::{Error, Result};
use crate::models::Collection;

/// Load a document with the default tags.
pub fn load(path: impl AsRef<Path>) -> Result<Collection> {
    load_with(&Codec::default(), path)
}

pub fn load_with(codec: &Codec, path: impl AsRef<Path>) -> Result<Collection> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::unavailable(path, e))?;
    tracing::debug!(path = %path.display(), "loading entity document");

    let collection = codec.decode_reader(BufReader::new(file))?;
    tracing::debug!(
        path = %path.display(),
        groups = collection.len(),
        records = collection.record_count(),
        "loaded entity document"
    );
    Ok(collection)
}

/// Save a document with the default tags, replacing `path` atomically.
pub fn save(path: impl AsRef<Path>, collection: &Collection) -> Result<()> {
    save_with(&Codec::default(), path, collection)
}

pub fn save_with(codec: &Codec, path: impl AsRef<Path>, collection: &Collection) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::unavailable(path, e))?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        codec.encode_writer(&mut writer, collection)?;
        writer.flush().map_err(|e| Error::unavailable(path, e))?;
    }
    tmp.as_file()
        .sync_all()
        .map_err(|e| Error::unavailable(path, e))?;
    tmp.persist(path)
        .map_err(|e| Error::unavailable(path, e.error))?;

    tracing::info!(
        path = %path.display(),
        groups = collection.len(),
        records = collection.record_count(),
        "saved entity document"
    );
    Ok(())
}
