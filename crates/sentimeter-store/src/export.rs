use std::path::Path;

use sentimeter_core::ReplyRecord;

use crate::cache::write_atomically;
use crate::codec::write_records_csv;
use crate::error::StoreError;

/// Export a (filtered) record set as CSV at `path`.
///
/// Same columns as the cache files, so an export can be read back with
/// [`crate::read_records_csv`]. The file is replaced atomically.
///
/// # Errors
///
/// [`StoreError::Io`] or [`StoreError::Csv`] if the file cannot be written.
pub fn export_csv(path: &Path, records: &[ReplyRecord]) -> Result<(), StoreError> {
    write_atomically(path, |w| write_records_csv(w, records))?;
    tracing::info!(path = %path.display(), records = records.len(), "exported replies");
    Ok(())
}
