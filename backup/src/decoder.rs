//! The seam to the backup file format parser.
//!
//! The restore core never looks at bytes on disk; it consumes a lazy,
//! finite sequence of [`BackupEntry`] values per file. Decoders are not
//! restartable: re-reading a file requires opening a fresh instance.

use std::path::Path;

use crate::model::BackupEntry;

/// A decoder for one open backup file.
#[async_trait::async_trait]
pub trait BackupDecoder: Send {
    /// Produce the next entry, or `None` at end of file.
    async fn next_entry(&mut self) -> anyhow::Result<Option<BackupEntry>>;
}

/// Opens fresh decoders, one per backup file.
#[async_trait::async_trait]
pub trait DecoderFactory: Send + Sync {
    async fn open(&self, path: &Path) -> anyhow::Result<Box<dyn BackupDecoder>>;
}
