//! Data model of the entries a backup file can contain: records,
//! secondary-index definitions, and UDF modules.

use std::fmt;

/// A single bin value. The decoder maps the on-disk encoding into one of
/// these; richer server types (lists, maps, GeoJSON) are out of scope here.
#[derive(Debug, Clone, PartialEq)]
pub enum BinValue {
    Int(i64),
    Str(String),
    Blob(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    pub name: String,
    pub value: BinValue,
}

/// One record as read from a backup file.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub namespace: String,
    pub set: String,
    pub key: String,

    /// Version counter the cluster uses to detect conflicting writes.
    pub generation: u32,
    /// Void time in epoch milliseconds; `None` means the record never expires.
    pub expires_at_ms: Option<u64>,

    pub bins: Vec<Bin>,

    /// Encoded size the decoder consumed for this record. Feeds the
    /// byte counters and the bandwidth throttle.
    pub byte_size: u64,
}

impl Record {
    /// True when the record carries a void time that has already passed.
    pub fn has_expired(&self, now_ms: u64) -> bool {
        match self.expires_at_ms {
            Some(void_time) => now_ms >= void_time,
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Numeric,
    Str,
}

/// A secondary-index definition discovered while scanning a backup file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDef {
    pub namespace: String,
    pub set: String,
    pub name: String,
    pub bin: String,
    pub kind: IndexKind,
}

impl fmt::Display for IndexDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}:{}", self.namespace, self.set, self.name)
    }
}

/// A UDF module discovered while scanning a backup file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UdfModule {
    pub name: String,
    pub content: Vec<u8>,
}

/// One entry produced by a backup decoder.
#[derive(Debug, Clone, PartialEq)]
pub enum BackupEntry {
    Record(Record),
    Index(IndexDef),
    Udf(UdfModule),
}
