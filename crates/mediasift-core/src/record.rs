//! Media record types.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Coarse classification of a media file, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    /// Still image (jpg, png, ...).
    Image,
    /// Video (mp4, mkv, ...).
    Video,
    /// Anything else; rejected by the loader as unsupported.
    Unknown,
}

impl MediaKind {
    /// Check if this kind is a recognized media kind.
    pub fn is_media(&self) -> bool {
        matches!(self, MediaKind::Image | MediaKind::Video)
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Video => write!(f, "video"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// BLAKE3 content digest used as the duplicate-grouping key.
///
/// Equality is byte equality; `to_hex` always renders lowercase, so the
/// digest has a single canonical textual form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(pub [u8; 32]);

impl Fingerprint {
    /// Create a new Fingerprint from raw digest bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the fingerprint as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// One tracked media file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRecord {
    /// Absolute path of the file.
    pub path: PathBuf,

    /// File name (not full path), cached at construction. Within a load
    /// batch this is the identity key for collision checks.
    pub name: CompactString,

    /// Kind derived from the extension at load time; immutable thereafter.
    pub kind: MediaKind,

    /// Byte length at load time.
    pub size: u64,

    /// Creation time at load time (platform-dependent, may be absent).
    pub created_at: Option<SystemTime>,

    /// Content fingerprint; absent until computed, set-once afterwards.
    fingerprint: Option<Fingerprint>,

    /// Derived flag: this record's (kind, fingerprint) group has 2+ members.
    /// Recomputed on every detection pass.
    pub is_duplicate: bool,
}

impl MediaRecord {
    /// Create a new record for a file at `path`.
    pub fn new(
        path: impl Into<PathBuf>,
        kind: MediaKind,
        size: u64,
        created_at: Option<SystemTime>,
    ) -> Self {
        let path = path.into();
        let name = file_name_of(&path);
        Self {
            path,
            name,
            kind,
            size,
            created_at,
            fingerprint: None,
            is_duplicate: false,
        }
    }

    /// Get the content fingerprint, if one has been computed.
    pub fn fingerprint(&self) -> Option<&Fingerprint> {
        self.fingerprint.as_ref()
    }

    /// Check whether a fingerprint has been computed.
    pub fn has_fingerprint(&self) -> bool {
        self.fingerprint.is_some()
    }

    /// Record a computed fingerprint. Once set, the fingerprint is never
    /// overwritten; later calls are ignored.
    pub fn set_fingerprint(&mut self, fingerprint: Fingerprint) {
        if self.fingerprint.is_none() {
            self.fingerprint = Some(fingerprint);
        }
    }
}

/// Extract the final component of `path` as a name, falling back to the
/// whole path when there is none (e.g. `..`).
pub(crate) fn file_name_of(path: &Path) -> CompactString {
    path.file_name()
        .map(|n| CompactString::from(n.to_string_lossy()))
        .unwrap_or_else(|| CompactString::from(path.to_string_lossy()))
}
