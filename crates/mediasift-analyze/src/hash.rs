//! Content fingerprinting.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use mediasift_core::{Error, Fingerprint, Result};

/// Read buffer size for streaming hashes.
const HASH_BUF_SIZE: usize = 128 * 1024;

/// Computes BLAKE3 content fingerprints.
///
/// Stateless and `Copy`, so it is safe to invoke concurrently for
/// different paths. Files are streamed through a fixed buffer; memory use
/// is bounded regardless of file size.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentHasher;

impl ContentHasher {
    /// Create a new hasher.
    pub fn new() -> Self {
        Self
    }

    /// Hash the full content of the file at `path`.
    ///
    /// Identical bytes yield identical fingerprints regardless of path or
    /// name. Errors carry the path; callers inside a batch convert them to
    /// "unknown content" rather than aborting.
    pub fn hash(&self, path: &Path) -> Result<Fingerprint> {
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let mut reader = BufReader::new(file);
        let mut hasher = blake3::Hasher::new();

        let mut buf = [0u8; HASH_BUF_SIZE];
        loop {
            let read = reader.read(&mut buf).map_err(|e| Error::io(path, e))?;
            if read == 0 {
                break;
            }
            hasher.update(&buf[..read]);
        }

        Ok(Fingerprint::new(*hasher.finalize().as_bytes()))
    }
}
