//! Streaming content digests for downloaded documents.
//!
//! The digest is a pure function of file bytes: the same file always
//! produces the same value, and the value is stored alongside the
//! processed-document row for change detection.

use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// Chunk size for streaming file reads.
const READ_BUFFER_BYTES: usize = 64 * 1024;

/// Computes the hex-encoded SHA-256 digest of a file's contents.
///
/// Streams the file in fixed-size chunks so arbitrarily large
/// documents never need to fit in memory.
///
/// # Errors
///
/// Returns an IO error if the file cannot be opened or read.
pub async fn digest_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; READ_BUFFER_BYTES];

    loop {
        let read = file.read(&mut buffer).await?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Computes the hex-encoded SHA-256 digest of a string.
///
/// Used for digest-derived cache filenames.
#[must_use]
pub fn digest_str(value: &str) -> String {
    hex::encode(Sha256::digest(value.as_bytes()))
}
