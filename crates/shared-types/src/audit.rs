//! Content fingerprints for checkpoint audit trails

use sha2::{Digest, Sha256};
use std::io;
use std::path::Path;

/// Compute SHA-256 hash of document bytes
pub fn hash_document(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Hash the file at `path`
pub fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(hash_document(&bytes))
}
