use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

pub const CHUNK_SIZE: usize = 256 * 1024;

/// Hex encoded SHA-256 of the file contents, read in fixed-size chunks.
pub fn calculate_hash(path: &Path) -> io::Result<String> {
    let file = File::open(path)?;
    hash_reader(file)
}

pub fn hash_reader(mut reader: impl Read) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];
    loop {
        let count = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..count]);
    }
    Ok(hex::encode(hasher.finalize()))
}
