//! BLAKE3 content fingerprints.
//!
//! Small files are always hashed whole. Above [`SAMPLE_THRESHOLD`] the quick
//! mode hashes only the first and last [`SAMPLE_SIZE`] bytes followed by the
//! decimal file size, so two equal-size files that differ only in the middle
//! get the same quick fingerprint.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use blake3::Hasher;

use homesweep_core::{Fingerprint, HashMode};

/// Files at or below this size are always hashed in full.
pub const SAMPLE_THRESHOLD: u64 = 8192;

/// Bytes taken from each end of a file in quick mode.
pub const SAMPLE_SIZE: usize = 4096;

const CHUNK_SIZE: usize = 64 * 1024;

/// Above this size full-mode hashing goes through a memory map.
const MMAP_THRESHOLD: u64 = 128 * 1024;

/// Above this size the memory-mapped hash is also split across threads.
const PARALLEL_THRESHOLD: u64 = 64 * 1024 * 1024;

/// Fingerprint the file at `path`.
///
/// Any I/O error is returned to the caller, who drops the file from its
/// duplicate group.
pub fn fingerprint_file(path: &Path, mode: HashMode) -> io::Result<Fingerprint> {
    let mut file = File::open(path)?;
    let size = file.metadata()?.len();

    let mut hasher = Hasher::new();
    if size <= SAMPLE_THRESHOLD {
        hash_stream(&mut hasher, &mut file)?;
    } else {
        match mode {
            HashMode::Quick => hash_sample(&mut hasher, &mut file, size)?,
            HashMode::Full if size > PARALLEL_THRESHOLD => {
                hasher.update_mmap_rayon(path)?;
            }
            HashMode::Full if size > MMAP_THRESHOLD => {
                hasher.update_mmap(path)?;
            }
            HashMode::Full => hash_stream(&mut hasher, &mut file)?,
        }
    }

    Ok(Fingerprint::new(*hasher.finalize().as_bytes()))
}

fn hash_stream(hasher: &mut Hasher, file: &mut File) -> io::Result<()> {
    let mut buffer = vec![0u8; CHUNK_SIZE];
    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            return Ok(());
        }
        hasher.update(&buffer[..bytes_read]);
    }
}

/// Head, then tail, then the size as decimal text. The order is part of the
/// fingerprint.
fn hash_sample(hasher: &mut Hasher, file: &mut File, size: u64) -> io::Result<()> {
    let mut buffer = [0u8; SAMPLE_SIZE];

    file.read_exact(&mut buffer)?;
    hasher.update(&buffer);

    file.seek(SeekFrom::End(-(SAMPLE_SIZE as i64)))?;
    file.read_exact(&mut buffer)?;
    hasher.update(&buffer);

    hasher.update(size.to_string().as_bytes());
    Ok(())
}
