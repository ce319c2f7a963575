use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::{Error, Hasher, MultiHasher, Result};

/// Streaming reader that hashes data as it passes through.
/// Wraps any `Read` source so bytes are touched once for both hashing and copying.
pub struct HashingReader<R, H> {
    reader: R,
    hasher: H,
    bytes_read: u64,
}

impl<R, H> HashingReader<R, H> {
    pub fn new(reader: R, hasher: H) -> Self {
        Self {
            reader,
            hasher,
            bytes_read: 0,
        }
    }

    pub fn bytes_read(&self) -> u64 { self.bytes_read }

    pub fn into_hasher(self) -> H { self.hasher }
}

impl<R: Read, H: Hasher> Read for HashingReader<R, H> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.reader.read(buf)?;
        if n > 0 {
            self.hasher.update(&buf[..n]);
            self.bytes_read += n as u64;
        }
        Ok(n)
    }
}

/// Drain `reader` through `hasher`, returning the number of bytes consumed.
pub fn hash_reader<R: Read, H: Hasher>(reader: R, hasher: H) -> io::Result<u64> {
    let mut hashing = HashingReader::new(reader, hasher);
    io::copy(&mut hashing, &mut io::sink())?;
    Ok(hashing.bytes_read())
}

/// Hash one file with a freshly reset `hasher` and return the lowercase hex digest.
pub fn hash_file<H: Hasher + ?Sized>(path: impl AsRef<Path>, hasher: &mut H) -> Result<String> {
    let path = path.as_ref();
    hasher.reset();
    let file = File::open(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    hash_reader(file, &mut *hasher).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(hasher.hex_digest())
}

/// Hash one file with every algorithm in `hashers` in a single read.
/// Returns the file size in bytes.
pub fn hash_file_multi(path: impl AsRef<Path>, hashers: &mut MultiHasher) -> Result<u64> {
    let path = path.as_ref();
    hashers.reset();
    let file = File::open(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    hash_reader(file, hashers).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })
}
