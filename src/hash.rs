use std::io::Read;

const WORD: usize = std::mem::size_of::<u64>();

/// XOR-folds `buf` into a 64-bit checksum.
///
/// Whole words are decoded little-endian. Tail byte `i` of a partial final
/// word is shifted left by `i * 8` bits, which is where it would land in a
/// little-endian word, so a buffer padded with zeros to a multiple of 8
/// checksums the same as the unpadded one.
#[must_use]
pub fn checksum_bytes(buf: &[u8]) -> u64 {
    let mut chunks = buf.chunks_exact(WORD);
    let mut h = 0;
    for w in &mut chunks {
        let mut b = [0; WORD];
        b.copy_from_slice(w);
        h ^= u64::from_le_bytes(b);
    }
    for (i, x) in chunks.remainder().iter().enumerate() {
        h ^= u64::from(*x) << (i * 8);
    }
    h
}

/// # Errors
pub fn try_checksum(path: &std::path::Path, cap: Option<u64>) -> std::io::Result<u64> {
    let fp = std::fs::File::open(path)?;
    let size = fp.metadata()?.len();
    let n = match cap {
        Some(v) => size.min(v),
        None => size,
    };
    if n == 0 {
        return Ok(0);
    }
    let mut buf = Vec::with_capacity(usize::try_from(n).unwrap_or(0));
    fp.take(n).read_to_end(&mut buf)?;
    Ok(checksum_bytes(&buf))
}

/// Checksums the first `cap` bytes of `path`, or the whole file if `cap`
/// is `None`. A file that can't be read checksums to 0.
#[must_use]
pub fn checksum(path: &std::path::Path, cap: Option<u64>) -> u64 {
    match try_checksum(path, cap) {
        Ok(v) => v,
        Err(e) => {
            log::debug!("{}: {e}", path.display());
            0
        }
    }
}
