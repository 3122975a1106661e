#[cfg(target_os = "linux")]
mod linux;
#[cfg(not(any(target_os = "linux", windows)))]
mod unsupported;
#[cfg(windows)]
mod windows;

#[cfg(target_os = "linux")]
pub use linux::*;
#[cfg(not(any(target_os = "linux", windows)))]
pub use unsupported::*;
#[cfg(windows)]
pub use windows::*;

/// Upper bound for the extent query output buffer.
/// Must stay within the u32 transfer size of the underlying query.
pub const MAX_QUERY_BYTES: usize = 1 << 20;

/// Source of the first on-disk allocation unit of a file.
///
/// The value is only meaningful relative to other files on the same
/// filesystem; it is used as a sort key and nothing else.
pub trait AllocationUnitProvider {
    /// Returns the starting allocation unit of the extent that maps the
    /// first byte of `path`, or `None` if that can't be determined.
    fn first_allocation_unit(&self, path: &std::path::Path) -> Option<u64>;

    fn is_supported(&self) -> bool {
        true
    }
}

impl<F> AllocationUnitProvider for F
where
    F: Fn(&std::path::Path) -> Option<u64>,
{
    fn first_allocation_unit(&self, path: &std::path::Path) -> Option<u64> {
        self(path)
    }
}

/// Returns the first allocation unit of `path`, or 0 if unknown.
#[must_use]
pub fn allocation_unit<P>(provider: &P, path: &std::path::Path) -> u64
where
    P: AllocationUnitProvider + ?Sized,
{
    provider.first_allocation_unit(path).unwrap_or(0)
}

#[derive(Debug)]
pub enum QueryError {
    BufferTooSmall,
    Failed(std::io::Error),
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BufferTooSmall => write!(f, "extent query buffer too small"),
            Self::Failed(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for QueryError {}

impl From<std::io::Error> for QueryError {
    fn from(e: std::io::Error) -> Self {
        Self::Failed(e)
    }
}

/// Runs `query` against a zeroed, 8 byte aligned buffer of `initial` bytes,
/// doubling the buffer each time the query reports `BufferTooSmall`.
/// The previous buffer is released before the next one is allocated.
///
/// # Errors
/// Returns `BufferTooSmall` once the buffer would exceed `limit` bytes,
/// otherwise whatever error `query` returned.
pub fn query_growing<T, F>(initial: usize, limit: usize, mut query: F) -> Result<T, QueryError>
where
    F: FnMut(&mut [u64]) -> Result<T, QueryError>,
{
    let mut size = initial.max(1);
    let mut buf = vec![0; size.div_ceil(8)];
    loop {
        match query(&mut buf) {
            Err(QueryError::BufferTooSmall) => {
                size = match size.checked_mul(2) {
                    Some(v) if v <= limit => v,
                    _ => return Err(QueryError::BufferTooSmall),
                };
                log::trace!("retrying extent query with {size} bytes");
                drop(std::mem::take(&mut buf));
                buf = vec![0; size.div_ceil(8)];
            }
            v => return v,
        }
    }
}
