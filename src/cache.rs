#[must_use]
pub fn is_supported() -> bool {
    cfg!(any(target_os = "linux", target_os = "freebsd"))
}

/// Advises the kernel to evict the cached pages of `path`, so the next read
/// goes to storage. Dirty pages are left alone.
///
/// # Errors
#[cfg(any(target_os = "linux", target_os = "freebsd"))]
pub fn drop_cached_pages(path: &std::path::Path) -> std::io::Result<()> {
    use std::os::fd::AsRawFd;

    let fp = std::fs::File::open(path)?;
    match unsafe { libc::posix_fadvise(fp.as_raw_fd(), 0, 0, libc::POSIX_FADV_DONTNEED) } {
        0 => Ok(()),
        e => Err(std::io::Error::from_raw_os_error(e)),
    }
}

/// # Errors
#[cfg(not(any(target_os = "linux", target_os = "freebsd")))]
pub fn drop_cached_pages(_path: &std::path::Path) -> std::io::Result<()> {
    Err(std::io::Error::from(std::io::ErrorKind::Unsupported))
}

/// Drops the cached pages of every path, returning how many succeeded.
pub fn drop_all<'a, I>(paths: I) -> usize
where
    I: IntoIterator<Item = &'a std::path::Path>,
{
    let mut n = 0;
    for p in paths {
        match drop_cached_pages(p) {
            Ok(()) => n += 1,
            Err(e) => log::debug!("{}: {e}", p.display()),
        }
    }
    n
}
