use super::QueryError;

use std::os::fd::AsRawFd;
use std::os::unix::fs::MetadataExt;

// linux/fiemap.h
const FIEMAP_MAX_OFFSET: u64 = u64::MAX;
const FIEMAP_EXTENT_UNKNOWN: u32 = 0x0000_0002;
const FIEMAP_EXTENT_DATA_INLINE: u32 = 0x0000_0200;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
struct Fiemap {
    fm_start: u64,
    fm_length: u64,
    fm_flags: u32,
    fm_mapped_extents: u32,
    fm_extent_count: u32,
    fm_reserved: u32,
    // struct fiemap_extent fm_extents[]
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
struct FiemapExtent {
    fe_logical: u64,
    fe_physical: u64,
    fe_length: u64,
    fe_reserved64: [u64; 2],
    fe_flags: u32,
    fe_reserved: [u32; 3],
}

const FIEMAP_SIZE: usize = std::mem::size_of::<Fiemap>();
const FIEMAP_EXTENT_SIZE: usize = std::mem::size_of::<FiemapExtent>();

/// `FS_IOC_FIEMAP` based provider.
/// Units are the file's preferred I/O block size.
#[derive(Debug, Default)]
pub struct NativeProvider {}

impl NativeProvider {
    #[must_use]
    pub fn new() -> Self {
        Self {}
    }
}

impl super::AllocationUnitProvider for NativeProvider {
    fn first_allocation_unit(&self, path: &std::path::Path) -> Option<u64> {
        match get_first_block(path) {
            Ok(v) => v,
            Err(e) => {
                log::debug!("{}: {e}", path.display());
                None
            }
        }
    }
}

fn get_first_block(path: &std::path::Path) -> Result<Option<u64>, QueryError> {
    let fp = std::fs::File::open(path)?;
    let blksize = fp.metadata()?.blksize().max(1);
    let physical = super::query_growing(
        FIEMAP_SIZE + FIEMAP_EXTENT_SIZE,
        super::MAX_QUERY_BYTES,
        |buf| get_first_extent(&fp, buf),
    )?;
    Ok(physical.map(|v| v / blksize))
}

fn get_first_extent(fp: &std::fs::File, buf: &mut [u64]) -> Result<Option<u64>, QueryError> {
    let count = std::mem::size_of_val(buf).saturating_sub(FIEMAP_SIZE) / FIEMAP_EXTENT_SIZE;
    if count == 0 {
        return Err(QueryError::BufferTooSmall);
    }
    nix::ioctl_readwrite!(fs_ioc_fiemap, b'f', 11, Fiemap);
    let fm = buf.as_mut_ptr().cast::<Fiemap>();
    let hdr = unsafe {
        fm.write(Fiemap {
            fm_start: 0,
            fm_length: FIEMAP_MAX_OFFSET,
            fm_extent_count: u32::try_from(count).unwrap_or(u32::MAX),
            ..Default::default()
        });
        if let Err(e) = fs_ioc_fiemap(fp.as_raw_fd(), fm) {
            return Err(QueryError::Failed(e.into()));
        }
        fm.read()
    };
    if hdr.fm_mapped_extents == 0 {
        return Ok(None); // empty or no mapping yet
    }
    let ext = unsafe { fm.add(1).cast::<FiemapExtent>().read() };
    log::trace!("{ext:?}");
    Ok(get_extent_start(&hdr, &ext))
}

/// Returns the physical offset of the first extent if it maps file offset 0
/// to a known location on the device.
fn get_extent_start(hdr: &Fiemap, ext: &FiemapExtent) -> Option<u64> {
    if hdr.fm_mapped_extents == 0
        || ext.fe_logical != 0
        || ext.fe_flags & (FIEMAP_EXTENT_UNKNOWN | FIEMAP_EXTENT_DATA_INLINE) != 0
    {
        None
    } else {
        Some(ext.fe_physical)
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_struct_size() {
        assert_eq!(super::FIEMAP_SIZE, 32);
        assert_eq!(super::FIEMAP_EXTENT_SIZE, 56);
        assert_eq!(super::FIEMAP_SIZE % 8, 0);
        assert_eq!(super::FIEMAP_EXTENT_SIZE % 8, 0);
    }

    #[test]
    fn test_get_first_extent_small_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let f = dir.path().join("data");
        std::fs::write(&f, b"x").unwrap();
        let fp = std::fs::File::open(&f).unwrap();
        let mut buf = [0; super::FIEMAP_SIZE / 8];
        assert!(matches!(
            super::get_first_extent(&fp, &mut buf),
            Err(super::QueryError::BufferTooSmall)
        ));
    }

    #[test]
    fn test_get_extent_start() {
        let mapped = super::Fiemap {
            fm_mapped_extents: 1,
            ..Default::default()
        };
        let ext = |logical, flags| super::FiemapExtent {
            fe_logical: logical,
            fe_physical: 0x10_0000,
            fe_length: 4096,
            fe_flags: flags,
            ..Default::default()
        };
        let l = [
            (mapped, ext(0, 0), Some(0x10_0000)),
            (mapped, ext(0, 0x1), Some(0x10_0000)), // last
            (mapped, ext(4096, 0), None),           // hole at the head
            (mapped, ext(0, super::FIEMAP_EXTENT_UNKNOWN), None),
            (mapped, ext(0, super::FIEMAP_EXTENT_DATA_INLINE), None),
            (mapped, ext(0, 0x4 | super::FIEMAP_EXTENT_UNKNOWN), None),
            (super::Fiemap::default(), ext(0, 0), None),
        ];
        for (i, t) in l.iter().enumerate() {
            assert_eq!(super::get_extent_start(&t.0, &t.1), t.2, "{i}");
        }
    }

    #[test]
    fn test_get_first_block_located() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let f = dir.path().join("data");
        let mut fp = std::fs::File::create(&f).unwrap();
        fp.write_all(&vec![0x5a; 1 << 16]).unwrap();
        fp.sync_all().unwrap();
        drop(fp);
        // tmpfs and friends don't implement FIEMAP
        if let Ok(v) = super::get_first_block(&f) {
            assert!(v.is_some(), "{f:?}");
        }
    }

    #[test]
    fn test_get_first_block_sparse_head() {
        use std::io::{Seek, Write};

        let dir = tempfile::tempdir().unwrap();
        let f = dir.path().join("sparse");
        let mut fp = std::fs::File::create(&f).unwrap();
        fp.seek(std::io::SeekFrom::Start(1 << 20)).unwrap();
        fp.write_all(&[0x5a; 4096]).unwrap();
        fp.sync_all().unwrap();
        drop(fp);
        if let Ok(v) = super::get_first_block(&f) {
            assert_eq!(v, None);
        }
    }

    #[test]
    fn test_get_first_block_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let f = dir.path().join("empty");
        std::fs::write(&f, b"").unwrap();
        // filesystems without FIEMAP support fail the query instead
        if let Ok(v) = super::get_first_block(&f) {
            assert_eq!(v, None);
        }
    }
}
