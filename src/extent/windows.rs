use super::QueryError;

use std::os::windows::fs::OpenOptionsExt;
use std::os::windows::io::AsRawHandle;

use windows_sys::Win32::Foundation::{GetLastError, ERROR_INSUFFICIENT_BUFFER, ERROR_MORE_DATA};
use windows_sys::Win32::Storage::FileSystem::{
    FILE_READ_ATTRIBUTES, FILE_SHARE_DELETE, FILE_SHARE_READ, FILE_SHARE_WRITE,
};
use windows_sys::Win32::System::IO::DeviceIoControl;
use windows_sys::Win32::System::Ioctl::{
    FSCTL_GET_RETRIEVAL_POINTERS, RETRIEVAL_POINTERS_BUFFER, STARTING_VCN_INPUT_BUFFER,
};

/// `FSCTL_GET_RETRIEVAL_POINTERS` based provider.
/// Units are logical cluster numbers.
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
        match get_first_lcn(path) {
            Ok(v) => v,
            Err(e) => {
                log::debug!("{}: {e}", path.display());
                None
            }
        }
    }
}

fn get_first_lcn(path: &std::path::Path) -> Result<Option<u64>, QueryError> {
    // attribute access only, so other readers and writers are never blocked
    let fp = std::fs::OpenOptions::new()
        .access_mode(FILE_READ_ATTRIBUTES)
        .share_mode(FILE_SHARE_READ | FILE_SHARE_WRITE | FILE_SHARE_DELETE)
        .open(path)?;
    super::query_growing(
        std::mem::size_of::<RETRIEVAL_POINTERS_BUFFER>(),
        super::MAX_QUERY_BYTES,
        |buf| get_retrieval_pointers(&fp, buf),
    )
}

fn get_retrieval_pointers(
    fp: &std::fs::File,
    buf: &mut [u64],
) -> Result<Option<u64>, QueryError> {
    let input = STARTING_VCN_INPUT_BUFFER { StartingVcn: 0 };
    let Ok(size) = u32::try_from(std::mem::size_of_val(buf)) else {
        return Err(QueryError::BufferTooSmall);
    };
    let mut returned = 0;
    let ok = unsafe {
        DeviceIoControl(
            fp.as_raw_handle(),
            FSCTL_GET_RETRIEVAL_POINTERS,
            std::ptr::from_ref(&input).cast(),
            std::mem::size_of::<STARTING_VCN_INPUT_BUFFER>() as u32,
            buf.as_mut_ptr().cast(),
            size,
            &mut returned,
            std::ptr::null_mut(),
        )
    };
    check_status(if ok == 0 {
        Some(unsafe { GetLastError() })
    } else {
        None
    })?;
    let rp = unsafe { buf.as_ptr().cast::<RETRIEVAL_POINTERS_BUFFER>().read() };
    if rp.ExtentCount == 0 || rp.StartingVcn != 0 {
        return Ok(None);
    }
    // an LCN of -1 marks a virtual (sparse or compressed) run
    Ok(u64::try_from(rp.Extents[0].Lcn).ok())
}

/// Maps the error code of a failed query, `None` on success, to whether the
/// output buffer holds the leading extents.
fn check_status(error: Option<u32>) -> Result<(), QueryError> {
    match error {
        // more extents follow those that fit, the first one is in place
        None | Some(ERROR_MORE_DATA) => Ok(()),
        // not even the header fits
        Some(ERROR_INSUFFICIENT_BUFFER) => Err(QueryError::BufferTooSmall),
        Some(v) => Err(QueryError::Failed(std::io::Error::from_raw_os_error(
            v as i32,
        ))),
    }
}
