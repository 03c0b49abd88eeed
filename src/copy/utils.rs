//! Byte-level helpers for the copier workers.

use std::fs::File;
use std::io;

/// Stream every byte of `src` into `dst`, returning the number copied.
///
/// On Linux 4.5+, uses `copy_file_range` for in-kernel transfer.
/// Falls back to `std::io::copy` on other platforms or when the kernel
/// refuses the first chunk.
pub(crate) fn copy_file_contents(src: &File, dst: &File) -> io::Result<u64> {
    #[cfg(target_os = "linux")]
    {
        copy_file_range_all(src, dst)
    }
    #[cfg(not(target_os = "linux"))]
    {
        userspace_copy(src, dst)
    }
}

fn userspace_copy(src: &File, dst: &File) -> io::Result<u64> {
    use std::io::BufReader;
    io::copy(&mut BufReader::new(src), &mut &*dst)
}

/// Linux-specific: copy using copy_file_range(2) until EOF.
///
/// The source length is not trusted (files may grow, and pseudo files
/// report 0), so this loops until the kernel reports end of file.
#[cfg(target_os = "linux")]
fn copy_file_range_all(src: &File, dst: &File) -> io::Result<u64> {
    use std::os::unix::io::AsRawFd;

    const CHUNK: usize = 128 * 1024 * 1024;

    let src_fd = src.as_raw_fd();
    let dst_fd = dst.as_raw_fd();
    let mut copied: u64 = 0;

    loop {
        // SAFETY: both descriptors are open for the lifetime of the borrows,
        // and null offsets make the kernel use and advance the file positions.
        let result = unsafe {
            libc::copy_file_range(
                src_fd,
                std::ptr::null_mut(),
                dst_fd,
                std::ptr::null_mut(),
                CHUNK,
                0,
            )
        };

        if result < 0 {
            let err = io::Error::last_os_error();
            // EXDEV: cross-device, ENOSYS: not supported, EINVAL: fs doesn't support it
            if copied == 0
                && matches!(
                    err.raw_os_error(),
                    Some(libc::EXDEV)
                        | Some(libc::ENOSYS)
                        | Some(libc::EINVAL)
                        | Some(libc::EOPNOTSUPP)
                )
            {
                return userspace_copy(src, dst);
            }
            return Err(err);
        }

        if result == 0 {
            break;
        }

        copied += result as u64;
    }

    Ok(copied)
}
