//! Shared worker output channel
//!
//! One anonymous pipe whose write end becomes the standard output of every
//! worker. Both ends are created close-on-exec: each worker receives its own
//! duplicate of the write end through stdout redirection, and the read end never
//! leaks into a worker (otherwise the coordinator would never observe
//! end-of-stream).

use crate::error::ReportError;
use std::fs::File;
use std::io;
use std::os::unix::io::{FromRawFd, OwnedFd, RawFd};

/// Both ends of the shared channel
///
/// The write end is handed to the launcher, which drops it once every worker
/// has been spawned.
#[derive(Debug)]
pub struct SharedChannel {
    pub reader: File,
    pub writer: File,
}

impl SharedChannel {
    /// Create the pipe
    pub fn open() -> Result<Self, ReportError> {
        let (read_fd, write_fd) = create_pipe().map_err(|source| ReportError::ResourceExhausted {
            what: "creating worker channel",
            source,
        })?;

        Ok(Self {
            reader: File::from(read_fd),
            writer: File::from(write_fd),
        })
    }
}

/// Create a pipe pair, returning (read end, write end), both close-on-exec
fn create_pipe() -> io::Result<(OwnedFd, OwnedFd)> {
    let mut fds = [0 as RawFd; 2];
    raw_pipe(&mut fds)?;

    // SAFETY: the pipe call succeeded, so both descriptors are open and owned by nobody else.
    let (read_fd, write_fd) = unsafe { (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) };

    Ok((read_fd, write_fd))
}

/// pipe2(O_CLOEXEC): no window in which a concurrent spawn can inherit either end
#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "dragonfly"
))]
fn raw_pipe(fds: &mut [RawFd; 2]) -> io::Result<()> {
    if unsafe { libc::pipe2(fds.as_mut_ptr(), libc::O_CLOEXEC) } != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "dragonfly"
)))]
fn raw_pipe(fds: &mut [RawFd; 2]) -> io::Result<()> {
    if unsafe { libc::pipe(fds.as_mut_ptr()) } != 0 {
        return Err(io::Error::last_os_error());
    }
    for &fd in fds.iter() {
        if let Err(e) = set_cloexec(fd) {
            unsafe {
                libc::close(fds[0]);
                libc::close(fds[1]);
            }
            return Err(e);
        }
    }
    Ok(())
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "freebsd",
    target_os = "netbsd",
    target_os = "openbsd",
    target_os = "dragonfly"
)))]
fn set_cloexec(fd: RawFd) -> io::Result<()> {
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFD) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }
    if unsafe { libc::fcntl(fd, libc::F_SETFD, flags | libc::FD_CLOEXEC) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
