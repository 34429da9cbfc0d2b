// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Double-fork daemonization via raw `libc` calls.
//!
//! Must run before the tokio runtime is started: a forked child does not
//! inherit the parent's worker threads, so this has to happen while the
//! process is still single-threaded. Callers build the runtime after this
//! returns (in the grandchild).

use std::ffi::CString;

/// Fork twice, detach from the controlling terminal, and redirect standard
/// file descriptors to `/dev/null`. Returns in the grandchild only; the
/// original process and the intermediate child both `exit(0)`.
pub fn daemonize() -> std::io::Result<()> {
    // SAFETY: single-threaded at this point in startup (called before the
    // tokio runtime exists), so fork() cannot leave another thread holding a
    // lock the child can never release.
    unsafe {
        match libc::fork() {
            -1 => return Err(std::io::Error::last_os_error()),
            0 => {}
            _ => libc::_exit(0),
        }

        if libc::setsid() == -1 {
            return Err(std::io::Error::last_os_error());
        }

        match libc::fork() {
            -1 => return Err(std::io::Error::last_os_error()),
            0 => {}
            _ => libc::_exit(0),
        }

        let root = CString::new("/").expect("no interior NUL");
        libc::chdir(root.as_ptr());
        libc::umask(0o022);

        redirect_std_fds_to_dev_null()?;
    }
    Ok(())
}

unsafe fn redirect_std_fds_to_dev_null() -> std::io::Result<()> {
    let dev_null = CString::new("/dev/null").expect("no interior NUL");
    let fd = libc::open(dev_null.as_ptr(), libc::O_RDWR);
    if fd == -1 {
        return Err(std::io::Error::last_os_error());
    }
    for target in [libc::STDIN_FILENO, libc::STDOUT_FILENO, libc::STDERR_FILENO] {
        libc::dup2(fd, target);
    }
    if fd > libc::STDERR_FILENO {
        libc::close(fd);
    }
    Ok(())
}
