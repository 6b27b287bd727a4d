//! Platform-specific helpers.
//! This module hides OS differences (Unix/Windows) behind a uniform API so
//! the rest of the codebase can remain platform-agnostic.

use std::fmt;

#[cfg(unix)]
mod unix;
#[cfg(not(unix))]
mod windows;

#[cfg(unix)]
pub use unix::{check_dir_access, create_new_text_file, open_log_file_secure_append};

#[cfg(not(unix))]
pub use windows::{check_dir_access, create_new_text_file, open_log_file_secure_append};

/// Access a pipeline needs on its root directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    ReadWrite,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Read => f.write_str("read"),
            Access::ReadWrite => f.write_str("read/write"),
        }
    }
}
