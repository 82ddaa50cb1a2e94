//! Host platform (linux for example) utility functions

use std::path::PathBuf;

use thiserror::Error;
use uname;

/// Errors associated with host queries.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("The software root environment variable (LAUNCH_RIG_SW_ROOT) is not set")]
    SwRootNotSet,
}

/// Retrieve uname information.
pub fn get_uname() -> std::io::Result<uname::Info> {
    uname::uname()
}

/// Get the root directory of the software installation.
///
/// This is read from the `LAUNCH_RIG_SW_ROOT` environment variable, which
/// must point at the directory containing `params` and `sessions`.
pub fn get_launch_rig_sw_root() -> Result<PathBuf, HostError> {
    match std::env::var("LAUNCH_RIG_SW_ROOT") {
        Ok(r) => Ok(PathBuf::from(r)),
        Err(_) => Err(HostError::SwRootNotSet),
    }
}
