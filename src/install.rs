use log::debug;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::LAUNCHER_NAME;
use crate::error::{AgentError, Result};

/// Outcome of linking the launcher into a bin directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallResult {
    pub link_path: PathBuf,
    pub source_path: PathBuf,
    pub path_contains_target_dir: bool,
}

/// First candidate, in the given order, that exists and the current user can write to.
pub fn find_writable_target(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates
        .iter()
        .find(|dir| dir.is_dir() && is_writable(dir))
        .cloned()
}

/// Link `target_dir/omni-autonomous-agent` to `source`, replacing any existing
/// entry, and make `source` executable for everyone.
///
/// `path_var` is the value of `PATH` used to decide whether a hint is needed.
/// Remove-then-link is not atomic; two concurrent installs can collide.
pub fn install(
    source: &Path,
    target_dir: &Path,
    path_var: Option<&OsStr>,
) -> Result<InstallResult> {
    let link_path = target_dir.join(LAUNCHER_NAME);

    // symlink_metadata so that dangling links are also replaced
    if fs::symlink_metadata(&link_path).is_ok() {
        debug!("removing existing {}", link_path.display());
        fs::remove_file(&link_path).map_err(AgentError::io("remove", &link_path))?;
    }
    symlink(source, &link_path).map_err(AgentError::io("create symlink", &link_path))?;
    add_exec_bits(source)?;
    debug!("linked {} -> {}", link_path.display(), source.display());

    Ok(InstallResult {
        link_path,
        source_path: source.to_path_buf(),
        path_contains_target_dir: path_var.is_some_and(|p| path_contains(p, target_dir)),
    })
}

/// Whether `dir` is one of the entries of a `PATH`-style list.
///
/// Entries are compared as paths, not strings: `/a/b/` matches `/a/b`.
pub fn path_contains(path_var: &OsStr, dir: &Path) -> bool {
    std::env::split_paths(path_var).any(|entry| entry == dir)
}

#[cfg(unix)]
fn is_writable(dir: &Path) -> bool {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let Ok(c_path) = CString::new(dir.as_os_str().as_bytes()) else {
        return false;
    };
    // SAFETY: c_path is a valid NUL-terminated string that outlives the call.
    unsafe { libc::access(c_path.as_ptr(), libc::W_OK) == 0 }
}

#[cfg(not(unix))]
fn is_writable(dir: &Path) -> bool {
    fs::metadata(dir)
        .map(|m| !m.permissions().readonly())
        .unwrap_or(false)
}

#[cfg(unix)]
fn symlink(source: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(source, link)
}

#[cfg(windows)]
fn symlink(source: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_file(source, link)
}

#[cfg(unix)]
fn add_exec_bits(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)
        .map_err(AgentError::io("read permissions of", path))?
        .permissions();
    perms.set_mode(perms.mode() | 0o111);
    fs::set_permissions(path, perms).map_err(AgentError::io("set permissions on", path))
}

#[cfg(not(unix))]
fn add_exec_bits(_path: &Path) -> Result<()> {
    Ok(())
}
