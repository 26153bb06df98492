// ABOUTME: Filesystem helpers for the generation run
// ABOUTME: Recursive directory copy and forced symbolic link replacement

use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// Copy `src` recursively into `dst`, overwriting files that already exist.
/// Returns the number of files copied.
pub fn copy_dir(src: &Path, dst: &Path) -> io::Result<u64> {
    let mut copied = 0;

    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Point `link` at `target`, replacing an existing file or link at `link`.
/// A real directory in the way is left alone and reported as an error.
pub fn force_symlink(target: &Path, link: &Path) -> io::Result<()> {
    if let Ok(metadata) = std::fs::symlink_metadata(link) {
        if metadata.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} is a directory", link.display()),
            ));
        }
        std::fs::remove_file(link)?;
    }

    if let Some(parent) = link.parent() {
        std::fs::create_dir_all(parent)?;
    }

    symlink(target, link)
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}
