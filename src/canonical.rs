//! Path canonicalization that also works for paths that do not exist yet.
//!
//! Existing paths go through the OS (`dunce::canonicalize`). When the path or
//! part of it is missing, the existing prefix is resolved one component at a
//! time, following every symlink (dangling ones included) to where a write
//! would actually land, and the missing remainder is appended lexically.

use std::collections::VecDeque;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Same limit Linux applies (`MAXSYMLINKS`).
pub const MAX_SYMLINK_HOPS: usize = 40;

pub fn has_null_byte(path: &Path) -> bool {
    path.as_os_str().as_encoded_bytes().contains(&0)
}

/// Remove `.` and `..` without touching the filesystem. `..` never climbs
/// above the root of an absolute path.
pub fn normalize_lexical(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out.iter().collect()
}

/// Resolve `path` to its real absolute form. Missing trailing components are
/// allowed; errors other than "does not exist" are returned as-is.
pub fn resolve(path: &Path) -> io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    match dunce::canonicalize(&absolute) {
        Ok(real) => Ok(real),
        Err(e) if is_missing(&e) => resolve_with_missing_tail(&absolute),
        Err(e) => Err(e),
    }
}

enum Step {
    Root(OsString),
    Up,
    Name(OsString),
}

fn steps(path: &Path) -> Vec<Step> {
    path.components()
        .filter_map(|c| match c {
            Component::Prefix(p) => Some(Step::Root(p.as_os_str().to_os_string())),
            Component::RootDir => Some(Step::Root(c.as_os_str().to_os_string())),
            Component::CurDir => None,
            Component::ParentDir => Some(Step::Up),
            Component::Normal(n) => Some(Step::Name(n.to_os_string())),
        })
        .collect()
}

fn resolve_with_missing_tail(path: &Path) -> io::Result<PathBuf> {
    let mut pending: VecDeque<Step> = steps(path).into();
    let mut resolved = PathBuf::new();
    // number of trailing components of `resolved` that do not exist
    let mut missing = 0usize;
    let mut hops = 0usize;

    while let Some(step) = pending.pop_front() {
        match step {
            Step::Root(root) => resolved.push(root),
            Step::Up => {
                missing = missing.saturating_sub(1);
                resolved.pop();
            }
            Step::Name(name) => {
                let next = resolved.join(&name);
                if missing > 0 {
                    resolved = next;
                    missing += 1;
                    continue;
                }
                match fs::symlink_metadata(&next) {
                    Ok(meta) if meta.file_type().is_symlink() => {
                        hops += 1;
                        if hops > MAX_SYMLINK_HOPS {
                            return Err(io::Error::new(
                                io::ErrorKind::Other,
                                format!("too many levels of symbolic links at {}", next.display()),
                            ));
                        }
                        let target = fs::read_link(&next)?;
                        if target.is_absolute() {
                            resolved = PathBuf::new();
                        }
                        for s in steps(&target).into_iter().rev() {
                            pending.push_front(s);
                        }
                    }
                    Ok(_) => resolved = next,
                    Err(e) if is_missing(&e) => {
                        resolved = next;
                        missing = 1;
                    }
                    Err(e) => return Err(e),
                }
            }
        }
    }
    Ok(resolved)
}

pub(crate) fn is_missing(e: &io::Error) -> bool {
    if e.kind() == io::ErrorKind::NotFound {
        return true;
    }
    #[cfg(unix)]
    {
        e.raw_os_error() == Some(libc::ENOTDIR)
    }
    #[cfg(not(unix))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexical_normalization() {
        assert_eq!(normalize_lexical(Path::new("/a/b/../c/./d")), PathBuf::from("/a/c/d"));
        assert_eq!(normalize_lexical(Path::new("/../../etc")), PathBuf::from("/etc"));
        assert_eq!(normalize_lexical(Path::new("a/../../b")), PathBuf::from("../b"));
        assert_eq!(normalize_lexical(Path::new("docs/../README.md")), PathBuf::from("README.md"));
    }

    #[test]
    fn null_bytes_detected() {
        assert!(has_null_byte(Path::new("a\0b")));
        assert!(!has_null_byte(Path::new("ab")));
    }

    #[test]
    fn existing_path_matches_os() {
        let tmp = tempfile::tempdir().unwrap();
        let real = dunce::canonicalize(tmp.path()).unwrap();
        assert_eq!(resolve(tmp.path()).unwrap(), real);
    }

    #[test]
    fn missing_tail_appended_to_real_prefix() {
        let tmp = tempfile::tempdir().unwrap();
        let real = dunce::canonicalize(tmp.path()).unwrap();
        let got = resolve(&tmp.path().join("new/dir/file.md")).unwrap();
        assert_eq!(got, real.join("new/dir/file.md"));
    }

    #[test]
    fn parent_steps_inside_missing_tail() {
        let tmp = tempfile::tempdir().unwrap();
        let real = dunce::canonicalize(tmp.path()).unwrap();
        let got = resolve(&tmp.path().join("gone/../also-gone/x")).unwrap();
        assert_eq!(got, real.join("also-gone/x"));
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_is_followed() {
        let tmp = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        let target = dunce::canonicalize(outside.path()).unwrap().join("not-yet");
        std::os::unix::fs::symlink(&target, tmp.path().join("link")).unwrap();
        let got = resolve(&tmp.path().join("link/file.txt")).unwrap();
        assert_eq!(got, target.join("file.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn relative_dangling_symlink_resolves_against_its_parent() {
        let tmp = tempfile::tempdir().unwrap();
        let real = dunce::canonicalize(tmp.path()).unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        std::os::unix::fs::symlink("../elsewhere", tmp.path().join("sub/link")).unwrap();
        let got = resolve(&tmp.path().join("sub/link")).unwrap();
        assert_eq!(got, real.join("elsewhere"));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_loop_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink("b", tmp.path().join("a")).unwrap();
        std::os::unix::fs::symlink("a", tmp.path().join("b")).unwrap();
        assert!(resolve(&tmp.path().join("a/new")).is_err());
    }

    #[test]
    fn file_in_the_middle_counts_as_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let real = dunce::canonicalize(tmp.path()).unwrap();
        fs::write(tmp.path().join("f.txt"), b"x").unwrap();
        let got = resolve(&tmp.path().join("f.txt/child")).unwrap();
        assert_eq!(got, real.join("f.txt/child"));
    }
}
