use std::path::Path;

/// True when `candidate` equals `boundary` or lies beneath it.
///
/// Both inputs must already be canonical. The comparison is component-wise,
/// so `/base` contains `/base/x` but not `/base-other/x`.
pub fn is_within(candidate: &Path, boundary: &Path) -> bool {
    let mut cand = candidate.components();
    for b in boundary.components() {
        match cand.next() {
            Some(c) if c == b => {}
            _ => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_contained() {
        assert!(is_within(Path::new("/ws/base"), Path::new("/ws/base")));
    }

    #[test]
    fn descendants_are_contained() {
        assert!(is_within(Path::new("/ws/base/a/b.md"), Path::new("/ws/base")));
    }

    #[test]
    fn prefix_lookalike_rejected() {
        assert!(!is_within(Path::new("/ws/base-other/file"), Path::new("/ws/base")));
        assert!(!is_within(Path::new("/ws/basement"), Path::new("/ws/base")));
    }

    #[test]
    fn parent_is_not_contained() {
        assert!(!is_within(Path::new("/ws"), Path::new("/ws/base")));
        assert!(!is_within(Path::new("/"), Path::new("/ws")));
    }

    #[test]
    fn root_boundary_contains_everything_absolute() {
        assert!(is_within(Path::new("/"), Path::new("/")));
        assert!(is_within(Path::new("/etc/passwd"), Path::new("/")));
    }
}
