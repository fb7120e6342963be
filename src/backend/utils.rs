//! String path helpers shared by the store and the seed sources.

pub const ROOT: &str = "";

pub fn is_root(path: &str) -> bool {
    path == ROOT
}

/// Parent path of `path`; the parent of a top-level entry is the root.
pub fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => ROOT,
    }
}

/// Proper ancestors of `path`, outermost first, excluding the root.
/// `"a/b/c"` yields `"a"`, `"a/b"`.
pub fn ancestors(path: &str) -> impl Iterator<Item = &str> {
    path.match_indices('/').map(move |(idx, _)| &path[..idx])
}

/// `true` if `path` lies anywhere below `directory`.
pub fn is_in_directory(path: &str, directory: &str) -> bool {
    if is_root(directory) {
        return !is_root(path);
    }
    path.len() > directory.len()
        && path.starts_with(directory)
        && path.as_bytes()[directory.len()] == b'/'
}

/// `true` if `path` lies directly inside `directory` (one level down).
pub fn is_direct_child(path: &str, directory: &str) -> bool {
    is_in_directory(path, directory) && dirname(path) == directory
}

pub fn join(directory: &str, name: &str) -> String {
    if is_root(directory) {
        name.to_string()
    } else {
        format!("{directory}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirname() {
        assert_eq!(dirname("a/b/c.txt"), "a/b");
        assert_eq!(dirname("a"), "");
        assert_eq!(dirname(""), "");
    }

    #[test]
    fn test_ancestors() {
        assert_eq!(ancestors("a/b/c.txt").collect::<Vec<_>>(), vec!["a", "a/b"]);
        assert_eq!(ancestors("a").count(), 0);
        assert_eq!(ancestors("").count(), 0);
    }

    #[test]
    fn test_is_in_directory() {
        assert!(is_in_directory("a/b", "a"));
        assert!(is_in_directory("a/b/c", "a"));
        assert!(is_in_directory("a", ""));
        assert!(!is_in_directory("", ""));
        assert!(!is_in_directory("a", "a"));
        assert!(!is_in_directory("ab/c", "a")); // shared prefix, different segment
        assert!(!is_in_directory("b/a", "a"));
    }

    #[test]
    fn test_is_direct_child() {
        assert!(is_direct_child("a", ""));
        assert!(is_direct_child("a/b", "a"));
        assert!(!is_direct_child("a/b/c", "a"));
        assert!(!is_direct_child("a/b", ""));
        assert!(!is_direct_child("ab", "a"));
    }

    #[test]
    fn test_join() {
        assert_eq!(join("", "a.txt"), "a.txt");
        assert_eq!(join("docs", "a.txt"), "docs/a.txt");
    }
}
