//! Lexical path handling for entry names.
//!
//! Entry names are compared as strings, never resolved against a filesystem.  Both matching modes
//! operate on [`clean`]ed names, so `./etc//passwd` and `etc/passwd` are the same entry.

/// How a walk root is matched against entry paths.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum PrefixMatch {
    /// Plain string prefix of the cleaned paths.  A root of `foo` also matches `foobar`.
    #[default]
    String,
    /// Segment-aware containment: `foo` matches `foo` and `foo/bar`, but not `foobar`.
    Segment,
}

impl PrefixMatch {
    pub fn matches(self, root: &str, path: &str) -> bool {
        match self {
            PrefixMatch::String => has_prefix(path, root),
            PrefixMatch::Segment => is_parent(root, path),
        }
    }
}

/// Returns the shortest path name equivalent to `path` by purely lexical processing:
///
///  - repeated separators are collapsed
///  - `.` segments are removed
///  - `..` segments remove the preceding non-`..` segment; at the start of an absolute path they
///    are dropped, at the start of a relative path they are kept
///  - trailing separators are removed
///
/// An empty result becomes `.`.
pub fn clean(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = vec![];

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if rooted => {}
                _ => segments.push(".."),
            },
            _ => segments.push(segment),
        }
    }

    let joined = segments.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => String::from("."),
        (false, false) => joined,
    }
}

/// String-prefix test on cleaned paths.
pub fn has_prefix(path: &str, root: &str) -> bool {
    clean(path).starts_with(&clean(root))
}

/// Segment-aware test: is `path` equal to `root` or somewhere below it?
///
/// A root of `.` contains every relative path and `/` contains every absolute path.
pub fn is_parent(root: &str, path: &str) -> bool {
    let root = clean(root);
    let path = clean(path);

    if root == "." {
        return !path.starts_with('/') && path != ".." && !path.starts_with("../");
    }

    match path.strip_prefix(&root) {
        Some("") => true,
        Some(rest) => root.ends_with('/') || rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod test {
    use similar_asserts::assert_eq;

    use super::*;

    #[test]
    fn test_clean() {
        let cases = [
            ("", "."),
            (".", "."),
            ("./", "."),
            ("/", "/"),
            ("//", "/"),
            ("abc", "abc"),
            ("abc/", "abc"),
            ("./abc", "abc"),
            ("abc//def", "abc/def"),
            ("abc/./def/", "abc/def"),
            ("abc/def/..", "abc"),
            ("abc/../../def", "../def"),
            ("../../abc", "../../abc"),
            ("/../abc", "/abc"),
            ("/abc/../..", "/"),
            ("abc/..", "."),
            ("a/b/c/../../d", "a/d"),
        ];
        for (input, expected) in cases {
            assert_eq!(clean(input), expected, "clean({input:?})");
        }
    }

    #[test]
    fn test_has_prefix() {
        assert!(has_prefix("a/1.txt", "a"));
        assert!(has_prefix("./a/1.txt", "a/"));
        assert!(has_prefix("a", "a"));
        assert!(!has_prefix("b/1.txt", "a"));
        // the string comparison does not respect segment boundaries
        assert!(has_prefix("foobar", "foo"));
    }

    #[test]
    fn test_is_parent() {
        assert!(is_parent("a", "a/1.txt"));
        assert!(is_parent("a/", "./a//1.txt"));
        assert!(is_parent("a", "a"));
        assert!(is_parent("a/b", "a/b/c/d"));
        assert!(!is_parent("foo", "foobar"));
        assert!(!is_parent("a/b", "a"));
        assert!(!is_parent("b", "a/1.txt"));

        assert!(is_parent(".", "a/1.txt"));
        assert!(is_parent("", "a"));
        assert!(!is_parent(".", "/etc"));
        assert!(!is_parent(".", "../escape"));
        assert!(is_parent(".", "..hidden"));

        assert!(is_parent("/", "/etc/passwd"));
        assert!(is_parent("/etc", "/etc/passwd"));
        assert!(!is_parent("/", "etc/passwd"));
    }

    #[test]
    fn test_prefix_match() {
        assert_eq!(PrefixMatch::default(), PrefixMatch::String);
        assert!(PrefixMatch::String.matches("foo", "foobar"));
        assert!(!PrefixMatch::Segment.matches("foo", "foobar"));
        assert!(PrefixMatch::Segment.matches("foo", "foo/bar"));
    }
}
