//! Canonical request-path form.
//!
//! The router matches on it and the response cache keys on it, so every alias
//! of a resource (`/players`, `/players/`, `//players//`) resolves to one
//! handler and one cache entry.

use std::borrow::Cow;

/// Returns the canonical form of `path`: runs of `/` collapse to one and
/// trailing slashes are stripped, except that the root stays `/`. An empty
/// path is treated as the root.
///
/// Already-canonical paths are borrowed, not copied.
///
/// # Examples
///
/// ```
/// use players_api::http::path::normalize;
///
/// assert_eq!(normalize("/players/"), "/players");
/// assert_eq!(normalize("/players//1"), "/players/1");
/// assert_eq!(normalize("/"), "/");
/// assert_eq!(normalize(""), "/");
/// ```
pub fn normalize(path: &str) -> Cow<'_, str> {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return Cow::Borrowed("/");
    }
    if trimmed.starts_with('/') && !trimmed.contains("//") {
        return Cow::Borrowed(trimmed);
    }

    let mut canonical = String::with_capacity(trimmed.len() + 1);
    for segment in trimmed.split('/').filter(|s| !s.is_empty()) {
        canonical.push('/');
        canonical.push_str(segment);
    }
    Cow::Owned(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_collapse() {
        assert_eq!(normalize("/players/1/"), normalize("/players/1"));
        assert_eq!(normalize("/players///"), "/players");
    }

    #[test]
    fn root_is_preserved() {
        assert_eq!(normalize("///"), "/");
    }

    #[test]
    fn repeated_interior_slashes_collapse() {
        assert_eq!(normalize("/players//1"), "/players/1");
        assert_eq!(normalize("//players/squadnumber///10/"), "/players/squadnumber/10");
    }

    #[test]
    fn canonical_path_is_borrowed() {
        assert!(matches!(normalize("/players/10"), Cow::Borrowed("/players/10")));
    }
}
