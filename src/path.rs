//! Request path normalization.
//!
//! Collapses repeated slashes, drops `.` segments, resolves `..` against the
//! preceding segment and strips the trailing slash. The result is the key used
//! by both the exact table and the trie, so a route and a request that spell
//! the same location differently still meet.

use crate::error::RouteError;

/// Canonicalizes `raw` in a single left-to-right pass.
///
/// Segments are tracked as `(offset, len)` pairs into `raw`; nothing is copied
/// until the canonical string is assembled at the end.
///
/// ```
/// assert_eq!(pathwise::normalize("/a/./b/../c").unwrap(), "/a/c");
/// assert_eq!(pathwise::normalize("//users//42/").unwrap(), "/users/42");
/// assert!(pathwise::normalize("/../a").is_err());
/// ```
pub fn normalize(raw: &str) -> Result<String, RouteError> {
    let bytes = raw.as_bytes();
    if bytes.first() != Some(&b'/') {
        return Err(RouteError::invalid_path(raw, "expected a path starting with /"));
    }

    let mut segments: Vec<(usize, usize)> = Vec::with_capacity(16);
    let mut total = 0;
    let mut r = 1;
    while r < bytes.len() {
        let end = bytes[r..]
            .iter()
            .position(|&b| b == b'/')
            .map_or(bytes.len(), |i| r + i);

        match &bytes[r..end] {
            b"" | b"." => {}
            b".." => {
                let (_, len) = segments
                    .pop()
                    .ok_or_else(|| RouteError::invalid_path(raw, "trying to go above the root"))?;
                total -= len;
            }
            _ => {
                segments.push((r, end - r));
                total += end - r;
            }
        }
        r = end + 1;
    }

    if segments.is_empty() {
        return Ok("/".to_owned());
    }

    let mut canonical = String::with_capacity(total + segments.len());
    for (start, len) in segments {
        canonical.push('/');
        canonical.push_str(&raw[start..start + len]);
    }
    Ok(canonical)
}
