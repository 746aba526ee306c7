//! Filesystem path normalization for registry keys and lookups

use std::borrow::Cow;

/// Size of the lookup working buffer, terminator included. Requested paths
/// longer than `MAX_PATH - 1` bytes are truncated before matching.
pub const MAX_PATH: usize = 1024;

/// Collapse runs of `/` into a single `/`.
pub fn collapse_slashes(path: &str) -> Cow<'_, str> {
    if !path.contains("//") {
        return Cow::Borrowed(path);
    }

    let mut out = String::with_capacity(path.len());
    let mut prev_slash = false;
    for c in path.chars() {
        if c == '/' {
            if prev_slash {
                continue;
            }
            prev_slash = true;
        } else {
            prev_slash = false;
        }
        out.push(c);
    }
    Cow::Owned(out)
}

/// Bound a requested path to the working buffer, then collapse slashes.
///
/// Truncation never splits a UTF-8 sequence; it backs off to the previous
/// character boundary instead.
pub fn normalize_request_path(path: &str) -> Cow<'_, str> {
    collapse_slashes(truncate(path, MAX_PATH - 1))
}

fn truncate(path: &str, limit: usize) -> &str {
    if path.len() <= limit {
        return path;
    }
    let mut end = limit;
    while !path.is_char_boundary(end) {
        end -= 1;
    }
    &path[..end]
}
