//! Filename helpers
//!
//! Extension extraction for declared upload names and `publicId` parsing for
//! the `/file/{publicId}{ext}` routes.

/// Longest extension (dot included) accepted as safe
pub const MAX_EXTENSION_LENGTH: usize = 16;

/// Extension of the final path component of `file_name`, dot included.
///
/// Returns an empty string when the name has no extension or ends with a dot.
/// Case is preserved.
pub fn file_extension(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);

    match base.rfind('.') {
        Some(idx) if idx + 1 < base.len() => base[idx..].to_string(),
        _ => String::new(),
    }
}

/// Whether `extension` can be appended verbatim to a storage key: empty, or a
/// dot followed by ASCII alphanumerics.
pub fn is_safe_extension(extension: &str) -> bool {
    if extension.is_empty() {
        return true;
    }
    if extension.len() > MAX_EXTENSION_LENGTH {
        return false;
    }
    match extension.strip_prefix('.') {
        Some(rest) => !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric()),
        None => false,
    }
}

/// Extract the `publicId` from a `{publicId}{extension}` path segment.
///
/// The id is the text before the first dot. A segment with no dot is returned
/// whole; a segment that is empty or starts with a dot yields `None`.
pub fn public_id_from_segment(segment: &str) -> Option<&str> {
    let id = match segment.find('.') {
        Some(0) => return None,
        Some(idx) => &segment[..idx],
        None => segment,
    };
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

/// Display name to store for a file: the caller supplied name when it has
/// non-whitespace content, otherwise the `publicId`.
pub fn display_name(requested: Option<&str>, public_id: &str) -> String {
    match requested.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => public_id.to_string(),
    }
}
