//! Blob naming helpers
//!
//! Stored blob names follow `{folder}/{sanitized_name}{extension}`. The
//! namespace is content-addressed by name: an identical logical name implies
//! identical content, which is what makes skip-if-exists uploads safe.

use crate::models::EmoteMime;

/// Sanitize an emote display name for use as a file name.
///
/// Keeps alphanumerics, `.`, `_`, `-` and space; everything else becomes `_`.
pub fn sanitize_display_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '_' | '-' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// File name for a stored emote, extension derived from the variant mime
pub fn blob_file_name(display_name: &str, mime: EmoteMime) -> String {
    format!("{}{}", sanitize_display_name(display_name), mime.extension())
}
