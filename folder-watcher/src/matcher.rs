//! Extension allow-list for files worth indexing.

/// Extensions that qualify a file for the index. Matching is case-sensitive.
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "gif", "mp4"];

/// Whether a file name ends in one of [`ALLOWED_EXTENSIONS`].
pub fn matches(name: &str) -> bool {
    name.rsplit_once('.')
        .is_some_and(|(_, extension)| ALLOWED_EXTENSIONS.contains(&extension))
}

/// MIME-like type for an allowed extension.
pub(crate) fn mime_from_name(name: &str) -> &'static str {
    match name.rsplit_once('.').map(|(_, extension)| extension) {
        Some("png") => "image/png",
        Some("jpg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("mp4") => "video/mp4",
        _ => "application/octet-stream",
    }
}
