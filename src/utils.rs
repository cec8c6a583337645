// src/utils.rs
/// Normalize an email address the way the API stores it
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Turn a bare handle into a full profile URL. Blank handles stay blank.
pub fn with_url_prefix(prefix: &str, handle: &str) -> String {
    let handle = handle.trim();
    if handle.is_empty() || handle.starts_with(prefix) {
        return handle.to_string();
    }
    format!("{}{}", prefix, handle)
}

/// Inverse of [`with_url_prefix`]: recover the handle shown in a form
pub fn strip_url_prefix(prefix: &str, value: &str) -> String {
    let value = value.trim();
    value.strip_prefix(prefix).unwrap_or(value).to_string()
}

/// Get file extension in lowercase
pub fn get_file_extension(filename: &str) -> Option<String> {
    std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Mime type for an image extension accepted by the media host
pub fn image_mime_type(ext: &str) -> &'static str {
    match ext {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}
