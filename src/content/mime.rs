//! Extension-keyed content types for served resources.

/// Fixed content-type table. Extensions are matched lowercased.
static MIME_TYPES: &[(&str, &str)] = &[
    ("js", "application/javascript;charset=UTF-8"),
    ("html", "text/html;charset=UTF-8"),
    ("htm", "text/html;charset=UTF-8"),
    ("css", "text/css"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
];

pub const HTML: &str = "text/html;charset=UTF-8";

pub const JAVASCRIPT: &str = "application/javascript;charset=UTF-8";

/// Returns the content type for `filespec` by its last extension, or `None` when
/// the extension is missing or not in the table.
pub fn mime_type(filespec: &str) -> Option<&'static str> {
    let (_, extension) = filespec.rsplit_once('.')?;
    let extension = extension.to_ascii_lowercase();
    MIME_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
}

#[cfg(test)]
#[path = "tests/mime_tests.rs"]
mod tests;
