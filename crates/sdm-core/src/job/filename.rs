//! Default target filename derived from the URL path.

/// Fallback when the URL path yields nothing usable.
const DEFAULT_FILENAME: &str = "download.bin";

/// Derives a local filename from the last URL path segment, sanitized for Linux.
///
/// - `https://example.com/a/b/file.deb` → `file.deb`
/// - `https://example.com/` → `download.bin`
pub fn default_target_filename(url: &str) -> String {
    let candidate = url::Url::parse(url).ok().and_then(|parsed| {
        parsed
            .path()
            .split('/')
            .filter(|s| !s.is_empty())
            .last()
            .map(str::to_string)
    });

    match candidate.map(|c| sanitize_filename_for_linux(&c)) {
        Some(name) if !name.is_empty() && name != "." && name != ".." => name,
        _ => DEFAULT_FILENAME.to_string(),
    }
}

/// Sanitizes a candidate filename for safe use on Linux.
///
/// - Replaces NUL, `/`, `\`, whitespace and control characters with `_`
/// - Collapses consecutive underscores
/// - Trims leading/trailing dots and underscores
/// - Limits length to 255 bytes (Linux NAME_MAX)
pub fn sanitize_filename_for_linux(name: &str) -> String {
    const NAME_MAX: usize = 255;

    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let unsafe_char = matches!(c, '\0' | '/' | '\\' | ' ' | '\t') || c.is_control();
        if unsafe_char || c == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(c);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');

    if trimmed.len() > NAME_MAX {
        let mut take = NAME_MAX;
        while take > 0 && !trimmed.is_char_boundary(take) {
            take -= 1;
        }
        trimmed[..take].to_string()
    } else {
        trimmed.to_string()
    }
}
