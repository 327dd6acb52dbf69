/// Extensions a sticker name may carry.
pub const ALLOWED_EXTENSIONS: [&str; 2] = [".png", ".webp"];

/// Split `name` at its last `.` into `(base, extension)`.
///
/// The extension keeps its dot. Without a dot the extension is empty.
pub fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) => name.split_at(idx),
        None => (name, ""),
    }
}

/// Make `raw` safe for file systems and archive entries.
///
/// Whitespace runs become `_`, everything outside `[A-Za-z0-9_-]` is dropped, and the result is
/// truncated to `max_len` characters. May return an empty string.
pub fn sanitize_base(raw: &str, max_len: usize) -> String {
    let mut out = String::with_capacity(raw.len().min(max_len));
    let mut in_space = false;
    for c in raw.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
            out.push(c);
        }
    }
    // Only ASCII survives, so byte truncation is char-safe.
    out.truncate(max_len);
    out
}

/// Whether `ext` (with dot) is one of [`ALLOWED_EXTENSIONS`].
pub(crate) fn is_allowed_extension(ext: &str) -> bool {
    ALLOWED_EXTENSIONS.contains(&ext)
}

#[cfg(test)]
#[path = "../../tests/unit/naming/sanitize.rs"]
mod tests;
