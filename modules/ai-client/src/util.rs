/// Truncate a string to at most `max_bytes` bytes at a character boundary.
pub fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) && end > 0 {
        end -= 1;
    }
    &s[..end]
}

/// Short single-line preview of a tool result or reply, for logs.
pub fn log_preview(s: &str, max_bytes: usize) -> String {
    let first_line = s.lines().next().unwrap_or_default();
    let cut = truncate_to_char_boundary(first_line, max_bytes);
    if cut.len() < s.len() {
        format!("{cut}...")
    } else {
        cut.to_string()
    }
}
