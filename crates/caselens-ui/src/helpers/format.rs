// crates/caselens-ui/src/helpers/format.rs
//
// UI-layer string utilities that don't belong in caselens-core.
//
// Time and duration formatting lives in caselens_core::helpers::time — use
// those for anything involving seconds/frames.  This module holds utilities
// that are purely about rendering strings in the UI (truncation, labels) and
// have no meaning outside of a display context.

/// Truncates `s` to at most `max` bytes, never splitting a multibyte
/// character. Used by the sources panel and region list to keep names from
/// overflowing their fixed-width rows.
///
/// # Note on units
/// `max` is a *byte* count, not a character count.  For ASCII names (the
/// common case) the two are equivalent.  For multibyte characters the
/// returned slice may be shorter than `max` characters; it will never split
/// a codepoint.
pub fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    // Walk character boundaries until we exceed `max`, then step back one.
    s.char_indices()
        .map(|(i, _)| i)
        .take_while(|&i| i <= max)
        .last()
        .map(|i| &s[..i])
        .unwrap_or("")
}

/// Renders a confidence fraction as a percentage label ("87%"). Values are
/// clamped so a misbehaving collaborator can't render "240%".
pub fn confidence_label(confidence: f32) -> String {
    let pct = (confidence.clamp(0.0, 1.0) * 100.0).round() as u32;
    format!("{pct}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_string_is_unchanged() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello", 5),  "hello");
    }

    #[test]
    fn long_ascii_is_clipped() {
        assert_eq!(truncate("hello world", 5), "hello");
    }

    #[test]
    fn empty_input() {
        assert_eq!(truncate("", 5), "");
    }

    #[test]
    fn multibyte_does_not_split_codepoint() {
        // "é" is two bytes (0xC3 0xA9). max=1 must not split it.
        let s = "élan";
        let t = truncate(s, 1);
        assert!(std::str::from_utf8(t.as_bytes()).is_ok());
        assert!(t.is_empty() || t == "é" || t.len() <= 1);
    }

    #[test]
    fn confidence_is_clamped_to_a_percentage() {
        assert_eq!(confidence_label(0.87),  "87%");
        assert_eq!(confidence_label(2.4),   "100%");
        assert_eq!(confidence_label(-0.5),  "0%");
    }
}
