/// Cut `s` to at most `max` characters on a char boundary, appending `...`
/// when anything was removed.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

/// Prefix of at most `max` characters, without an ellipsis.
pub fn prefix_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_strings_unchanged() {
        assert_eq!(truncate_chars("calm", 10), "calm");
        assert_eq!(truncate_chars("calm", 4), "calm");
    }

    #[test]
    fn multibyte_safe() {
        assert_eq!(truncate_chars("ভালো আছি", 4), "ভালো...");
        assert_eq!(prefix_chars("😀😀😀", 2), "😀😀");
    }
}
