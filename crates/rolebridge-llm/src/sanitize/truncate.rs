/// Bound verbose tool output to `max_chars`, keeping both ends
///
/// Counts Unicode scalar values, not bytes. When the text is longer than
/// `max_chars`, the first and last `max_chars / 2` characters are kept and
/// the middle is replaced by a marker naming the elided count.
pub fn truncate_middle(text: &str, max_chars: usize) -> String {
    let total = text.chars().count();
    if total <= max_chars {
        return text.to_owned();
    }

    let keep = max_chars / 2;
    let elided = total - 2 * keep;

    let head_end = text.char_indices().nth(keep).map_or(text.len(), |(index, _)| index);
    let tail_start = text
        .char_indices()
        .nth(total - keep)
        .map_or(text.len(), |(index, _)| index);

    format!(
        "{}{}{}",
        &text[..head_end],
        elision_marker(elided),
        &text[tail_start..]
    )
}

/// Text inserted in place of the removed span
pub fn elision_marker(elided: usize) -> String {
    format!("\n\n... [{elided} characters truncated] ...\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_middle("abc", 3), "abc");
        assert_eq!(truncate_middle("", 10), "");
    }

    #[test]
    fn keeps_exact_head_and_tail() {
        let text: String = ('a'..='z').collect();
        let out = truncate_middle(&text, 10);

        assert!(out.starts_with("abcde"));
        assert!(out.ends_with("vwxyz"));
        assert!(out.contains("[16 characters truncated]"));
        assert_eq!(out.chars().count(), 10 + elision_marker(16).chars().count());
    }

    #[test]
    fn odd_budget_rounds_down() {
        let out = truncate_middle("0123456789", 5);
        assert_eq!(out, format!("01{}89", elision_marker(6)));
    }

    #[test]
    fn counts_characters_not_bytes() {
        let text = "é".repeat(40);
        let out = truncate_middle(&text, 20);
        assert!(out.starts_with(&"é".repeat(10)));
        assert!(out.ends_with(&"é".repeat(10)));
        assert!(out.contains("[20 characters truncated]"));
    }

    #[test]
    fn large_log_is_bounded() {
        let text = format!("{}{}{}", "H".repeat(20_000), "M".repeat(20_000), "T".repeat(20_000));
        let out = truncate_middle(&text, 30_000);

        assert_eq!(&out[..15_000], "H".repeat(15_000));
        assert_eq!(&out[out.len() - 15_000..], "T".repeat(15_000));
        assert_eq!(out.len(), 30_000 + elision_marker(30_000).len());
    }
}
