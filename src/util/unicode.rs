use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Display width in terminal cells.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate a string to fit within `max_cells` cells, appending `…` if
/// truncated. Never splits a grapheme cluster.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if max_cells == 0 {
        return String::new();
    }
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    if max_cells <= 1 {
        return "\u{2026}".to_string();
    }
    let budget = max_cells - 1; // reserve 1 cell for '…'
    let mut width = 0;
    let mut result = String::new();
    for grapheme in s.graphemes(true) {
        let gw = UnicodeWidthStr::width(grapheme);
        if width + gw > budget {
            break;
        }
        width += gw;
        result.push_str(grapheme);
    }
    let trimmed = result.trim_end().len();
    result.truncate(trimmed);
    result.push('\u{2026}');
    result
}

/// Truncate or right-pad with spaces to exactly `cells` cells.
pub fn pad_to_width(s: &str, cells: usize) -> String {
    let mut out = truncate_to_width(s, cells);
    let w = display_width(&out);
    if w < cells {
        out.push_str(&" ".repeat(cells - w));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_width_ascii() {
        assert_eq!(display_width("hello"), 5);
    }

    #[test]
    fn display_width_cjk() {
        assert_eq!(display_width("你好"), 4);
    }

    #[test]
    fn display_width_combining() {
        assert_eq!(display_width("cafe\u{0301}"), 4);
    }

    #[test]
    fn truncate_short_string_unchanged() {
        assert_eq!(truncate_to_width("Fix bug", 10), "Fix bug");
    }

    #[test]
    fn truncate_adds_ellipsis_without_trailing_space() {
        assert_eq!(truncate_to_width("Build the login page", 11), "Build the\u{2026}");
    }

    #[test]
    fn truncate_keeps_graphemes_whole() {
        assert_eq!(truncate_to_width("cafe\u{0301} au lait", 5), "cafe\u{0301}\u{2026}");
        assert_eq!(truncate_to_width("你好世界", 5), "你好\u{2026}");
    }

    #[test]
    fn truncate_tiny_budgets() {
        assert_eq!(truncate_to_width("abc", 0), "");
        assert_eq!(truncate_to_width("abc", 1), "\u{2026}");
    }

    #[test]
    fn pad_to_exact_width() {
        assert_eq!(pad_to_width("ab", 4), "ab  ");
        assert_eq!(pad_to_width("abcdef", 4), "abc\u{2026}");
        assert_eq!(display_width(&pad_to_width("你", 3)), 3);
    }
}
