//! Text utilities for TUI rendering.

use unicode_width::UnicodeWidthChar;

/// Wrap text with an indent prefix, breaking at spaces where possible.
///
/// Widths are measured in terminal columns, so wide characters count double.
pub fn wrap_text_indented(text: &str, width: usize, indent: &str) -> Vec<String> {
    let effective_width = width.saturating_sub(indent.chars().count());

    if effective_width == 0 {
        return vec![format!("{}{}", indent, text)];
    }

    let mut lines = Vec::new();

    for line in text.split('\n') {
        if line.is_empty() {
            lines.push(indent.to_string());
            continue;
        }

        let chars: Vec<char> = line.chars().collect();
        let mut start = 0;

        while start < chars.len() {
            // Take as many chars as fit in the available columns.
            let mut end = start;
            let mut columns = 0;
            while end < chars.len() {
                let w = UnicodeWidthChar::width(chars[end]).unwrap_or(1);
                if columns + w > effective_width && end > start {
                    break;
                }
                columns += w;
                end += 1;
            }

            if end == chars.len() {
                let remaining: String = chars[start..].iter().collect();
                lines.push(format!("{}{}", indent, remaining));
                break;
            }

            // Prefer breaking at the last space in range
            let actual_end = chars[start..end]
                .iter()
                .rposition(|&c| c == ' ')
                .filter(|&offset| offset > 0)
                .map_or(end, |offset| start + offset);

            let chunk: String = chars[start..actual_end].iter().collect();
            lines.push(format!("{}{}", indent, chunk.trim_end()));

            // Skip past the space
            start = actual_end;
            while start < chars.len() && chars[start] == ' ' {
                start += 1;
            }
        }
    }

    if lines.is_empty() {
        lines.push(indent.to_string());
    }

    lines
}

/// Truncate a string to fit within a given width, adding ellipsis if needed.
pub fn truncate(text: &str, max_width: usize) -> String {
    if max_width < 3 {
        return text.chars().take(max_width).collect();
    }

    let total: usize = text
        .chars()
        .map(|c| UnicodeWidthChar::width(c).unwrap_or(1))
        .sum();
    if total <= max_width {
        return text.to_string();
    }

    let mut width = 0;
    let mut result = String::new();

    for ch in text.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(1);
        if width + ch_width > max_width - 3 {
            break;
        }
        result.push(ch);
        width += ch_width;
    }
    result.push_str("...");
    result
}
