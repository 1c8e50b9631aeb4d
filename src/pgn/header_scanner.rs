//! Permissive tag-pair scanner (C6).
//!
//! Used by the Indexer to pull `[Name "Value"]` pairs out of a header block
//! without invoking the full movetext grammar, so pathological values (an
//! annotator field containing quotes, say) still yield searchable headers
//! even when the grammar would reject the rest of the game.

/// Scan the contiguous run of header lines at the start of `text`.
///
/// Returns the ordered tag pairs found and the byte offset of the first
/// character after the header block (past the separating blank line, if
/// one terminated it). A malformed individual line is skipped rather than
/// aborting the scan.
pub fn scan_header_block(text: &str) -> (Vec<(String, String)>, usize) {
    let mut headers = Vec::new();
    let mut offset = 0usize;

    loop {
        let rest = &text[offset..];
        if rest.is_empty() {
            break;
        }
        let line_len = rest.find('\n').map_or(rest.len(), |i| i + 1);
        let line = &rest[..line_len];
        let trimmed = line.trim_end_matches(['\n', '\r']);
        let content = trimmed.trim();

        if content.is_empty() {
            offset += line_len;
            break;
        }
        if !content.starts_with('[') {
            break;
        }
        if let Some(pair) = scan_tag_pair(content) {
            headers.push(pair);
        }
        offset += line_len;
    }

    (headers, offset)
}

/// Scan a single `[Name "Value"]` line, honoring backslash-escaped quotes.
fn scan_tag_pair(line: &str) -> Option<(String, String)> {
    let inner = line.strip_prefix('[')?.strip_suffix(']')?;
    let chars: Vec<char> = inner.chars().collect();
    let mut idx = 0;

    while idx < chars.len() && chars[idx].is_whitespace() {
        idx += 1;
    }
    let name_start = idx;
    while idx < chars.len() && chars[idx] != '"' && !chars[idx].is_whitespace() {
        idx += 1;
    }
    let name: String = chars[name_start..idx].iter().collect();
    if name.is_empty() {
        return None;
    }

    while idx < chars.len() && chars[idx].is_whitespace() {
        idx += 1;
    }
    if chars.get(idx) != Some(&'"') {
        return None;
    }
    idx += 1;
    let value_start = idx;

    while idx < chars.len() {
        if chars[idx] == '"' && !preceded_by_odd_backslashes(&chars, idx) {
            break;
        }
        idx += 1;
    }
    if idx >= chars.len() {
        return None;
    }

    let raw_value: String = chars[value_start..idx].iter().collect();
    Some((name, unescape(&raw_value)))
}

fn preceded_by_odd_backslashes(chars: &[char], quote_idx: usize) -> bool {
    let mut count = 0;
    let mut j = quote_idx;
    while j > 0 && chars[j - 1] == '\\' {
        count += 1;
        j -= 1;
    }
    count % 2 == 1
}

/// Unescape `\\` then `\"`, in that fixed order.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.peek() {
                Some('\\') => {
                    out.push('\\');
                    chars.next();
                }
                Some('"') => {
                    out.push('"');
                    chars.next();
                }
                _ => out.push(c),
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_simple_header_block() {
        let text = "[Event \"Test\"]\n[Site \"Here\"]\n\n1. e4 *";
        let (headers, offset) = scan_header_block(text);
        assert_eq!(
            headers,
            vec![
                ("Event".to_string(), "Test".to_string()),
                ("Site".to_string(), "Here".to_string()),
            ]
        );
        assert_eq!(&text[offset..], "1. e4 *");
    }

    #[test]
    fn unescapes_quoted_value() {
        let text = "[Annotator \"O\\\"Connor\"]\n\n*";
        let (headers, _) = scan_header_block(text);
        assert_eq!(headers[0].1, "O\"Connor");
    }

    #[test]
    fn stops_at_non_header_line_with_no_blank_separator() {
        let text = "[Event \"Test\"]\n1. e4 *";
        let (headers, offset) = scan_header_block(text);
        assert_eq!(headers.len(), 1);
        assert_eq!(&text[offset..], "1. e4 *");
    }
}
