//! Byte-offset indexer for multi-game PGN archives (C7).

use super::header_scanner::scan_header_block;

/// One game's location within a source text, plus its eagerly-scanned
/// headers so callers can filter archives without parsing movetext.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameIndex {
    pub start_offset: usize,
    pub end_offset: usize,
    pub headers: Vec<(String, String)>,
}

/// Index every game in `text` in one O(N) pass.
///
/// A new game starts at the first tag-pair line that follows a blank line
/// (or the start of the text). Malformed individual games never abort the
/// scan — they simply yield an index whose `headers` is partial.
#[must_use]
pub fn index_games(text: &str) -> Vec<GameIndex> {
    let mut indices: Vec<GameIndex> = Vec::new();
    let mut offset = 0usize;
    let mut at_boundary = true;

    while offset < text.len() {
        let rest = &text[offset..];
        let line_len = rest.find('\n').map_or(rest.len(), |i| i + 1);
        let line = &rest[..line_len];
        let content = line.trim_end_matches(['\n', '\r']).trim();

        if content.is_empty() {
            at_boundary = true;
            offset += line_len;
            continue;
        }

        if at_boundary && content.starts_with('[') {
            if let Some(last) = indices.last_mut() {
                last.end_offset = offset;
            }
            let (headers, block_len) = scan_header_block(rest);
            indices.push(GameIndex {
                start_offset: offset,
                end_offset: 0,
                headers,
            });
            offset += block_len;
            at_boundary = false;
            continue;
        }

        at_boundary = false;
        offset += line_len;
    }

    if let Some(last) = indices.last_mut() {
        last.end_offset = text.len();
    }

    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexes_two_games() {
        let text = "[Event \"A\"]\n[White \"Alice\"]\n\n1. e4 e5 *\n\n[Event \"B\"]\n[White \"Carol\"]\n\n1. d4 d5 *\n";
        let indices = index_games(text);
        assert_eq!(indices.len(), 2);
        assert_eq!(indices[0].headers[1], ("White".to_string(), "Alice".to_string()));
        assert_eq!(indices[1].headers[1], ("White".to_string(), "Carol".to_string()));
        assert_eq!(&text[indices[0].start_offset..indices[0].end_offset], &text[..indices[0].end_offset]);
        assert_eq!(indices[1].end_offset, text.len());
    }

    #[test]
    fn handles_escaped_quote_in_header() {
        let text = "[Event \"A\"]\n\n1. e4 *\n\n[Event \"B\"]\n[Annotator \"O\\\"Connor\"]\n\n1. d4 *\n";
        let indices = index_games(text);
        assert_eq!(indices.len(), 2);
        assert_eq!(indices[1].headers[1].1, "O\"Connor");
    }

    #[test]
    fn offsets_sum_at_most_text_length() {
        let text = "[Event \"A\"]\n\n1. e4 *\n";
        let indices = index_games(text);
        let covered: usize = indices.iter().map(|i| i.end_offset - i.start_offset).sum();
        assert!(covered <= text.len());
    }
}
