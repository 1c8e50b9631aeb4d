//! Hand-rolled recursive-descent PGN grammar (C5).
//!
//! Parses headers, movetext, parenthesised variations, brace and
//! semicolon comments, NAGs, and the terminating result token. This stage
//! is purely syntactic: it does not consult a `Position`, so a malformed
//! SAN token (one that does not parse as a move at all) is a grammar
//! error, while a well-formed SAN token that is illegal in context is left
//! for the caller (`Game` replay) to report as a semantic error.

use super::header_scanner::scan_header_block;
use crate::error::PgnError;

const GLYPHS: [(&str, u8); 6] = [
    ("??", 4),
    ("!!", 3),
    ("!?", 5),
    ("?!", 6),
    ("!", 1),
    ("?", 2),
];

/// One ply in the main line: its SAN text, an optional trailing comment,
/// an optional NAG suffix, and zero or more alternative continuations
/// (variations) branching from the position just before this move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveNode {
    pub san: String,
    pub comment: Option<String>,
    pub suffix: Option<u8>,
    pub variations: Vec<Vec<MoveNode>>,
}

/// The result of parsing one game's PGN text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedGame {
    pub headers: Vec<(String, String)>,
    pub main_line: Vec<MoveNode>,
    pub result: String,
}

/// Parse a single game's PGN text (headers + movetext).
///
/// `strict` disables permissive move syntaxes; this grammar stage itself
/// does not distinguish strict SAN forms (that is Move Generator's job),
/// but strict mode does reject a missing `FEN` tag when `SetUp "1"` is
/// present — a header contract violation surfaced as a grammar error.
pub fn parse(text: &str, strict: bool) -> Result<ParsedGame, PgnError> {
    let (headers, header_len) = scan_header_block(text);

    if strict {
        let has_setup = headers.iter().any(|(k, v)| k == "SetUp" && v == "1");
        let has_fen = headers.iter().any(|(k, _)| k == "FEN");
        if has_setup && !has_fen {
            return Err(PgnError::Grammar {
                offset: 0,
                message: "SetUp \"1\" without a FEN tag".to_string(),
            });
        }
    }

    let movetext = &text[header_len..];
    let chars: Vec<char> = movetext.chars().collect();
    let (main_line, result, _end) = parse_sequence(&chars, 0)?;

    Ok(ParsedGame { headers, main_line, result })
}

fn parse_sequence(chars: &[char], mut pos: usize) -> Result<(Vec<MoveNode>, String, usize), PgnError> {
    let mut nodes: Vec<MoveNode> = Vec::new();
    let mut result = "*".to_string();

    loop {
        pos = skip_noise(chars, pos);
        if pos >= chars.len() || chars[pos] == ')' {
            break;
        }

        match chars[pos] {
            '{' => {
                let (comment, next) = scan_brace_comment(chars, pos)?;
                if let Some(last) = nodes.last_mut() {
                    last.comment = Some(comment);
                }
                pos = next;
            }
            '(' => {
                let (variation, next) = parse_variation(chars, pos + 1)?;
                match nodes.last_mut() {
                    Some(last) => last.variations.push(variation),
                    None => {
                        return Err(PgnError::Grammar {
                            offset: pos,
                            message: "variation with no preceding move".to_string(),
                        })
                    }
                }
                pos = next;
            }
            '[' => {
                return Err(PgnError::Grammar {
                    offset: pos,
                    message: "unexpected '[' found".to_string(),
                });
            }
            _ => {
                let (raw, next) = scan_token(chars, pos);
                if raw.is_empty() {
                    return Err(PgnError::Grammar {
                        offset: pos,
                        message: format!("unexpected '{}' found", chars[pos]),
                    });
                }

                if matches!(raw.as_str(), "1-0" | "0-1" | "1/2-1/2" | "*") {
                    result = raw;
                    pos = next;
                    break;
                }

                if let Some(nag) = parse_standalone_nag(&raw) {
                    if let Some(last) = nodes.last_mut() {
                        last.suffix = Some(nag);
                    }
                    pos = next;
                    continue;
                }

                let (san, suffix) = split_trailing_glyph(&raw);
                nodes.push(MoveNode {
                    san,
                    comment: None,
                    suffix,
                    variations: Vec::new(),
                });
                pos = next;
            }
        }
    }

    Ok((nodes, result, pos))
}

fn parse_variation(chars: &[char], pos: usize) -> Result<(Vec<MoveNode>, usize), PgnError> {
    let (nodes, _result, next) = parse_sequence(chars, pos)?;
    if chars.get(next) != Some(&')') {
        return Err(PgnError::Grammar {
            offset: next,
            message: "unterminated variation".to_string(),
        });
    }
    Ok((nodes, next + 1))
}

/// Skip whitespace, semicolon-to-end-of-line comments, and move-number
/// indicators (`12.`, `12...`).
fn skip_noise(chars: &[char], mut pos: usize) -> usize {
    loop {
        while pos < chars.len() && chars[pos].is_whitespace() {
            pos += 1;
        }
        if chars.get(pos) == Some(&';') {
            while pos < chars.len() && chars[pos] != '\n' {
                pos += 1;
            }
            continue;
        }
        if pos < chars.len() {
            let (tok, next) = scan_token(chars, pos);
            if is_move_number(&tok) {
                pos = next;
                continue;
            }
        }
        return pos;
    }
}

fn is_move_number(tok: &str) -> bool {
    !tok.is_empty()
        && tok.contains(|c: char| c.is_ascii_digit())
        && tok.chars().all(|c| c.is_ascii_digit() || c == '.')
}

fn scan_token(chars: &[char], start: usize) -> (String, usize) {
    let mut end = start;
    while end < chars.len() && !chars[end].is_whitespace() && !"(){}".contains(chars[end]) {
        end += 1;
    }
    (chars[start..end].iter().collect(), end)
}

fn scan_brace_comment(chars: &[char], start: usize) -> Result<(String, usize), PgnError> {
    let mut end = start + 1;
    while end < chars.len() && chars[end] != '}' {
        end += 1;
    }
    if end >= chars.len() {
        return Err(PgnError::Grammar {
            offset: start,
            message: "unterminated comment".to_string(),
        });
    }
    let text: String = chars[start + 1..end].iter().collect();
    Ok((text.trim().to_string(), end + 1))
}

fn parse_standalone_nag(tok: &str) -> Option<u8> {
    if let Some(rest) = tok.strip_prefix('$') {
        return rest.parse().ok();
    }
    GLYPHS.iter().find(|(g, _)| *g == tok).map(|(_, n)| *n)
}

fn split_trailing_glyph(raw: &str) -> (String, Option<u8>) {
    for (glyph, nag) in GLYPHS {
        if raw.len() > glyph.len() && raw.ends_with(glyph) {
            return (raw[..raw.len() - glyph.len()].to_string(), Some(nag));
        }
    }
    (raw.to_string(), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_main_line() {
        let parsed = parse("[Event \"Test\"]\n\n1. e4 e5 2. Nf3 *", false).unwrap();
        assert_eq!(parsed.headers[0], ("Event".to_string(), "Test".to_string()));
        assert_eq!(parsed.main_line.len(), 3);
        assert_eq!(parsed.main_line[0].san, "e4");
        assert_eq!(parsed.result, "*");
    }

    #[test]
    fn attaches_comment_and_suffix_to_preceding_move() {
        let parsed = parse("1. e4!! {best by test} e5 *", false).unwrap();
        assert_eq!(parsed.main_line[0].suffix, Some(3));
        assert_eq!(parsed.main_line[0].comment.as_deref(), Some("best by test"));
    }

    #[test]
    fn parses_variation_branching_from_a_move() {
        let parsed = parse("1. e4 (1. d4 d5) e5 *", false).unwrap();
        assert_eq!(parsed.main_line[0].variations.len(), 1);
        assert_eq!(parsed.main_line[0].variations[0][0].san, "d4");
    }

    #[test]
    fn numeric_nag_attaches_to_preceding_move() {
        let parsed = parse("1. e4 $1 e5 *", false).unwrap();
        assert_eq!(parsed.main_line[0].suffix, Some(1));
    }

    #[test]
    fn strict_mode_rejects_setup_without_fen() {
        let err = parse("[SetUp \"1\"]\n\n1. e4 *", true).unwrap_err();
        assert!(matches!(err, PgnError::Grammar { .. }));
    }

    #[test]
    fn semicolon_comment_runs_to_end_of_line() {
        let parsed = parse("1. e4 ; this is ignored\ne5 *", false).unwrap();
        assert_eq!(parsed.main_line.len(), 2);
    }
}
