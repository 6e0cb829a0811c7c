use crate::error::{AnalyzeError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Ident(String),
    LParen,
    RParen,
    Comma,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the token in the source.
    pub position: usize,
}

pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos];
        let kind = match c {
            b if b.is_ascii_whitespace() => {
                pos += 1;
                continue;
            }
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b',' => TokenKind::Comma,
            b'-' | b'.' | b'0'..=b'9' => {
                let end = scan_number(bytes, pos);
                let text = &source[pos..end];
                let value = text
                    .parse::<f64>()
                    .map_err(|_| AnalyzeError::parse(pos, format!("invalid number '{}'", text)))?;
                tokens.push(Token {
                    kind: TokenKind::Number(value),
                    position: pos,
                });
                pos = end;
                continue;
            }
            b if b == b'_' || b.is_ascii_alphabetic() => {
                let end = bytes[pos..]
                    .iter()
                    .position(|b| !(*b == b'_' || b.is_ascii_alphanumeric()))
                    .map_or(bytes.len(), |offset| pos + offset);
                tokens.push(Token {
                    kind: TokenKind::Ident(source[pos..end].to_string()),
                    position: pos,
                });
                pos = end;
                continue;
            }
            _ => {
                let ch = source[pos..].chars().next().unwrap_or('?');
                return Err(AnalyzeError::parse(
                    pos,
                    format!("unexpected character '{}'", ch),
                ));
            }
        };
        tokens.push(Token {
            kind,
            position: pos,
        });
        pos += 1;
    }

    Ok(tokens)
}

/// Returns the end offset of the numeric literal starting at `start`.
fn scan_number(bytes: &[u8], start: usize) -> usize {
    let mut pos = start;
    if bytes.get(pos) == Some(&b'-') {
        pos += 1;
    }
    while pos < bytes.len() && (bytes[pos].is_ascii_digit() || bytes[pos] == b'.') {
        pos += 1;
    }
    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        let mut exp = pos + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        if bytes.get(exp).is_some_and(u8::is_ascii_digit) {
            pos = exp;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
        }
    }
    pos
}
