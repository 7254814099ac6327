use crate::error::DecodeError;

/// Parses an asm immediate such as `#4`, `#-12`, `#+0x4` or `#-0x10`.
pub fn parse_literal(text: &str) -> Result<i64, DecodeError> {
    let invalid = || DecodeError::InvalidLiteral(text.to_string());
    let body = text.trim().strip_prefix('#').ok_or_else(invalid)?;
    let (negative, digits) = match body.as_bytes().first() {
        Some(b'-') => (true, &body[1..]),
        Some(b'+') => (false, &body[1..]),
        _ => (false, body),
    };
    let magnitude = match digits.find("0x") {
        Some(hex_begin) => i64::from_str_radix(&digits[hex_begin + 2..], 16),
        None => digits.parse::<i64>(),
    }
    .map_err(|_| invalid())?;
    Ok(if negative { -magnitude } else { magnitude })
}

/// Interior of the first `open ... close` pair in `text`.
pub fn enclosed(text: &str, open: char, close: char) -> Result<&str, DecodeError> {
    let malformed = || DecodeError::MalformedLine(text.to_string());
    let begin = text.find(open).ok_or_else(malformed)? + open.len_utf8();
    let end = text[begin..].find(close).ok_or_else(malformed)? + begin;
    Ok(&text[begin..end])
}

/// Comma separated operands, whitespace trimmed.
pub fn split_operands(text: &str) -> Vec<&str> {
    text.split(',').map(str::trim).collect()
}
