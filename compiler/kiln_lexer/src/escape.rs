//! Escape decoding for string and character literals.

/// Decode the escapes in a literal body (quotes already stripped).
///
/// On an unknown escape returns the offending character.
pub(crate) fn unescape(body: &str) -> Result<String, char> {
    let mut result = String::with_capacity(body.len());
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('t') => result.push('\t'),
            Some('0') => result.push('\0'),
            Some('\\') => result.push('\\'),
            Some('\'') => result.push('\''),
            Some('"') => result.push('"'),
            Some(other) => return Err(other),
            None => return Err('\\'),
        }
    }

    Ok(result)
}
