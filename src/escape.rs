//! Backslash escapes for double-quoted literals.
//!
//! [`escape`] and [`unescape`] are inverses: every string produced by
//! `escape` is accepted by `unescape` and decodes back to the original.

use crate::utils::SyntaxError;

/// Escape `text` for use between double quotes
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\000"),
            c if c.is_control() => out.push_str(&format!("\\u{{{:x}}}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// Decode the body of a double-quoted literal.
///
/// Accepts the single-character escapes `\a \b \f \n \r \t \v \\ \" \'`,
/// three-digit octal `\OOO` and `\xHH` for ASCII, and the unicode forms
/// `\uHHHH`, `\u{H..}` and `\UHHHHHHHH`.
pub fn unescape(raw: &str) -> Result<String, SyntaxError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }

        let Some(kind) = chars.next() else {
            return Err(malformed("\\"));
        };
        let decoded = match kind {
            'a' => '\x07',
            'b' => '\x08',
            'f' => '\x0c',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\x0b',
            '0'..='7' => {
                let code = octal(&mut chars, kind)?;
                if code > 0x7f {
                    return Err(malformed(&format!("\\{:03o}", code)));
                }
                code_point(code, kind)?
            }
            '\\' | '"' | '\'' => kind,
            'x' => {
                let code = fixed_hex(&mut chars, 2, kind)?;
                if code > 0x7f {
                    return Err(malformed(&format!("\\x{:02x}", code)));
                }
                code_point(code, kind)?
            }
            'u' if chars.as_str().starts_with('{') => {
                let rest = &chars.as_str()[1..];
                let Some(end) = rest.find('}') else {
                    return Err(malformed(&format!("\\u{{{}", rest)));
                };
                let digits = &rest[..end];
                if digits.is_empty() || digits.len() > 6 || !is_hex(digits) {
                    return Err(malformed(&format!("\\u{{{}}}", digits)));
                }
                let code = u32::from_str_radix(digits, 16)
                    .map_err(|_| malformed(&format!("\\u{{{}}}", digits)))?;
                chars = rest[end + 1..].chars();
                code_point(code, kind)?
            }
            'u' => code_point(fixed_hex(&mut chars, 4, kind)?, kind)?,
            'U' => code_point(fixed_hex(&mut chars, 8, kind)?, kind)?,
            other => return Err(malformed(&format!("\\{}", other))),
        };
        out.push(decoded);
    }

    Ok(out)
}

/// Consume exactly `len` hex digits following an escape of the given kind
fn fixed_hex(chars: &mut std::str::Chars<'_>, len: usize, kind: char) -> Result<u32, SyntaxError> {
    let rest = chars.as_str();
    let digits = match rest.get(..len) {
        Some(d) if is_hex(d) => d,
        _ => {
            let shown: String = rest.chars().take(len).collect();
            return Err(malformed(&format!("\\{}{}", kind, shown)));
        }
    };
    let code = u32::from_str_radix(digits, 16)
        .map_err(|_| malformed(&format!("\\{}{}", kind, digits)))?;
    *chars = rest[len..].chars();
    Ok(code)
}

/// Consume the two octal digits that follow the leading digit `first`
fn octal(chars: &mut std::str::Chars<'_>, first: char) -> Result<u32, SyntaxError> {
    let rest = chars.as_str();
    match rest.get(..2) {
        Some(tail) if tail.chars().all(|c| ('0'..='7').contains(&c)) => {
            let code = u32::from_str_radix(&format!("{}{}", first, tail), 8)
                .map_err(|_| malformed(&format!("\\{}{}", first, tail)))?;
            *chars = rest[2..].chars();
            Ok(code)
        }
        _ => {
            let shown: String = rest.chars().take(2).collect();
            Err(malformed(&format!("\\{}{}", first, shown)))
        }
    }
}

fn code_point(code: u32, kind: char) -> Result<char, SyntaxError> {
    char::from_u32(code).ok_or_else(|| malformed(&format!("\\{} (invalid code point {:#x})", kind, code)))
}

fn is_hex(digits: &str) -> bool {
    digits.chars().all(|c| c.is_ascii_hexdigit())
}

fn malformed(seq: &str) -> SyntaxError {
    SyntaxError::MalformedEscape(seq.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_escapes() {
        assert_eq!(unescape(r#"a\"b\\c"#).unwrap(), "a\"b\\c");
        assert_eq!(unescape(r"tab\there\nnl").unwrap(), "tab\there\nnl");
        assert_eq!(unescape(r"\a\b\f\v\'").unwrap(), "\x07\x08\x0c\x0b'");
        assert_eq!(unescape("plain").unwrap(), "plain");
    }

    #[test]
    fn test_numeric_escapes() {
        assert_eq!(unescape(r"\x41\x7e").unwrap(), "A~");
        assert_eq!(unescape(r"\012").unwrap(), "\n");
        assert_eq!(unescape(r"\000x\101\177").unwrap(), "\0xA\x7f");
        assert_eq!(unescape(r"é").unwrap(), "é");
        assert_eq!(unescape(r"\u{1F600}!").unwrap(), "😀!");
        assert_eq!(unescape(r"\U0001F600").unwrap(), "😀");
    }

    #[test]
    fn test_malformed_escapes() {
        assert_eq!(unescape(r"\q"), Err(SyntaxError::MalformedEscape(r"\q".to_string())));
        assert!(unescape(r"\x").is_err());
        assert_eq!(unescape(r"\0x"), Err(SyntaxError::MalformedEscape(r"\0x".to_string())));
        assert!(unescape(r"\0").is_err());
        assert!(unescape(r"\01").is_err());
        assert!(unescape(r"\018").is_err());
        assert!(unescape(r"\200").is_err());
        assert!(unescape(r"\377").is_err());
        assert!(unescape(r"\xff").is_err());
        assert!(unescape(r"\x+1").is_err());
        assert!(unescape(r"\u12").is_err());
        assert!(unescape(r"\u{}").is_err());
        assert!(unescape(r"\u{110000}").is_err());
        assert!(unescape(r"\u{41").is_err());
        assert!(unescape(r"\uD800").is_err());
        assert!(unescape("trailing\\").is_err());
    }

    #[test]
    fn test_escape_is_inverse() {
        let samples = [
            "",
            "hello",
            "say \"hi\"",
            "back\\slash",
            "line\nbreak\r\n",
            "tab\tand\0nul",
            "bell\x07 and \x1b escape",
            "unicode é 😀",
        ];
        for s in samples {
            assert_eq!(unescape(&escape(s)).unwrap(), s, "escaped: {}", escape(s));
        }
    }

    #[test]
    fn test_escape_output() {
        assert_eq!(escape("a\"b"), r#"a\"b"#);
        assert_eq!(escape("\x1b"), r"\u{1b}");
        assert_eq!(escape("é"), "é");
        assert_eq!(escape("nul\0"), r"nul\000");
    }
}
