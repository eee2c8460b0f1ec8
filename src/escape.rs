//! Resolution of character references and predefined entities.

use std::fmt;

/// Error for an XML character reference that cannot be turned into a character.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EscapeError {
    /// Reference has no digits, as in `&#;` or `&#x;`
    Empty,
    /// Cannot convert hexadecimal to a code point: too many digits
    TooLongHexadecimal,
    /// Character is not a valid hexadecimal value
    InvalidHexadecimal(char),
    /// Cannot convert decimal to a code point: too many digits
    TooLongDecimal,
    /// Character is not a valid decimal value
    InvalidDecimal(char),
    /// Code point is outside of the XML `Char` production
    InvalidCodepoint(u32),
}

impl fmt::Display for EscapeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EscapeError::Empty => write!(f, "character reference has no digits"),
            EscapeError::TooLongHexadecimal => {
                write!(f, "cannot convert hexadecimal to code point: too many digits")
            }
            EscapeError::InvalidHexadecimal(e) => {
                write!(f, "'{}' is not a valid hexadecimal character", e)
            }
            EscapeError::TooLongDecimal => {
                write!(f, "cannot convert decimal to code point: too many digits")
            }
            EscapeError::InvalidDecimal(e) => write!(f, "'{}' is not a valid decimal character", e),
            EscapeError::InvalidCodepoint(n) => {
                write!(f, "'{:#x}' is not a legal XML character", n)
            }
        }
    }
}

impl std::error::Error for EscapeError {}

/// Returns the replacement of one of the five entities every XML processor knows.
#[inline]
pub fn resolve_predefined_entity(name: &str) -> Option<&'static str> {
    let s = match name {
        "lt" => "<",
        "gt" => ">",
        "amp" => "&",
        "apos" => "'",
        "quot" => "\"",
        _ => return None,
    };
    Some(s)
}

/// Checks that `code` is allowed by the `Char` production of XML 1.0:
///
/// ```text
/// Char ::= #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]
/// ```
#[inline]
pub const fn is_xml_char(code: u32) -> bool {
    matches!(
        code,
        0x9 | 0xA | 0xD | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x10000..=0x10FFFF
    )
}

/// Parses the digits of a character reference (what is between `&#` or `&#x`
/// and `;`) into the referenced character.
pub fn parse_char_ref(digits: &str, hex: bool) -> Result<char, EscapeError> {
    let code = if hex {
        parse_hexadecimal(digits.as_bytes())
    } else {
        parse_decimal(digits.as_bytes())
    }?;
    if !is_xml_char(code) {
        return Err(EscapeError::InvalidCodepoint(code));
    }
    match std::char::from_u32(code) {
        Some(c) => Ok(c),
        None => Err(EscapeError::InvalidCodepoint(code)),
    }
}

fn parse_hexadecimal(bytes: &[u8]) -> Result<u32, EscapeError> {
    if bytes.is_empty() {
        return Err(EscapeError::Empty);
    }
    let bytes = trim_leading_zeros(bytes);
    // maximum code is 0x10FFFF => 6 characters
    if bytes.len() > 6 {
        return Err(EscapeError::TooLongHexadecimal);
    }
    let mut code = 0;
    for &b in bytes {
        code <<= 4;
        code += match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b - b'a' + 10,
            b'A'..=b'F' => b - b'A' + 10,
            b => return Err(EscapeError::InvalidHexadecimal(b as char)),
        } as u32;
    }
    Ok(code)
}

fn parse_decimal(bytes: &[u8]) -> Result<u32, EscapeError> {
    if bytes.is_empty() {
        return Err(EscapeError::Empty);
    }
    let bytes = trim_leading_zeros(bytes);
    // maximum code is 0x10FFFF = 1114111 => 7 characters
    if bytes.len() > 7 {
        return Err(EscapeError::TooLongDecimal);
    }
    let mut code = 0;
    for &b in bytes {
        code *= 10;
        code += match b {
            b'0'..=b'9' => b - b'0',
            b => return Err(EscapeError::InvalidDecimal(b as char)),
        } as u32;
    }
    Ok(code)
}

fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let zeros = bytes.iter().take_while(|&&b| b == b'0').count();
    &bytes[zeros..]
}

#[test]
fn test_parse_char_ref() {
    assert_eq!(parse_char_ref("65", false), Ok('A'));
    assert_eq!(parse_char_ref("41", true), Ok('A'));
    assert_eq!(parse_char_ref("0000041", true), Ok('A'));
    assert_eq!(parse_char_ref("159", true), Ok('\u{159}'));
    assert_eq!(parse_char_ref("10FFFF", true), Ok('\u{10FFFF}'));
    assert_eq!(parse_char_ref("1114111", false), Ok('\u{10FFFF}'));
}

#[test]
fn test_parse_char_ref_errors() {
    assert_eq!(
        parse_char_ref("110000", true),
        Err(EscapeError::InvalidCodepoint(0x110000))
    );
    assert_eq!(
        parse_char_ref("1114112", false),
        Err(EscapeError::InvalidCodepoint(0x110000))
    );
    assert_eq!(parse_char_ref("0", false), Err(EscapeError::InvalidCodepoint(0)));
    assert_eq!(parse_char_ref("D800", true), Err(EscapeError::InvalidCodepoint(0xD800)));
    assert_eq!(parse_char_ref("FFFE", true), Err(EscapeError::InvalidCodepoint(0xFFFE)));
    assert_eq!(parse_char_ref("1", false), Err(EscapeError::InvalidCodepoint(1)));
    assert_eq!(parse_char_ref("", true), Err(EscapeError::Empty));
    assert_eq!(parse_char_ref("1234567", true), Err(EscapeError::TooLongHexadecimal));
    assert_eq!(parse_char_ref("12345678", false), Err(EscapeError::TooLongDecimal));
}

#[test]
fn test_predefined() {
    assert_eq!(resolve_predefined_entity("lt"), Some("<"));
    assert_eq!(resolve_predefined_entity("quot"), Some("\""));
    assert_eq!(resolve_predefined_entity("nbsp"), None);
    assert_eq!(resolve_predefined_entity("LT"), None);
}
