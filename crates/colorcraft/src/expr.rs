//! String preparation: the `clean` normalizer and balanced-expression
//! extraction that both [`crate::calc`] and [`crate::parse`] build on.
//!
//! Grounded in the *style* of the teacher's `core::string::parse_css`
//! (hand-written scanning, no regex), generalized from that function's
//! narrow hex/`color()` subset to the full grammar this crate parses.

use crate::error::{Error, ParseError};

/// Trim, collapse interior whitespace runs to a single space, strip the
/// space just inside `(`/`)`, strip any space immediately before a `,`
/// (the space immediately after, if any, survives the whitespace collapse
/// unchanged), rewrite `calc(NaN)` to `0`, and lower-case ASCII letters.
pub fn clean(input: &str) -> String {
    let collapsed = {
        let mut out = String::with_capacity(input.len());
        let mut last_was_space = false;
        for ch in input.trim().chars() {
            if ch.is_whitespace() {
                if !last_was_space {
                    out.push(' ');
                }
                last_was_space = true;
            } else {
                out.push(ch);
                last_was_space = false;
            }
        }
        out
    };

    let mut out = String::with_capacity(collapsed.len());
    let chars: Vec<char> = collapsed.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        match ch {
            '(' => {
                out.push('(');
                while i + 1 < chars.len() && chars[i + 1] == ' ' {
                    i += 1;
                }
            }
            ' ' if matches!(chars.get(i + 1), Some(')') | Some(',')) => {}
            ',' => out.push(','),
            _ => out.push(ch),
        }
        i += 1;
    }

    let lowered = out.to_ascii_lowercase();
    lowered.replace("calc(nan)", "0")
}

/// If `input[start]` is `(`, return the full parenthesized run (matching
/// nesting depth, including the outer parens) and the index just past it.
/// Otherwise, collect a contiguous run of `[A-Za-z0-9-%#]` starting at
/// `start`.
pub fn extract_balanced_expression(input: &str, start: usize) -> Result<(&str, usize), Error> {
    let bytes = input.as_bytes();
    if start >= bytes.len() {
        return Err(ParseError::UnexpectedCharacter {
            offset: start,
            found: '\0',
        }
        .into());
    }

    if bytes[start] == b'(' {
        let mut depth = 0usize;
        let mut end = start;
        for (offset, &b) in bytes[start..].iter().enumerate() {
            match b {
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        end = start + offset + 1;
                        break;
                    }
                }
                _ => {}
            }
        }
        if end == start {
            return Err(ParseError::UnbalancedParens.into());
        }
        Ok((&input[start..end], end))
    } else {
        let mut end = start;
        for &b in &bytes[start..] {
            let c = b as char;
            if c.is_ascii_alphanumeric() || c == '-' || c == '%' || c == '#' {
                end += 1;
            } else {
                break;
            }
        }
        if end == start {
            return Err(ParseError::UnexpectedCharacter {
                offset: start,
                found: bytes[start] as char,
            }
            .into());
        }
        Ok((&input[start..end], end))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn clean_collapses_whitespace_and_lowercases() {
        assert_eq!(clean("  RGB( 1 ,  2,3 )  "), "rgb(1, 2,3)");
    }

    #[test]
    fn clean_rewrites_calc_nan() {
        assert_eq!(clean("calc(NaN)"), "0");
    }

    #[test]
    fn extract_balanced_expression_handles_nesting() {
        let input = "rgb(1 2 calc(3 + (4 * 5)))";
        let start = input.find('(').unwrap();
        let (slice, end) = extract_balanced_expression(input, start).unwrap();
        assert_eq!(slice, "(1 2 calc(3 + (4 * 5)))");
        assert_eq!(end, input.len());
    }

    #[test]
    fn extract_balanced_expression_handles_bare_token() {
        let input = "50% rest";
        let (slice, end) = extract_balanced_expression(input, 0).unwrap();
        assert_eq!(slice, "50%");
        assert_eq!(end, 3);
    }
}
