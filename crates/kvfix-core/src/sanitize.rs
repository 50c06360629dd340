//! Text cleanup applied to values that fail strict parsing
//!
//! Removes exactly two kinds of damage:
//! - one leading byte-order mark (U+FEFF)
//! - C0 control characters other than tab, line feed and carriage return
//!
//! Anything else is left as is, so a value whose damage is of another kind
//! comes back unchanged and can be told apart by comparison.

use std::borrow::Cow;

/// Byte-order mark left behind by some editors and encoders
pub const BYTE_ORDER_MARK: char = '\u{feff}';

/// Whether `c` is one of the control characters sanitization removes
///
/// Covers 0x00-0x08, 0x0B, 0x0C and 0x0E-0x1F.
#[inline]
#[must_use]
pub fn is_stripped_control(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{08}' | '\u{0b}' | '\u{0c}' | '\u{0e}'..='\u{1f}')
}

/// Strip a single leading BOM and all stripped control characters
///
/// Borrows the input when there is nothing to remove.
#[must_use]
pub fn sanitize(raw: &str) -> Cow<'_, str> {
    let body = raw.strip_prefix(BYTE_ORDER_MARK).unwrap_or(raw);
    if !body.chars().any(is_stripped_control) {
        return Cow::Borrowed(body);
    }
    Cow::Owned(body.chars().filter(|&c| !is_stripped_control(c)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn strips_leading_bom() {
        assert_eq!(sanitize("\u{feff}{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn strips_only_one_bom() {
        assert_eq!(sanitize("\u{feff}\u{feff}{}"), "\u{feff}{}");
    }

    #[test]
    fn keeps_bom_that_is_not_leading() {
        assert_eq!(sanitize("{\"a\":\"\u{feff}\"}"), "{\"a\":\"\u{feff}\"}");
    }

    #[test]
    fn strips_control_chars() {
        let input = "{\"a\":\u{01}1,\u{0b}\"b\":\"x\u{1f}y\"}\u{00}";
        assert_eq!(sanitize(input), "{\"a\":1,\"b\":\"xy\"}");
    }

    #[test]
    fn preserves_tab_newline_and_del() {
        let input = "{\t\"a\"\r\n:1}\u{7f}";
        assert_eq!(sanitize(input), input);
    }

    #[test]
    fn borrows_when_clean() {
        assert!(matches!(sanitize("{not json"), Cow::Borrowed(_)));
        assert!(matches!(sanitize(""), Cow::Borrowed(_)));
    }

    #[test]
    fn preserves_unicode() {
        let input = "{\"name\":\"Hôtel 日本\"}";
        assert_eq!(sanitize(input), input);
    }

    proptest! {
        #[test]
        fn output_has_no_stripped_controls(input in any::<String>()) {
            prop_assert!(!sanitize(&input).chars().any(is_stripped_control));
        }

        #[test]
        fn removes_nothing_else(input in any::<String>()) {
            let body = input.strip_prefix(BYTE_ORDER_MARK).unwrap_or(&input);
            let expected: String = body.chars().filter(|&c| !is_stripped_control(c)).collect();
            prop_assert_eq!(sanitize(&input).into_owned(), expected);
        }

        #[test]
        fn is_idempotent_without_bom(input in "[^\u{feff}]*") {
            let once = sanitize(&input).into_owned();
            prop_assert_eq!(sanitize(&once).into_owned(), once.clone());
        }
    }
}
