//! Lexer invariants over arbitrary input.

use proptest::prelude::*;
use sqlfront_parser::{TokenKind, lex, tokenize};

fn sqlish() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("SELECT ".to_owned()),
            Just("x'1A'".to_owned()),
            Just("'it''s'".to_owned()),
            Just("/* c */".to_owned()),
            Just("-- c\n".to_owned()),
            Just("0x1F".to_owned()),
            Just("1.5e10".to_owned()),
            Just("\u{a0}".to_owned()),
            Just("\u{3000}".to_owned()),
            "[a-z_]{1,6}",
            "[ -~]{1,4}",
        ],
        0..24,
    )
    .prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn token_lengths_cover_input(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let mut expected = 0;
        for token in tokenize(&bytes) {
            prop_assert_eq!(token.offset, expected);
            prop_assert!(!token.is_empty());
            expected = token.end();
        }
        prop_assert_eq!(expected, bytes.len());
    }

    #[test]
    fn every_nonempty_slice_makes_progress(bytes in prop::collection::vec(any::<u8>(), 1..64)) {
        let lexeme = lex(&bytes);
        prop_assert!(lexeme.len >= 1);
        prop_assert!(lexeme.len <= bytes.len());
    }

    #[test]
    fn sql_like_text_tiles_exactly(sql in sqlish()) {
        let total: usize = tokenize(sql.as_bytes()).map(|t| t.len()).sum();
        prop_assert_eq!(total, sql.len());
    }

    #[test]
    fn keyword_case_does_not_matter(upper in prop::bool::ANY) {
        let word = if upper { "WHERE" } else { "where" };
        let lexeme = lex(word.as_bytes());
        prop_assert_eq!(lexeme.kind, TokenKind::KwWhere);
        prop_assert_eq!(lexeme.len, 5);
    }
}
