use proptest::prelude::*;

use qsv_rfc4180::{CharStream, NormalizingSource, Position, ReaderBuilder};

fn normalize_by_hand(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

proptest! {
    #[test]
    fn lf_only_input_is_unchanged(input in "[a-z,\"\n]{0,64}") {
        let mut src = NormalizingSource::new(input.chars(), '\n').unwrap();
        let mut out = String::new();
        while let Some(c) = src.read().unwrap() {
            out.push(c);
        }
        prop_assert_eq!(out, input);
    }

    #[test]
    fn line_endings_collapse_to_one_terminator(input in "[ab\r\n]{0,64}") {
        let expected = normalize_by_hand(&input);
        let mut src = NormalizingSource::new(input.chars(), '\n').unwrap();
        let mut out = String::new();
        let mut line = 1;
        while let Some(c) = src.read().unwrap() {
            if c == '\n' {
                line += 1;
                prop_assert_eq!(src.position(), Position { line, column: 0 });
            }
            prop_assert_ne!(c, '\r');
            out.push(c);
        }
        prop_assert_eq!(src.position().line, 1 + expected.matches('\n').count());
        prop_assert_eq!(out, expected);
    }

    #[test]
    fn peek_is_idempotent(input in "[ab,\r\n]{0,32}", skip in 0usize..32, peeks in 1usize..5) {
        let mut src = NormalizingSource::new(input.chars(), '\n').unwrap();
        for _ in 0..skip {
            src.read().unwrap();
        }
        let position = src.position();
        let first = src.peek();
        for _ in 0..peeks {
            prop_assert_eq!(src.peek(), first);
            prop_assert_eq!(src.position(), position);
        }
        prop_assert_eq!(src.read().unwrap(), first);
    }

    #[test]
    fn plain_fields_round_trip(fields in prop::collection::vec("[a-z0-9 ]{0,8}", 1..8)) {
        let line = fields.join(",");
        let mut reader = ReaderBuilder::new().has_header(false).from_text(&line).unwrap();
        prop_assert_eq!(reader.next_record().unwrap(), fields);
        prop_assert!(!reader.has_next_record());
    }

    #[test]
    fn every_line_ending_style_parses_alike(
        rows in prop::collection::vec(prop::collection::vec("[a-z]{1,4}", 3), 1..6),
        ending in prop::sample::select(vec!["\n", "\r", "\r\n"]),
    ) {
        let text: String = rows.iter().map(|row| format!("{}{}", row.join(","), ending)).collect();
        let reader = ReaderBuilder::new().has_header(false).from_text(&text).unwrap();
        let parsed: Vec<Vec<String>> = reader.into_iter().map(|r| r.unwrap()).collect();
        prop_assert_eq!(parsed, rows);
    }
}
