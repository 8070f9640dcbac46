// Records serialized by the `csv` crate must read back field for field.

use csv::{Terminator, WriterBuilder};
use proptest::prelude::*;

use qsv_rfc4180::{Record, ReaderBuilder};

fn write_csv(records: &[Record], terminator: Terminator) -> String {
    let mut wtr = WriterBuilder::new()
        .terminator(terminator)
        .flexible(true)
        .from_writer(vec![]);
    for record in records {
        wtr.write_record(record).unwrap();
    }
    wtr.flush().unwrap();
    String::from_utf8(wtr.get_ref().clone()).unwrap()
}

fn read_all(text: &str) -> Vec<Record> {
    ReaderBuilder::new()
        .has_header(false)
        .fix_field_count(false)
        .from_text(text)
        .unwrap()
        .into_iter()
        .collect::<Result<_, _>>()
        .unwrap()
}

#[test]
fn test_quoting_written_by_csv_crate() {
    let records: Vec<Record> = vec![
        vec!["plain".into(), "with,comma".into(), "with \"quotes\"".into()],
        vec!["multi\nline".into(), "".into(), " padded ".into()],
        vec!["".into()],
        vec!["\"".into(), "é中".into()],
    ];
    let text = write_csv(&records, Terminator::CRLF);
    assert_eq!(read_all(&text), records);
}

proptest! {
    #[test]
    fn reads_back_what_csv_writes(
        records in prop::collection::vec(
            prop::collection::vec("[a-c ,\"\n]{0,6}", 1..5), 1..8),
        crlf in any::<bool>(),
    ) {
        let terminator = if crlf { Terminator::CRLF } else { Terminator::Any(b'\n') };
        let text = write_csv(&records, terminator);
        prop_assert_eq!(read_all(&text), records);
    }
}
