use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::Parser;
use qsv_rfc4180::{CharSource, CsvReader, ReaderBuilder, Result};
use tabwriter::TabWriter;
use tracing_subscriber::EnvFilter;

/// Read an RFC 4180 CSV file and print its records as an aligned table.
#[derive(Debug, Parser)]
#[command(name = "csvread", version)]
struct Args {
    /// CSV file to read (stdin when omitted)
    path: Option<PathBuf>,
    /// The first record is data, not a header
    #[arg(long)]
    no_header: bool,
    /// Allow records with differing numbers of fields
    #[arg(long, conflicts_with = "field_count")]
    flexible: bool,
    /// Require exactly this many fields in every record
    #[arg(long)]
    field_count: Option<usize>,
    /// Allow repeated names in the header
    #[arg(long)]
    allow_duplicate_names: bool,
    /// Field separator
    #[arg(short, long, default_value_t = ',')]
    separator: char,
    /// Quote character
    #[arg(short, long, default_value_t = '"')]
    quote: char,
    /// Record terminator every line ending is converted to
    #[arg(short, long, default_value_t = '\n')]
    terminator: char,
    /// Only the terminator ends a record; CR and LF are otherwise read as data
    #[arg(long)]
    raw_line_endings: bool,
    /// Raise the log level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let builder = reader_builder(&args);
    let result = match args.path {
        Some(ref path) => builder.from_path(path).and_then(print_records),
        None => {
            let stdin: Box<dyn Read> = Box::new(io::stdin().lock());
            builder.from_reader(stdin).and_then(print_records)
        }
    };
    if let Err(err) = result {
        eprintln!("ERROR: {}", err);
        ::std::process::exit(1);
    }
}

fn reader_builder(args: &Args) -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder
        .has_header(!args.no_header)
        .fix_field_count(!args.flexible)
        .distinct_header_names(!args.allow_duplicate_names)
        .separator(args.separator)
        .quote(args.quote)
        .terminator(args.terminator)
        .normalize_line_endings(!args.raw_line_endings);
    if let Some(count) = args.field_count {
        builder.field_count(count);
    }
    builder
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

// one table row; fields are escaped so embedded tabs and line breaks keep the columns aligned
fn table_row(label: &str, fields: &[String]) -> String {
    let mut row = label.to_string();
    for field in fields {
        row.push('\t');
        row.extend(field.escape_debug());
    }
    row
}

fn print_records<S: CharSource>(mut reader: CsvReader<S>) -> Result<()> {
    let stdout = io::stdout();
    let mut tw = TabWriter::new(stdout.lock());
    if let Some(header) = reader.header() {
        writeln!(tw, "{}", table_row("#", header))?;
    }
    let mut n_records = 0usize;
    for record in reader.records() {
        let record = record?;
        n_records += 1;
        writeln!(tw, "{}", table_row(&n_records.to_string(), &record))?;
    }
    tw.flush()?;
    drop(tw);

    let mut out = stdout.lock();
    writeln!(out)?;
    writeln!(out, "{}", reader.dialect())?;
    writeln!(out, "Records: {}", n_records)?;
    match reader.field_count() {
        Some(count) => writeln!(out, "Fields per record: {}", count)?,
        None => writeln!(out, "Fields per record: not fixed")?,
    }
    writeln!(out, "Line endings: {}", reader.line_endings())?;
    Ok(())
}
