use crate::input::{parse_delimiter, read_source};
use anyhow::Result;
use std::io::{self, Write};
use std::process::ExitCode;
use tree_diff::{KeySchema, Source};

pub fn run(path: &str, delimiter: &str) -> Result<ExitCode> {
    let delimiter = parse_delimiter(delimiter)?;
    let source = read_source(path, delimiter, KeySchema::new(Vec::<String>::new()))?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_info(&mut handle, &source)?;

    for warning in &source.warnings {
        eprintln!("Warning: {}", warning);
    }

    Ok(ExitCode::from(0))
}

fn write_info<W: Write>(w: &mut W, source: &Source) -> Result<()> {
    let width = source.schema.len();
    let ragged = source
        .rows
        .iter()
        .filter(|row| row.values.len() != width)
        .count();

    writeln!(w, "File: {}", source.label)?;
    writeln!(w, "Fields: {}", width)?;
    for (idx, name) in source.schema.names().iter().enumerate() {
        writeln!(w, "  {:>3}  {}", idx, name)?;
    }
    writeln!(w, "Rows: {}", source.rows.len())?;
    if ragged > 0 {
        writeln!(w, "Rows with a field count other than {}: {}", width, ragged)?;
    }
    Ok(())
}
