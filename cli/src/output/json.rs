use anyhow::Result;
use std::io::Write;
use tree_diff::OutcomeEnvelope;

pub fn write_json_report<W: Write>(w: &mut W, envelope: &OutcomeEnvelope<'_>) -> Result<()> {
    serde_json::to_writer_pretty(&mut *w, envelope)?;
    writeln!(w)?;
    Ok(())
}
