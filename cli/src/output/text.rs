use crate::commands::diff::Verbosity;
use anyhow::Result;
use std::io::Write;
use tree_diff::{Action, DiffOutcome, DiffRecord};

pub fn write_text_report<W: Write>(
    w: &mut W,
    outcome: &DiffOutcome,
    left_label: &str,
    right_label: &str,
    verbosity: Verbosity,
) -> Result<()> {
    if outcome.is_empty() {
        writeln!(w, "No differences found.")?;
        write_summary(w, outcome)?;
        return Ok(());
    }

    if verbosity != Verbosity::Quiet {
        writeln!(w, "--- {}", left_label)?;
        writeln!(w, "+++ {}", right_label)?;
        writeln!(w)?;

        for action in Action::ALL {
            let records = outcome.diffs().filter_by_action(action);
            if records.is_empty() {
                continue;
            }
            writeln!(w, "{} ({}):", section_title(action), records.len())?;
            for record in records {
                for line in render_record(record, outcome.diff_fields(), verbosity) {
                    writeln!(w, "  {}", line)?;
                }
            }
            writeln!(w)?;
        }
    }

    write_summary(w, outcome)?;
    Ok(())
}

fn section_title(action: Action) -> &'static str {
    match action {
        Action::Add => "Added",
        Action::Delete => "Deleted",
        Action::Update => "Updated",
        Action::Move => "Moved",
    }
}

fn render_record(record: &DiffRecord, diff_fields: &[String], verbosity: Verbosity) -> Vec<String> {
    let mut lines = Vec::new();
    match record.action {
        Action::Add => {
            let line = record.right.as_ref().map(|r| r.line).unwrap_or(0);
            lines.push(format!("{} (line {})", record.key, line));
            if verbosity == Verbosity::Verbose {
                if let Some(row) = &record.right {
                    lines.push(format!("    {}", row.values.join(", ")));
                }
            }
        }
        Action::Delete => {
            let line = record.left.as_ref().map(|r| r.line).unwrap_or(0);
            lines.push(format!("{} (line {})", record.key, line));
            if verbosity == Verbosity::Verbose {
                if let Some(row) = &record.left {
                    lines.push(format!("    {}", row.values.join(", ")));
                }
            }
        }
        Action::Update | Action::Move => {
            let mut header = record.key.to_string();
            if let Some(pos) = record.position_change {
                header.push_str(&format!(" (position {} -> {})", pos.from, pos.to));
            }
            lines.push(header);
            for change in &record.changes {
                lines.push(format!(
                    "    {}: {:?} -> {:?}",
                    change.field, change.old, change.new
                ));
            }
            if verbosity == Verbosity::Verbose && record.changes.len() < diff_fields.len() {
                lines.push(format!(
                    "    ({} of {} compared fields changed)",
                    record.changes.len(),
                    diff_fields.len()
                ));
            }
        }
    }
    lines
}

fn write_summary<W: Write>(w: &mut W, outcome: &DiffOutcome) -> Result<()> {
    let summary = outcome.summary();
    let parts: Vec<String> = Action::ALL
        .iter()
        .map(|&action| format!("{} {}", summary.count(action), action.name()))
        .collect();
    write!(w, "Summary: {}", parts.join(", "))?;
    if let Some(warnings) = summary.warning_count() {
        write!(w, ", {} Warning", warnings)?;
    }
    writeln!(w)?;
    Ok(())
}
