use crate::input::{parse_delimiter, read_source};
use crate::output::{json, text};
use crate::{DiffArgs, OutputFormat};
use anyhow::{Context, Result, bail};
use std::fs;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::debug;
use tree_diff::{
    DiffConfig, DiffOutcome, FieldSelector, KeySchema, MoveDetection, OutcomeEnvelope, TreeDiff,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

pub fn run(args: &DiffArgs, verbose: bool) -> Result<ExitCode> {
    let verbosity = if args.quiet {
        Verbosity::Quiet
    } else if verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    };

    let key_schema = build_key_schema(args)?;
    let config = build_config(args)?;
    let delimiter = parse_delimiter(&args.delimiter)?;
    debug!(keys = ?key_schema.fields(), "resolved key schema");

    let left = read_source(&args.left, delimiter, key_schema.clone())?;
    let right = read_source(&args.right, delimiter, key_schema)?;

    let outcome = TreeDiff::new(left, right).diff(&config)?;

    print_warnings_to_stderr(&outcome);

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match args.format {
        OutputFormat::Text => {
            text::write_text_report(&mut handle, &outcome, &args.left, &args.right, verbosity)?;
        }
        OutputFormat::Json => {
            json::write_json_report(&mut handle, &OutcomeEnvelope::new(&outcome))?;
        }
    }
    handle.flush()?;

    Ok(exit_code_from_outcome(&outcome))
}

fn build_key_schema(args: &DiffArgs) -> Result<KeySchema> {
    if !args.key.is_empty() {
        return Ok(KeySchema::new(args.key.iter().map(String::as_str)));
    }
    match &args.child {
        Some(child) => Ok(KeySchema::from_parent_child(
            args.parent.iter().map(String::as_str),
            child.as_str(),
        )),
        None if !args.parent.is_empty() => {
            bail!("--parent requires --child to name the field that identifies a row")
        }
        None => bail!("Either --key or --child (optionally with --parent) is required"),
    }
}

fn build_config(args: &DiffArgs) -> Result<DiffConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path))?;
            serde_json::from_str::<DiffConfig>(&text)
                .with_context(|| format!("Failed to parse config file: {}", path))?
        }
        None => DiffConfig::default(),
    };

    config
        .ignore_fields
        .extend(args.ignore_fields.iter().map(|s| FieldSelector::parse(s)));
    config.ignore_adds |= args.ignore_adds;
    config.ignore_deletes |= args.ignore_deletes;
    config.ignore_updates |= args.ignore_updates;
    config.ignore_moves |= args.ignore_moves;
    if args.ignore_case {
        config.case_sensitive = false;
    }
    config.trim_whitespace |= args.trim;
    if args.minimal_moves {
        config.move_detection = MoveDetection::Minimal;
    }
    for spec in &args.include {
        let (field, pattern) = parse_filter(spec)?;
        config.include.insert(field, pattern);
    }
    for spec in &args.exclude {
        let (field, pattern) = parse_filter(spec)?;
        config.exclude.insert(field, pattern);
    }

    config.validate()?;
    Ok(config)
}

fn parse_filter(spec: &str) -> Result<(String, String)> {
    match spec.split_once('=') {
        Some((field, pattern)) if !field.is_empty() => Ok((field.to_string(), pattern.to_string())),
        _ => bail!("Filter must look like FIELD=REGEX (got {:?})", spec),
    }
}

fn print_warnings_to_stderr(outcome: &DiffOutcome) {
    for warning in outcome.warnings() {
        eprintln!("Warning: {}", warning);
    }
}

fn exit_code_from_outcome(outcome: &DiffOutcome) -> ExitCode {
    if outcome.is_empty() {
        ExitCode::from(0)
    } else {
        ExitCode::from(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(argv: &[&str]) -> DiffArgs {
        let mut full = vec!["tree-diff", "diff", "l.csv", "r.csv"];
        full.extend_from_slice(argv);
        match crate::Cli::parse_from(full).command {
            crate::Commands::Diff(args) => args,
            _ => panic!("expected diff subcommand"),
        }
    }

    #[test]
    fn key_flag_takes_fields_in_order() {
        let args = parse(&["--key", "level1,level2,name"]);
        let schema = build_key_schema(&args).unwrap();
        assert_eq!(schema.fields(), &["level1", "level2", "name"]);
        assert_eq!(schema.child_field(), Some("name"));
    }

    #[test]
    fn parent_and_child_flags_compose_a_key() {
        let args = parse(&["--parent", "region,team", "--child", "person"]);
        let schema = build_key_schema(&args).unwrap();
        assert_eq!(schema.fields(), &["region", "team", "person"]);
    }

    #[test]
    fn missing_key_is_an_error() {
        assert!(build_key_schema(&parse(&[])).is_err());
        assert!(build_key_schema(&parse(&["--parent", "a"])).is_err());
    }

    #[test]
    fn flags_map_onto_config() {
        let args = parse(&[
            "--key",
            "id",
            "--ignore-fields",
            "note,3",
            "--ignore-moves",
            "--ignore-case",
            "--minimal-moves",
            "--exclude",
            "id=^tmp",
        ]);
        let config = build_config(&args).unwrap();
        assert_eq!(
            config.ignore_fields,
            vec![FieldSelector::Name("note".into()), FieldSelector::Index(3)]
        );
        assert!(config.ignore_moves);
        assert!(!config.case_sensitive);
        assert_eq!(config.move_detection, MoveDetection::Minimal);
        assert_eq!(config.exclude.get("id").map(String::as_str), Some("^tmp"));
    }

    #[test]
    fn malformed_filters_are_rejected() {
        assert!(parse_filter("no-equals").is_err());
        assert!(parse_filter("=x").is_err());
        assert_eq!(
            parse_filter("name=a=b").unwrap(),
            ("name".to_string(), "a=b".to_string())
        );
        let args = parse(&["--key", "id", "--include", "id=["]);
        assert!(build_config(&args).is_err());
    }
}
