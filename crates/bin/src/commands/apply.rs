//! Apply command - replays a file of change events onto a JSON document.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};
use ysync::{ChangeOp, Config, Replica, Value};

use crate::cli::ApplyArgs;
use crate::output::{OutputFormat, print_table};

/// One line of the event stream.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Line {
    /// `{"batch": "begin"}` or `{"batch": "end"}`
    Batch { batch: Marker },
    Change(ChangeOp),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Marker {
    Begin,
    End,
}

/// Run the apply command
pub fn run(args: &ApplyArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => serde_json::from_str::<Config>(&fs::read_to_string(path)?)?,
        None => Config::default(),
    };
    if args.buffer_batches {
        config = config.with_buffer_batches(true);
    }

    let initial = match &args.initial {
        Some(path) => load_document(path)?,
        None => Value::Null,
    };
    let mut replica = Replica::with_config(initial, config);

    let reader: Box<dyn BufRead> = if args.events == "-" {
        Box::new(io::stdin().lock())
    } else {
        Box::new(BufReader::new(File::open(&args.events)?))
    };

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parsed: Line =
            serde_json::from_str(line).map_err(|e| format!("line {}: {e}", index + 1))?;
        match parsed {
            Line::Batch {
                batch: Marker::Begin,
            } => {
                info!(line = index + 1, "batch begin");
                replica.begin_batch()?;
            }
            Line::Batch { batch: Marker::End } => {
                let failures = replica.end_batch()?;
                info!(line = index + 1, failures, "batch end");
            }
            Line::Change(op) => {
                // Failures are kept in the journal and reported below
                let _ = replica.apply(op);
            }
        }
    }
    if replica.in_batch() {
        warn!("event stream ended inside a batch, closing it");
        replica.end_batch()?;
    }

    let journal = replica.journal();
    let total = journal.len();
    let failed = journal.error_count();

    match format {
        OutputFormat::Human => {
            println!("{}", replica.target().to_json_pretty());
            let rows: Vec<Vec<String>> = journal
                .errors()
                .map(|outcome| {
                    vec![
                        outcome.seq.to_string(),
                        outcome.op.to_string(),
                        outcome
                            .error
                            .as_ref()
                            .map(ToString::to_string)
                            .unwrap_or_default(),
                    ]
                })
                .collect();
            if !rows.is_empty() {
                println!();
                print_table(&["SEQ", "EVENT", "ERROR"], &rows);
            }
            println!();
            println!("Applied: {total}  Failed: {failed}");
        }
        OutputFormat::Json => {
            let errors: Vec<serde_json::Value> = journal
                .errors()
                .filter_map(|outcome| {
                    let error = outcome.error.as_ref()?;
                    Some(serde_json::json!({
                        "seq": outcome.seq,
                        "event": outcome.op,
                        "kind": format!("{:?}", error.kind()),
                        "error": error.to_string(),
                    }))
                })
                .collect();
            let value = serde_json::json!({
                "document": replica.target().to_json(),
                "applied": total,
                "failed": failed,
                "errors": errors,
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }

    if failed > 0 {
        return Err(format!("{failed} of {total} events failed").into());
    }
    Ok(())
}

fn load_document(path: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(path)?)?;
    Ok(Value::from(json))
}
