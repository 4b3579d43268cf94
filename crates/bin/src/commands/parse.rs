//! Path and key inspection commands.

use ysync::path::{StructuredKey, parse_path};

use crate::cli::{ParseKeyArgs, ParsePathArgs};
use crate::output::{OutputFormat, print_table};

/// Run the parse-path command
pub fn run_path(args: &ParsePathArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let segments = parse_path(&args.path)?;

    match format {
        OutputFormat::Human => {
            if segments.is_empty() {
                println!("(root)");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = segments
                .iter()
                .enumerate()
                .map(|(i, segment)| {
                    let qualifiers = StructuredKey::parse(segment)
                        .map(|key| key.fields.len().to_string())
                        .unwrap_or_else(|_| "-".to_string());
                    vec![i.to_string(), segment.clone(), qualifiers]
                })
                .collect();
            print_table(&["INDEX", "SEGMENT", "QUALIFIERS"], &rows);
        }
        OutputFormat::Json => {
            let value = serde_json::json!({ "segments": segments });
            println!("{}", serde_json::to_string(&value)?);
        }
    }

    Ok(())
}

/// Run the parse-key command
pub fn run_key(args: &ParseKeyArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let key = StructuredKey::parse(&args.key)?;

    match format {
        OutputFormat::Human => {
            println!("Name:   {}", key.name);
            let rows: Vec<Vec<String>> = key
                .fields
                .iter()
                .map(|(field, value)| vec![field.clone(), value.clone()])
                .collect();
            if rows.is_empty() {
                println!("Fields: (none)");
            } else {
                println!();
                print_table(&["FIELD", "VALUE"], &rows);
            }
        }
        OutputFormat::Json => {
            let fields: Vec<serde_json::Value> = key
                .fields
                .iter()
                .map(|(field, value)| serde_json::json!({ "field": field, "value": value }))
                .collect();
            let value = serde_json::json!({ "name": key.name, "fields": fields });
            println!("{}", serde_json::to_string(&value)?);
        }
    }

    Ok(())
}
