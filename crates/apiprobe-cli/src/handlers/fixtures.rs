//! Fixtures command handler

use super::utils::{load_document, load_payload, truncate};
use crate::cli::FixturesArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use apiprobe_core::{generate, Schema};
use tracing::{info, instrument};

/// Handle the fixtures command
#[instrument(skip(_config, output), fields(schema = %args.schema.display()))]
pub fn handle_fixtures(args: FixturesArgs, _config: &Config, output: &mut OutputWriter) -> Result<()> {
    let schema: Schema = load_document(&args.schema, "field schema")?;
    let baseline = load_payload(&args.baseline)?;

    if let Some(field) = &args.field {
        if schema.get(field).is_none() {
            return Err(Error::other(format!(
                "field '{field}' is not declared in {}",
                args.schema.display()
            )));
        }
    }

    let mut fixtures = generate(&schema, &baseline)?;
    if let Some(field) = &args.field {
        fixtures.retain(|fixture| &fixture.field == field);
    }
    info!(count = fixtures.len(), fields = schema.len(), "generated fixtures");

    if args.payloads_only {
        let payloads: Vec<_> = fixtures.iter().map(|fixture| &fixture.payload).collect();
        return output.data(&payloads);
    }

    if !output.is_human() {
        return output.data(&fixtures);
    }

    output.info(&format!(
        "{} fixtures from {} fields",
        fixtures.len(),
        schema.len()
    ))?;
    let rows = fixtures
        .iter()
        .map(|fixture| {
            vec![
                fixture.field.clone(),
                fixture.violation.to_string(),
                truncate(&fixture.value().to_string(), 48),
            ]
        })
        .collect();
    output.table(&["Field", "Violation", "Value"], rows)
}
