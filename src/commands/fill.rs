use anyhow::{Context, Result, bail};
use tracing::info;

use crate::cli::FillArgs;
use crate::fill::FormFiller;
use crate::inspect::Inspector;
use crate::model::{FillReport, FormData, FormStructure};
use crate::util::{
    filled_output_path, now_utc_string, read_bytes, read_json, sha256_bytes, write_bytes,
    write_json_pretty,
};

pub fn run(args: FillArgs) -> Result<()> {
    let output_path = match args.output {
        Some(path) => path,
        None => filled_output_path(&args.input)?,
    };
    if output_path == args.input {
        bail!(
            "refusing to overwrite the input document {}",
            args.input.display()
        );
    }

    let input = read_bytes(&args.input)?;
    let data: FormData = read_json(&args.data)?;

    let structure: FormStructure = match &args.structure {
        Some(path) => read_json(path)?,
        None => Inspector::new()
            .context("failed to build form patterns")?
            .inspect_bytes(&input)
            .with_context(|| format!("failed to inspect {}", args.input.display()))?,
    };
    let outcome = FormFiller::new()
        .context("failed to build form patterns")?
        .fill(&input, &data, &structure)
        .with_context(|| format!("failed to fill {}", args.input.display()))?;

    write_bytes(&output_path, &outcome.bytes)?;

    let report = FillReport {
        input_path: args.input.display().to_string(),
        output_path: output_path.display().to_string(),
        strategy: outcome.strategy.as_str().to_string(),
        steps: outcome.steps,
        output_sha256: sha256_bytes(&outcome.bytes),
        generated_at: now_utc_string(),
    };
    info!(
        path = %output_path.display(),
        strategy = %report.strategy,
        sha256 = %report.output_sha256,
        "wrote filled document"
    );

    if let Some(report_path) = &args.report_path {
        write_json_pretty(report_path, &report)?;
        info!(path = %report_path.display(), "wrote fill report");
    }

    Ok(())
}
