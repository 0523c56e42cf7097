use anyhow::{Context, Result};
use tracing::info;

use crate::cli::InspectArgs;
use crate::inspect::Inspector;
use crate::model::InspectionReport;
use crate::util::{now_utc_string, read_bytes, sha256_bytes, write_json_pretty};

pub fn run(args: InspectArgs) -> Result<()> {
    let bytes = read_bytes(&args.input)?;
    let inspector = Inspector::new().context("failed to build form patterns")?;
    let structure = inspector
        .inspect_bytes(&bytes)
        .with_context(|| format!("failed to inspect {}", args.input.display()))?;

    let report = InspectionReport::new(&structure, sha256_bytes(&bytes), now_utc_string());
    info!(
        path = %args.input.display(),
        fields = report.detected_fields.len(),
        movie_table = report.has_movie_table,
        options = report.available_movies.len(),
        "{}",
        report.message
    );

    if let Some(report_path) = &args.report_path {
        write_json_pretty(report_path, &report)?;
        info!(path = %report_path.display(), "wrote inspection report");
    }

    if let Some(structure_path) = &args.structure_path {
        write_json_pretty(structure_path, &structure)?;
        info!(path = %structure_path.display(), "wrote form structure");
    }

    if args.json {
        let json =
            serde_json::to_string_pretty(&report).context("failed to serialize inspection report")?;
        println!("{json}");
    }

    Ok(())
}
