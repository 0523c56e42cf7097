use anyhow::{Result, bail};
use tracing::info;

use crate::cli::StatusArgs;
use crate::model::FormData;
use crate::util::read_json;

pub fn run(args: StatusArgs) -> Result<()> {
    if !args.data.exists() {
        bail!("no order data at {}; run `update` first", args.data.display());
    }

    let data: FormData = read_json(&args.data)?;
    let report = data.report();

    info!(
        path = %args.data.display(),
        complete = report.is_complete,
        movies = data.movies.len(),
        missing = %report.missing_fields.join(", "),
        "{}",
        report.message
    );

    Ok(())
}
