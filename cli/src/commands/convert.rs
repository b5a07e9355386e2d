use std::path::PathBuf;
use std::time::Instant;

use tracing::{info, warn};

use resultsnap_common::config::{WORKBOOK_EXTENSION, coerce_workbook_path, has_workbook_extension};
use resultsnap_common::success;
use resultsnap_core::report;

use crate::commands::ConvertArgs;
use crate::terminal::{format, print};

pub fn convert(args: ConvertArgs, quiet: u8) -> anyhow::Result<()> {
    print::header("converting results", quiet);

    let output = output_path(&args);
    let start_time = Instant::now();
    info!("Reading {}", args.input.display());

    let written = report::convert(&args.input, &output, args.protect_password.as_deref())?;

    success!(
        "Wrote {written} records to {} in {}",
        output.display(),
        format::elapsed(start_time.elapsed())
    );
    Ok(())
}

fn output_path(args: &ConvertArgs) -> PathBuf {
    match &args.output {
        Some(output) => {
            if !has_workbook_extension(output) {
                warn!("Output {} does not end in .xlsx, appending it", output.display());
            }
            coerce_workbook_path(output)
        }
        None => args.input.with_extension(WORKBOOK_EXTENSION),
    }
}
