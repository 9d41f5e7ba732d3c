// Licensed under the Apache-2.0 license

//! Command to generate register and interrupt constants from an SVD file.

use anyhow::{Context, Result};
use log::info;
use mcu_registers_svd::{generate_from_file, FilterConfig, OutputConfig};
use std::path::Path;

/// Generate constants from `svd_file`, writing them to `output` or stdout.
pub fn generate(
    svd_file: &Path,
    output: Option<&Path>,
    include: &[String],
    exclude: &[String],
    no_groups: bool,
    no_docs: bool,
) -> Result<()> {
    info!("Generating constants from: {}", svd_file.display());

    let mut filter = FilterConfig::new();
    for name in include {
        filter = filter.include_peripheral(name);
    }
    for name in exclude {
        filter = filter.exclude_peripheral(name);
    }
    let config = OutputConfig::new()
        .emit_groups(!no_groups)
        .emit_descriptions(!no_docs)
        .filter(filter);

    let code = generate_from_file(svd_file, &config)
        .with_context(|| format!("failed to compile {}", svd_file.display()))?;

    if let Some(output_path) = output {
        std::fs::write(output_path, &code)
            .with_context(|| format!("failed to write {}", output_path.display()))?;
        info!("Output written to: {}", output_path.display());
    } else {
        print!("{code}");
    }

    Ok(())
}
