use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use robustify_core::{build_rows, RowFilter, RowsBuild};
use robustify_logging::{robustify_info, robustify_warn};

/// Builds the URL rows from positional arguments (one row each) followed by
/// the lines of `uris_file` (one row per line). `-` reads standard input.
pub fn collect_rows(
    uris: &[String],
    uris_file: Option<&Path>,
    filter: &RowFilter,
) -> Result<RowsBuild> {
    let mut lines: Vec<String> = uris.to_vec();
    if let Some(path) = uris_file {
        let content = if path == Path::new("-") {
            std::io::read_to_string(std::io::stdin()).context("reading URLs from stdin")?
        } else {
            fs::read_to_string(path)
                .with_context(|| format!("reading URLs from {}", path.display()))?
        };
        lines.extend(content.lines().map(str::to_owned));
    }

    let build = build_rows(lines.iter().map(String::as_str), filter);
    for rejected in &build.rejected {
        robustify_warn!("{}", rejected);
    }
    if build.duplicates > 0 {
        robustify_info!("Skipped {} duplicate URLs", build.duplicates);
    }
    if build.overlapping > 0 {
        robustify_info!("Skipped {} overlapping URLs", build.overlapping);
    }
    if build.rows.is_empty() {
        bail!("no usable URLs given");
    }
    Ok(build)
}
