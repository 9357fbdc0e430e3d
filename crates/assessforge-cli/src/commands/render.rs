//! The `assessforge render` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use assessforge_core::report::AttemptReport;
use assessforge_report::html::generate_html;

pub fn execute(report_path: PathBuf, format: String, output: Option<PathBuf>) -> Result<()> {
    let report = AttemptReport::load_json(&report_path)?;

    let rendered = match format.as_str() {
        "markdown" | "md" => report.to_markdown(),
        "html" => generate_html(&report),
        "json" => serde_json::to_string_pretty(&report)?,
        "text" => format!(
            "{} ({}): {} / {}, {}",
            report.assessment.title,
            report.assessment.ident,
            report.score,
            assessforge_core::report::format_max(report.max_score),
            if report.passed { "passed" } else { "not passed" }
        ),
        other => anyhow::bail!("unknown format: {other}"),
    };

    match output {
        Some(path) => {
            std::fs::write(&path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Written to: {}", path.display());
        }
        None => println!("{rendered}"),
    }

    Ok(())
}
