//! The `assessforge score` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use assessforge_core::config::load_config_from;
use assessforge_core::parser;
use assessforge_core::replay::{parse_responses, replay_attempt};
use assessforge_core::report::{format_max, AttemptReport};
use assessforge_report::html::write_html_report;

pub fn execute(
    definition_path: PathBuf,
    responses_path: PathBuf,
    format: Option<String>,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let output = output.unwrap_or(config.output_dir);
    let format = format.unwrap_or(config.format);

    let definition = parser::parse_definition(&definition_path)?;
    let responses = parse_responses(&responses_path)?;

    eprintln!(
        "assessforge v{}: replaying {} response(s) against {} ({} items)",
        env!("CARGO_PKG_VERSION"),
        responses.responses.len(),
        definition.ident,
        definition.item_count()
    );

    let start_millis = chrono::Utc::now().timestamp_millis();
    let (ctx, summary) = replay_attempt(definition, &responses, start_millis)?;
    let report = AttemptReport::from_context(&ctx);

    print_summary(&report);
    println!(
        "Responses: {} accepted, {} rejected",
        summary.accepted, summary.rejected
    );

    std::fs::create_dir_all(&output)?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");

    let formats: Vec<&str> = if format == "all" {
        vec!["json", "html", "markdown"]
    } else {
        format.split(',').map(str::trim).collect()
    };
    tracing::debug!(output = %output.display(), ?formats, "writing reports");

    for fmt in &formats {
        match *fmt {
            "json" => {
                let path = output.join(format!("report-{timestamp}.json"));
                report.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
            }
            "html" => {
                let path = output.join(format!("report-{timestamp}.html"));
                write_html_report(&report, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            "markdown" | "md" => {
                let path = output.join(format!("report-{timestamp}.md"));
                std::fs::write(&path, report.to_markdown())?;
                eprintln!("Markdown report: {}", path.display());
            }
            _ => {
                eprintln!("Unknown format: {fmt}");
            }
        }
    }

    if config.strict && summary.rejected > 0 {
        anyhow::bail!(
            "{} response(s) were rejected and strict mode is enabled",
            summary.rejected
        );
    }

    Ok(())
}

fn print_summary(report: &AttemptReport) {
    let mut table = Table::new();
    table.set_header(vec![
        "Section",
        "Score",
        "Max",
        "Presented",
        "Answered",
        "Attempted",
    ]);

    for section in &report.sections {
        table.add_row(vec![
            Cell::new(&section.ident),
            Cell::new(section.score),
            Cell::new(format_max(section.max_score)),
            Cell::new(section.presented),
            Cell::new(section.answered),
            Cell::new(section.attempted),
        ]);
    }

    println!("{table}");

    let verdict = if report.assessment.survey {
        "survey, not scored"
    } else if report.passed {
        "PASSED"
    } else {
        "NOT PASSED"
    };
    println!(
        "Score: {} / {} ({verdict})",
        report.score,
        format_max(report.max_score)
    );
    println!("Duration: {:.1}s", report.duration_ms as f64 / 1000.0);

    if let Some(fb) = &report.feedback {
        match &fb.content {
            Some(content) => println!("Feedback: {}: {}", content.title, content.text),
            None => println!("Feedback: {}", fb.ident),
        }
    }
}
