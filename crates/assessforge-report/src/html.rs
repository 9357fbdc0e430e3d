//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use assessforge_core::report::{format_max, AttemptReport, SectionReport};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML report for one attempt.
pub fn generate_html(report: &AttemptReport) -> String {
    let mut html = String::new();
    let name = if report.assessment.title.is_empty() {
        &report.assessment.ident
    } else {
        &report.assessment.title
    };

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>assessforge report: {}</title>\n",
        html_escape(name)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(name)));
    html.push_str(&format!(
        "<p class=\"meta\">Assessment: <strong>{}</strong> | {} items | {} | {}</p>\n",
        html_escape(&report.assessment.ident),
        report.assessment.item_count,
        report.assessment.score_model,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Outcome
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Outcome</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Score</th><th>Max</th><th>Cut value</th><th>Result</th><th>Duration</th><th>State</th></tr></thead>\n");
    html.push_str("<tbody>\n");

    let (result_class, result_text) = if report.assessment.survey {
        ("", "survey")
    } else if report.passed {
        ("pass", "passed")
    } else {
        ("fail", "not passed")
    };
    html.push_str(&format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td><td class=\"{}\">{}</td><td>{:.1}s</td><td>{}</td></tr>\n",
        report.score,
        format_max(report.max_score),
        report
            .assessment
            .cut_value
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string()),
        result_class,
        result_text,
        report.duration_ms as f64 / 1000.0,
        report.state,
    ));
    html.push_str("</tbody></table>\n");

    if let Some(fb) = &report.feedback {
        html.push_str("<div class=\"feedback\">\n");
        match &fb.content {
            Some(content) => {
                html.push_str(&format!("<h3>{}</h3>\n", html_escape(&content.title)));
                html.push_str(&format!("<p>{}</p>\n", html_escape(&content.text)));
            }
            None => html.push_str(&format!("<p><code>{}</code></p>\n", html_escape(&fb.ident))),
        }
        html.push_str("</div>\n");
    }

    if !report.sections.is_empty() {
        html.push_str(&generate_bar_chart(&report.sections));
    }

    html.push_str("</section>\n");

    // Per-section and per-item results
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Sections</h2>\n");

    for section in &report.sections {
        html.push_str(&format!(
            "<h3>{} <span class=\"meta\">{} / {} | presented {} | answered {} | attempted {}</span></h3>\n",
            html_escape(if section.title.is_empty() {
                &section.ident
            } else {
                &section.title
            }),
            section.score,
            format_max(section.max_score),
            section.presented,
            section.answered,
            section.attempted,
        ));
        html.push_str("<table class=\"results-table\">\n");
        html.push_str(
            "<thead><tr><th>Item</th><th>Score</th><th>Max</th><th>Status</th></tr></thead>\n",
        );
        html.push_str("<tbody>\n");
        for item in &section.items {
            let (class, status) = if item.answered {
                ("pass", "answered")
            } else if item.attempted {
                ("fail", "cleared")
            } else if item.presented {
                ("fail", "presented")
            } else {
                ("", "not presented")
            };
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td class=\"{}\">{}</td></tr>\n",
                html_escape(&item.ident),
                item.score,
                format_max(item.max_score),
                class,
                status
            ));
        }
        html.push_str("</tbody></table>\n");
    }

    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &AttemptReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

/// Horizontal bars of each section's score relative to its maximum. Sections
/// with an unknown or zero maximum get an empty bar.
fn generate_bar_chart(sections: &[SectionReport]) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 200;

    let total_height = sections.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, section) in sections.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let ratio = section
            .max_score
            .filter(|&max| max > 0.0)
            .map(|max| (section.score / max).clamp(0.0, 1.0))
            .unwrap_or(0.0);
        let width = (ratio * max_width as f64) as usize;

        let color = if ratio >= 0.8 {
            "#22c55e"
        } else if ratio >= 0.5 {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(&section.ident)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{} / {}</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            section.score,
            format_max(section.max_score)
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; font-size: 0.9rem; font-weight: normal; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
.feedback { border-left: 4px solid var(--border); padding: 0 1rem; margin: 1rem 0; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;
