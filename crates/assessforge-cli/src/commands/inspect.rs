//! The `assessforge inspect` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use assessforge_core::parser;
use assessforge_core::report::format_max;
use assessforge_core::scoring::sum_max;

pub fn execute(definition_path: PathBuf) -> Result<()> {
    let def = parser::parse_definition(&definition_path)?;

    println!("{} ({})", def.title, def.ident);
    if let Some(objectives) = &def.objectives {
        println!("Objectives: {objectives}");
    }
    println!(
        "Duration limit: {}",
        match def.duration_limit_ms {
            Some(ms) => format!("{:.0}s", ms as f64 / 1000.0),
            None => "unlimited".to_string(),
        }
    );
    println!(
        "Scoring: {} | cut value: {} | survey: {}",
        def.outcomes.score_model,
        def.outcomes
            .cut_value
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string()),
        if def.survey { "yes" } else { "no" }
    );
    println!(
        "Controls: feedback {} | hints {} | solutions {}",
        on_off(def.control.feedback),
        on_off(def.control.hints),
        on_off(def.control.solutions)
    );

    let mut table = Table::new();
    table.set_header(vec!["#", "Section", "Title", "Scoring", "Cut", "Items", "Max"]);

    for (pos, section) in def.sections.iter().enumerate() {
        table.add_row(vec![
            Cell::new(pos),
            Cell::new(&section.ident),
            Cell::new(&section.title),
            Cell::new(section.score_model),
            Cell::new(
                section
                    .cut_value
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(section.items.len()),
            Cell::new(format_max(sum_max(
                section.items.iter().map(|item| item.max_score),
            ))),
        ]);
    }

    println!("\n{table}");

    if !def.outcomes.feedback_rules.is_empty() {
        println!("\nFeedback rules (last match wins):");
        for rule in &def.outcomes.feedback_rules {
            let title = rule
                .content
                .as_ref()
                .map(|c| c.title.as_str())
                .unwrap_or("<missing>");
            println!(
                "  {} [{}] {}",
                rule.feedback_ident,
                rule.condition.kind(),
                title
            );
        }
    }

    Ok(())
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}
