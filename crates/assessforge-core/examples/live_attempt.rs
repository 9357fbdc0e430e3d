//! Live attempt: drive an assessment item by item with the system clock.
//!
//! ```bash
//! cargo run -p assessforge-core --example live_attempt -- definitions/rust-basics.toml
//! ```
//!
//! Every item is answered with half of its maximum score, as if response
//! matching had already run.

use std::path::PathBuf;

use assessforge_core::assessment::AssessmentContext;
use assessforge_core::parser;
use assessforge_core::report::{format_max, AttemptReport};
use assessforge_core::variables::VariableStore;

fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("definitions/rust-basics.toml"));

    let doc = parser::parse_document(&path)?;
    let mut ctx = AssessmentContext::new();
    ctx.setup(&doc)?;
    ctx.start()?;
    println!(
        "Started {} ({} items, remaining time: {:?} ms)",
        ctx.ident(),
        ctx.item_count(),
        ctx.remaining_time()
    );

    while let Some((section, item)) = ctx.next_item()? {
        let Some(context) = ctx.section(section).and_then(|s| s.item(item)) else {
            break;
        };
        let ident = context.ident().to_string();
        let score = context.max_score().unwrap_or(1.0) / 2.0;

        ctx.record_outcomes(section, item, VariableStore::from_values([("SCORE", score)]))?;
        println!(
            "  [{}] {ident}: {score}",
            ctx.item_position().unwrap_or_default() + 1
        );
    }

    ctx.stop();
    ctx.eval()?;

    let report = AttemptReport::from_context(&ctx);
    println!(
        "Score: {} / {} | passed: {}",
        report.score,
        format_max(report.max_score),
        report.passed
    );
    if let Some(fb) = &report.feedback {
        println!("Feedback: {}", fb.ident);
    }

    Ok(())
}
