//! The `assessforge init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_once(Path::new("assessforge.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("definitions")?;
    write_once(Path::new("definitions/example.toml"), EXAMPLE_DEFINITION)?;

    std::fs::create_dir_all("responses")?;
    write_once(Path::new("responses/example.toml"), EXAMPLE_RESPONSES)?;

    println!("\nNext steps:");
    println!("  1. Run: assessforge validate --definition definitions/example.toml");
    println!("  2. Run: assessforge inspect --definition definitions/example.toml");
    println!(
        "  3. Run: assessforge score --definition definitions/example.toml --responses responses/example.toml"
    );

    Ok(())
}

fn write_once(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# assessforge configuration

output_dir = "./assessforge-results"
# json, html, markdown, or all; comma-separated lists work too
format = "json"
# fail `score` when any response arrives after the time limit
strict = false
"#;

const EXAMPLE_DEFINITION: &str = r#"[assessment]
ident = "example"
title = "Example Quiz"
duration = "PT10M"

[assessment.outcomes_processing]
scoremodel = "SumOfScores"
cutvalue = 2.0

[[assessment.outcomes_processing.feedback]]
ident = "fb-pass"
test = { kind = "variable_test", op = "gte", value = 2.0 }

[[assessment.outcomes_processing.feedback]]
ident = "fb-fail"
test = { kind = "variable_test", op = "lt", value = 2.0 }

[[assessment.sections]]
ident = "basics"
title = "Basics"

[[assessment.sections.items]]
ident = "q1"
title = "First question"
max_score = 1.0

[[assessment.sections.items]]
ident = "q2"
title = "Second question"
max_score = 2.0

[[assessfeedback]]
ident = "fb-pass"
title = "Passed"
text = "Well done."

[[assessfeedback]]
ident = "fb-fail"
title = "Not yet"
text = "Have another look at the material."
"#;

const EXAMPLE_RESPONSES: &str = r#"finished_at_ms = 120000

[[responses]]
section = "basics"
item = "q1"
at_ms = 30000
outcomes = { SCORE = 1.0 }

[[responses]]
section = "basics"
item = "q2"
at_ms = 90000
outcomes = { SCORE = 1.5 }
"#;
