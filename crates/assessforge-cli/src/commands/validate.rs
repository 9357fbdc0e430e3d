//! The `assessforge validate` command.

use std::path::PathBuf;

use anyhow::Result;

use assessforge_core::parser;

pub fn execute(definition_path: PathBuf) -> Result<()> {
    let docs = if definition_path.is_dir() {
        parser::load_document_directory(&definition_path)?
    } else {
        vec![parser::parse_document(&definition_path)?]
    };

    let mut total_warnings = 0;
    let mut failed = 0;

    for doc in &docs {
        let ident = &doc.assessment.ident;
        match doc.resolve() {
            Ok(def) => println!(
                "Assessment: {} ({} sections, {} items)",
                ident,
                def.sections.len(),
                def.item_count()
            ),
            Err(e) => {
                println!("Assessment: {ident}");
                println!("  ERROR: {e}");
                failed += 1;
            }
        }

        let warnings = parser::validate_document(doc);
        for w in &warnings {
            let prefix = w
                .location
                .as_ref()
                .map(|loc| format!("  [{loc}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if failed > 0 {
        anyhow::bail!("{failed} definition(s) cannot be delivered");
    }

    if total_warnings == 0 {
        println!("All definitions valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
