//! The `lumen labels` command for inspecting the label table.

use lumen_core::labeling::LABELS_FILENAME;
use lumen_core::{Config, LabelTable};

/// Execute the labels command.
pub async fn execute(config: &Config) -> anyhow::Result<()> {
    let path = config.active_model_dir().join(LABELS_FILENAME);

    if !path.exists() {
        println!("No label table installed.");
        println!("Expected it at: {}", path.display());
        return Ok(());
    }

    let table = LabelTable::load(&path)?;
    println!("Label table: {} ({} entries)\n", path.display(), table.len());
    println!("  {:>5}  {:24} {:>8}  {}", "index", "name", "priority", "categories");

    for (index, entry) in table.entries().iter().enumerate() {
        println!(
            "  {:>5}  {:24} {:>8}  {}",
            index,
            entry.name,
            entry.priority,
            entry.categories.join("|")
        );
    }

    Ok(())
}
