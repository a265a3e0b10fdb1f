//! Transcription history printer.
//!
//! Prints the running word total and every stored transcription, most
//! recent first.

use std::path::Path;

use crate::history::HistoryStore;

/// Prints the transcription history and the running word total.
///
/// # Errors
/// - If the history database cannot be opened or read
pub fn handle_history(data_dir: &Path) -> Result<(), anyhow::Error> {
    let mut store = HistoryStore::open(data_dir)?;
    let entries = store.entries()?;

    if entries.is_empty() {
        println!("No transcription history found.");
        return Ok(());
    }

    let total = store.word_total()?;

    println!();
    println!(
        "{} transcription{}, {} word{} total",
        entries.len(),
        if entries.len() == 1 { "" } else { "s" },
        total,
        if total == 1 { "" } else { "s" }
    );
    println!();

    for entry in &entries {
        println!(
            "[{}] {} word{}",
            entry.created_at.format("%Y-%m-%d %H:%M:%S"),
            entry.word_count,
            if entry.word_count == 1 { "" } else { "s" }
        );
        println!("{}", entry.text);
        println!();
    }

    Ok(())
}
