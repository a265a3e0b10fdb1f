//! Configuration file editor command.

use anyhow::anyhow;
use std::io::ErrorKind;
use std::process::Command;

use crate::config::{config_path, VoxlogConfig};

/// Opens the voxlog configuration file in an editor.
///
/// Candidates are tried in order ($VISUAL, $EDITOR, nano, vi) by launching
/// them directly; a candidate that is not installed falls through to the
/// next one.
///
/// # Errors
/// - If no candidate editor can be launched
/// - If the editor exits with a failure status
pub fn handle_config() -> anyhow::Result<()> {
    // Write the defaults first so the editor never opens a missing file
    let _ = VoxlogConfig::load_or_create()?;
    let config_path = config_path()?;

    tracing::info!("Opening config file: {}", config_path.display());

    for editor in candidate_list(env_editor("VISUAL"), env_editor("EDITOR")) {
        match Command::new(&editor).arg(&config_path).status() {
            Ok(status) if status.success() => {
                tracing::info!("Config file edited with {editor}");
                return Ok(());
            }
            Ok(status) => {
                return Err(anyhow!(
                    "Editor '{editor}' exited with code {}",
                    status.code().unwrap_or(-1)
                ));
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("Editor '{editor}' not installed, trying next");
            }
            Err(e) => {
                return Err(anyhow!("Failed to launch editor '{editor}': {e}"));
            }
        }
    }

    Err(anyhow!(
        "No editor found. Please set the $EDITOR environment variable."
    ))
}

fn env_editor(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

/// Editor candidates in preference order, ending with the universal
/// fallbacks.
fn candidate_list(visual: Option<String>, editor: Option<String>) -> Vec<String> {
    let mut candidates: Vec<String> = [visual, editor].into_iter().flatten().collect();
    candidates.push("nano".to_string());
    candidates.push("vi".to_string());
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_editors_take_precedence() {
        let candidates = candidate_list(Some("hx".into()), Some("vim".into()));
        assert_eq!(candidates, vec!["hx", "vim", "nano", "vi"]);
    }

    #[test]
    fn test_fallbacks_without_env() {
        assert_eq!(candidate_list(None, None), vec!["nano", "vi"]);
    }
}
