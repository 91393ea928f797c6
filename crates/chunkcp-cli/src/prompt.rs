//! Interactive prompts for arguments left off the command line

use crate::display::mode_label;
use anyhow::Result;
use chunkcp_types::{TransferMode, WorkerCount};
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use std::path::{Path, PathBuf};

/// Ask for a source file until an existing one is given
pub fn source_file() -> Result<PathBuf> {
    let input: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Source file")
        .validate_with(|input: &String| -> std::result::Result<(), String> {
            check_source(input.trim())
        })
        .interact_text()?;

    Ok(PathBuf::from(input.trim()))
}

/// Ask for the destination folder
pub fn destination_folder() -> Result<PathBuf> {
    let input: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Destination folder")
        .interact_text()?;

    Ok(PathBuf::from(input.trim()))
}

/// Answer taken when Enter is pressed at the create-folder question
pub const CREATE_FOLDER_DEFAULT: bool = false;

/// Offer to create a missing destination folder; only an explicit yes creates it
pub fn confirm_create(folder: &Path) -> Result<bool> {
    Ok(Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!(
            "Folder {} does not exist. Create it?",
            folder.display()
        ))
        .default(CREATE_FOLDER_DEFAULT)
        .interact()?)
}

/// Pick a transfer mode from the three-item menu
pub fn transfer_mode(default: TransferMode, workers: WorkerCount) -> Result<TransferMode> {
    let items: Vec<String> = TransferMode::ALL
        .iter()
        .map(|mode| mode_label(*mode, workers))
        .collect();
    let default_index = TransferMode::ALL
        .iter()
        .position(|mode| *mode == default)
        .unwrap_or(0);

    let choice = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Transfer mode")
        .items(&items)
        .default(default_index)
        .interact()?;

    Ok(TransferMode::from_choice(choice as u32 + 1)?)
}

fn check_source(input: &str) -> std::result::Result<(), String> {
    let path = Path::new(input);
    if input.is_empty() {
        Err("Please enter a path".to_string())
    } else if !path.exists() {
        Err(format!("{} does not exist", input))
    } else if !path.is_file() {
        Err(format!("{} is not a file", input))
    } else {
        Ok(())
    }
}
