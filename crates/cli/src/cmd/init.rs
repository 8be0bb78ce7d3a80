//! Init command implementation.

use std::path::Path;

use vaultgraph_core::vault::{VaultSettings, init_vault};

use super::load_config;
use crate::InitArgs;

pub fn run(config: Option<&Path>, profile: Option<&str>, args: InitArgs) {
    let vault_root = match args.vault {
        Some(path) => path,
        None => load_config(config, profile).vault_root,
    };

    match init_vault(&vault_root) {
        Ok(settings) => {
            println!("Initialized vault: {}", vault_root.display());
            println!("Settings: {}", VaultSettings::path(&vault_root).display());
            println!("  newLinkFormat:        {}", settings.new_link_format);
            println!("  attachmentFolderPath: {}", settings.attachment_folder_path);
            if !settings.user_ignore_filters.is_empty() {
                println!("  userIgnoreFilters:    {}", settings.user_ignore_filters.join(", "));
            }
        }
        Err(e) => {
            eprintln!("Error initializing vault: {}", e);
            std::process::exit(1);
        }
    }
}
