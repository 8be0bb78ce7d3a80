use std::path::Path;

use vaultgraph_core::config::loader::{ConfigLoader, default_config_path};
use vaultgraph_core::config::types::IndexBackend;

use crate::logging;

pub fn run(config: Option<&Path>, profile: Option<&str>) {
    match ConfigLoader::load(config, profile) {
        Ok(rc) => {
            logging::init(&rc);
            tracing::debug!("config loaded for profile {}", rc.active_profile);

            println!("OK   vgraph doctor");
            println!(
                "path: {}",
                config.map_or_else(
                    || default_config_path().display().to_string(),
                    |p| p.display().to_string()
                )
            );
            println!("profile: {}", rc.active_profile);
            println!("vault_root: {}", rc.vault_root.display());
            println!("namespace: {}", rc.namespace);
            println!("tenant: {}", rc.tenant);
            println!("state_dir: {}", rc.state_dir.display());
            for folder in &rc.excluded_folders {
                println!("excluded: {}", folder.display());
            }
            match rc.index.backend {
                IndexBackend::Memory => println!("index: memory"),
                IndexBackend::Http => println!(
                    "index: http {} (timeout {}s)",
                    rc.index.url.as_deref().unwrap_or_default(),
                    rc.index.timeout_secs
                ),
            }
            if let Some(model) = &rc.index.model {
                println!("model: {model}");
            }
            if !rc.vault_root.is_dir() {
                println!("warning: vault_root does not exist yet");
            }
        }
        Err(e) => {
            println!("FAIL vgraph doctor");
            println!("{e}");
            if config.is_none() {
                println!("looked for: {}", default_config_path().display());
            }
            std::process::exit(1);
        }
    }
}
