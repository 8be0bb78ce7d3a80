//! Suggest command implementation.

use std::path::Path;

use vaultgraph_core::knowledge::SuggestionResponse;

use super::output::{print_json, print_related_table};
use super::{Session, load_config, runtime};
use crate::SuggestArgs;

pub fn run(config: Option<&Path>, profile: Option<&str>, args: SuggestArgs) {
    let rc = load_config(config, profile);

    let content = match (&args.content, &args.file) {
        (Some(content), _) => content.clone(),
        (None, Some(file)) => {
            let path = if file.is_absolute() { file.clone() } else { rc.vault_root.join(file) };
            match std::fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    eprintln!("Error reading {}: {}", path.display(), e);
                    std::process::exit(1);
                }
            }
        }
        (None, None) => {
            eprintln!("Either --file or --content is required");
            std::process::exit(2);
        }
    };

    // A note read from the vault never suggests itself
    let current = args.current.clone().or_else(|| {
        args.file
            .as_ref()
            .filter(|f| f.is_relative())
            .map(|f| f.to_string_lossy().trim_start_matches("./").to_string())
    });

    let mut session = Session::open(&rc, args.namespace.as_deref());
    let result = runtime().block_on(async {
        session.prepare_queries().await;
        session
            .engine
            .service()
            .suggest_references(&content, current.as_deref(), args.limit, args.threshold)
            .await
    });

    let suggestions = match result {
        Ok(suggestions) => suggestions,
        Err(e) => {
            eprintln!("Error querying index: {}", e);
            std::process::exit(1);
        }
    };

    if args.json {
        print_json(&SuggestionResponse::new(suggestions));
    } else {
        print_related_table(&suggestions);
    }
}
