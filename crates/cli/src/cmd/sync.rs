//! Sync command implementation.

use std::path::Path;

use vaultgraph_core::sync::{SyncResponse, SyncStage};

use super::{Session, load_config, runtime};
use crate::SyncArgs;

pub fn run(config: Option<&Path>, profile: Option<&str>, args: SyncArgs) {
    let rc = load_config(config, profile);
    let mut session = Session::open(&rc, args.namespace.as_deref());

    let outcome = match runtime().block_on(session.engine.sync()) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Error during sync: {}", e);
            std::process::exit(1);
        }
    };
    session.save();

    let response = SyncResponse::from(&outcome);
    if args.json {
        super::output::print_json(&response);
        return;
    }

    println!("Synced vault: {}", rc.vault_root.display());
    println!("  Added:      {}", response.added.len());
    println!("  Modified:   {}", response.modified.len());
    println!("  Deleted:    {}", response.deleted.len());
    println!("  Documents:  {}", response.total_documents);

    if !outcome.failures.is_empty() {
        println!();
        println!("Failed ({}):", outcome.failures.len());
        for failure in &outcome.failures {
            let stage = match failure.stage {
                SyncStage::Read => "read",
                SyncStage::Store => "store",
            };
            println!("  {} [{}] {}", failure.path, stage, failure.message);
        }
    }
}
