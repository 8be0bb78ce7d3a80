//! Related command implementation.

use std::path::Path;

use vaultgraph_core::knowledge::RelatedResponse;

use super::output::{print_json, print_related_table};
use super::{Session, load_config, runtime};
use crate::RelatedArgs;

pub fn run(config: Option<&Path>, profile: Option<&str>, args: RelatedArgs) {
    let rc = load_config(config, profile);
    let mut session = Session::open(&rc, args.namespace.as_deref());

    let result = runtime().block_on(async {
        session.prepare_queries().await;
        session.engine.service().find_related(&args.query, args.limit, args.threshold).await
    });

    let results = match result {
        Ok(results) => results,
        Err(e) => {
            eprintln!("Error querying index: {}", e);
            std::process::exit(1);
        }
    };

    if args.json {
        print_json(&RelatedResponse::new(args.query, results));
    } else {
        print_related_table(&results);
    }
}
