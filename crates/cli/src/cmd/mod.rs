pub mod doctor;
pub mod graph;
pub mod init;
pub mod links;
pub mod output;
pub mod related;
pub mod suggest;
pub mod sync;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use vaultgraph_core::config::loader::ConfigLoader;
use vaultgraph_core::config::types::{IndexBackend, ResolvedConfig};
use vaultgraph_core::index::{DocumentIndex, HttpDocumentIndex, MemoryIndex};
use vaultgraph_core::knowledge::KnowledgeGraphService;
use vaultgraph_core::store::StateStore;
use vaultgraph_core::sync::SyncEngine;
use vaultgraph_core::vault::{VaultSettings, VaultWalker};

use crate::logging;

/// Load configuration and install logging, exiting on failure.
pub fn load_config(config: Option<&Path>, profile: Option<&str>) -> ResolvedConfig {
    let rc = match ConfigLoader::load(config, profile) {
        Ok(rc) => rc,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };
    logging::init(&rc);
    rc
}

/// Single-threaded runtime for the async core.
pub fn runtime() -> tokio::runtime::Runtime {
    match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error starting runtime: {}", e);
            std::process::exit(1);
        }
    }
}

/// Sync engine for the configured vault plus the state store behind it.
pub struct Session {
    pub engine: SyncEngine<dyn DocumentIndex>,
    pub backend: IndexBackend,
    store: StateStore,
}

impl Session {
    /// Open the state store and restore the engine from it.
    pub fn open(rc: &ResolvedConfig, namespace: Option<&str>) -> Self {
        let index = build_index(rc);
        let namespace = namespace.unwrap_or(&rc.namespace);
        let mut service = KnowledgeGraphService::new(index, namespace, rc.tenant.as_str());
        if let Some(model) = &rc.index.model {
            service = service.with_model(model.as_str());
        }

        let walker = build_walker(rc);

        let db_path = rc.state_db_path();
        let store = match StateStore::open(&db_path) {
            Ok(store) => store,
            Err(e) => {
                eprintln!("Error opening state database {}: {}", db_path.display(), e);
                std::process::exit(1);
            }
        };

        let snapshot = match store.load() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                eprintln!("Error loading sync state: {}", e);
                std::process::exit(1);
            }
        };

        tracing::debug!(
            "restored {} files, {} nodes from {}",
            snapshot.files.len(),
            snapshot.nodes.len(),
            db_path.display()
        );

        let engine = SyncEngine::restore(walker, snapshot, service);
        Self { engine, backend: rc.index.backend, store }
    }

    /// Fill a process-local index from the restored graph.
    pub async fn prepare_queries(&mut self) {
        if self.backend == IndexBackend::Memory {
            for failure in self.engine.reindex_all().await {
                tracing::warn!("Failed to index {}: {}", failure.path, failure.message);
            }
        }
    }

    pub fn save(&self) {
        if let Err(e) = self.store.save(&self.engine.snapshot()) {
            eprintln!("Error saving sync state: {}", e);
            std::process::exit(1);
        }
    }
}

fn build_index(rc: &ResolvedConfig) -> Arc<dyn DocumentIndex> {
    match rc.index.backend {
        IndexBackend::Memory => Arc::new(MemoryIndex::default()),
        IndexBackend::Http => {
            let url = rc.index.url.as_deref().unwrap_or_default();
            match HttpDocumentIndex::new(url, rc.index.timeout_secs) {
                Ok(index) => Arc::new(index),
                Err(e) => {
                    eprintln!("Error creating index client: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}

fn build_walker(rc: &ResolvedConfig) -> VaultWalker {
    let settings = match VaultSettings::load(&rc.vault_root) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error reading vault settings: {}", e);
            std::process::exit(1);
        }
    };

    let mut excluded: Vec<PathBuf> = rc.excluded_folders.clone();
    excluded.extend(settings.excluded_folders());

    match VaultWalker::with_exclusions(&rc.vault_root, excluded) {
        Ok(walker) => walker,
        Err(e) => {
            eprintln!("Error opening vault: {}", e);
            std::process::exit(1);
        }
    }
}
