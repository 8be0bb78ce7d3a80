//! Vault file discovery and content extraction.
//!
//! This module provides utilities for walking vault directories,
//! extracting links and titles from markdown files, and managing the
//! reserved vault settings directory.

pub mod extractor;
pub mod links;
pub mod settings;
pub mod walker;

pub use extractor::{ExtractedNote, extract_note, extract_title};
pub use links::{extract_links, normalize_target};
pub use settings::{CONFIG_DIR, SETTINGS_FILE, SettingsError, VaultSettings, init_vault};
pub use walker::{VaultScan, VaultWalker, VaultWalkerError, WalkFailure, WalkedFile, vault_path};
