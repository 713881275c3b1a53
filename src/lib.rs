//! catalog-sync reconciles a local music library against a remote catalog
//! service and acquires the releases that are missing locally.
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod acquire;
pub mod config;
pub mod library;
pub mod matching;
pub mod reconcile;
pub mod remote;

// Re-export commonly used types for convenience
pub use acquire::{LoginOutcome, ReleaseAcquirer, TidalDlAcquirer};
pub use config::{AppConfig, CliConfig, FileConfig};
pub use reconcile::{ReconcileSettings, Reconciler, SkipReason};
pub use remote::{HttpCatalogClient, RemoteCatalog};
