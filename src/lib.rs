//! webui-proxy - turns a list of device addresses into a working gateway setup
//!
//! This library backs a run-once batch tool that:
//! - Loads the target list from the add-on options, falling back to a backup
//!   snapshot when the options are empty or hold only the shipped placeholder
//! - Normalizes every entry into scheme/host/port form, dropping the unusable ones
//! - Renders a landing page and an nginx rule document with one routing slot
//!   per target, including response-body rewriting for prefix-unaware backends
//! - Writes both documents and, after a backup restore, best-effort syncs the
//!   options back to the Supervisor

pub mod config;
pub mod generate;
pub mod landing;
pub mod nginx;
pub mod output;
pub mod rewrite;
pub mod store;
pub mod supervisor;
pub mod target;
