//! Runtime settings and the on-disk options/backup documents.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Ports that imply an https upstream when the address carries no scheme.
pub const HTTPS_PORTS: [u16; 3] = [443, 8443, 8006];

/// One raw target entry as users write it in the add-on options.
///
/// Either a bare address string or an object carrying a display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTarget {
    Entry {
        #[serde(default)]
        name: String,
        #[serde(default)]
        url: String,
    },
    Bare(String),
}

/// The primary options document (`/data/options.json`).
///
/// A missing or null `targets` field reads as an empty list; anything else
/// malformed is a fatal error surfaced by the store.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct OptionsDocument {
    #[serde(default)]
    pub targets: Option<Vec<RawTarget>>,
}

impl OptionsDocument {
    pub fn new(targets: Vec<RawTarget>) -> Self {
        Self {
            targets: Some(targets),
        }
    }

    pub fn into_targets(self) -> Vec<RawTarget> {
        self.targets.unwrap_or_default()
    }
}

/// The backup snapshot document, always in expanded-object form.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct BackupDocument {
    #[serde(default)]
    pub targets: Vec<BackupEntry>,
}

/// One persisted `{name, url}` pair; `url` is the verbatim user address,
/// never the derived scheme/host/port form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// The demo entry shipped in the add-on's example options. A target list
/// consisting of exactly this entry is treated as unconfigured.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceholderEntry {
    pub name: String,
    pub url: String,
}

impl PlaceholderEntry {
    /// Whether a raw entry is this placeholder, either in object form or as
    /// the equivalent bare address string.
    pub fn matches(&self, raw: &RawTarget) -> bool {
        match raw {
            RawTarget::Entry { name, url } => name.trim() == self.name && url.trim() == self.url,
            RawTarget::Bare(url) => url.trim() == self.url,
        }
    }
}

/// Everything a run needs from the outside world, resolved once in `main`.
/// No other module reads the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Primary options document (read, rewritten on backup restore).
    pub options_path: PathBuf,
    /// Backup snapshot of the target list.
    pub backup_path: PathBuf,
    /// Generated gateway rule document.
    pub nginx_conf_path: PathBuf,
    /// Generated landing page.
    pub landing_path: PathBuf,
    /// Supervisor API endpoint for the best-effort options sync.
    pub supervisor_endpoint: String,
    /// Bearer token for the Supervisor API; absent outside the add-on sandbox.
    pub supervisor_token: Option<String>,
    /// Known placeholder entry to null out of loaded options.
    pub placeholder: PlaceholderEntry,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            options_path: PathBuf::from("/data/options.json"),
            backup_path: PathBuf::from("/share/webui-proxy.json"),
            nginx_conf_path: PathBuf::from("/etc/nginx/nginx.conf"),
            landing_path: PathBuf::from("/app/html/index.html"),
            supervisor_endpoint: "http://supervisor".to_string(),
            supervisor_token: None,
            placeholder: PlaceholderEntry {
                name: "Example device".to_string(),
                url: "192.168.1.100".to_string(),
            },
        }
    }
}

impl Settings {
    /// Build settings from the environment, falling back to the fixed
    /// add-on paths for anything not overridden.
    pub fn from_env() -> Self {
        let mut settings = Settings::default();

        if let Ok(path) = env::var("WEBUI_PROXY_OPTIONS") {
            settings.options_path = PathBuf::from(path);
        }
        if let Ok(path) = env::var("WEBUI_PROXY_BACKUP") {
            settings.backup_path = PathBuf::from(path);
        }
        if let Ok(path) = env::var("WEBUI_PROXY_NGINX_CONF") {
            settings.nginx_conf_path = PathBuf::from(path);
        }
        if let Ok(path) = env::var("WEBUI_PROXY_HTML") {
            settings.landing_path = PathBuf::from(path);
        }
        if let Ok(endpoint) = env::var("SUPERVISOR_API") {
            settings.supervisor_endpoint = endpoint;
        }
        settings.supervisor_token = env::var("SUPERVISOR_TOKEN")
            .ok()
            .filter(|token| !token.is_empty());

        settings
    }
}
