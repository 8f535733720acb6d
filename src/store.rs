//! Loading and persisting the target list.
//!
//! The primary options document is operator-authored and read fresh on every
//! run. When it is empty, or contains only the shipped placeholder entry,
//! the store falls back to the backup snapshot and restores it into the
//! primary document, so an add-on reinstall does not lose the device list.

use std::fs;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::config::{BackupDocument, BackupEntry, OptionsDocument, RawTarget, Settings};
use crate::output;
use crate::target::Target;

/// Result of one load: the normalized working list and whether it came from
/// the backup snapshot instead of the primary options.
#[derive(Debug)]
pub struct LoadedTargets {
    pub targets: Vec<Target>,
    pub restored_from_backup: bool,
}

pub struct TargetStore<'a> {
    settings: &'a Settings,
}

impl<'a> TargetStore<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Load the working target list.
    ///
    /// A missing options file or missing `targets` field is an empty list;
    /// malformed JSON in the primary document is a fatal error. Entries that
    /// fail normalization are dropped with a diagnostic, preserving the
    /// order of the survivors.
    pub fn load(&self) -> Result<LoadedTargets> {
        let mut raw = self.read_options()?;

        if self.is_placeholder_only(&raw) {
            debug!("options hold only the shipped placeholder entry, treating as unconfigured");
            raw.clear();
        }

        let mut restored_from_backup = false;
        if raw.is_empty() {
            let backup = self.read_backup();
            if !backup.is_empty() {
                info!(count = backup.len(), "restoring target list from backup snapshot");
                raw = backup
                    .into_iter()
                    .map(|entry| RawTarget::Entry {
                        name: entry.name,
                        url: entry.url,
                    })
                    .collect();

                let body = serde_json::to_string_pretty(&OptionsDocument::new(raw.clone()))
                    .context("failed to serialize restored options")?;
                output::write_file(&self.settings.options_path, &body)?;
                restored_from_backup = true;
            }
        }

        let mut targets = Vec::with_capacity(raw.len());
        for entry in &raw {
            match Target::parse(entry) {
                Some(target) => targets.push(target),
                None => warn!(entry = ?entry, "skipping target with unusable address"),
            }
        }

        Ok(LoadedTargets {
            targets,
            restored_from_backup,
        })
    }

    /// Write the current list to the backup snapshot, preserving the
    /// verbatim addresses. An empty list leaves any existing backup alone:
    /// an empty live configuration is more likely transient than an
    /// intentional wipe.
    pub fn persist_backup(&self, targets: &[Target]) -> Result<()> {
        if targets.is_empty() {
            return Ok(());
        }

        let doc = BackupDocument {
            targets: targets
                .iter()
                .map(|target| BackupEntry {
                    name: target.name.clone(),
                    url: target.raw.clone(),
                })
                .collect(),
        };
        let body =
            serde_json::to_string_pretty(&doc).context("failed to serialize backup snapshot")?;
        output::write_file(&self.settings.backup_path, &body)
    }

    fn read_options(&self) -> Result<Vec<RawTarget>> {
        let path = &self.settings.options_path;
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read options from {}", path.display()))?;
        let doc: OptionsDocument = serde_json::from_str(&content)
            .with_context(|| format!("malformed options document at {}", path.display()))?;
        Ok(doc.into_targets())
    }

    /// A missing or malformed backup is treated as absent, never fatal.
    fn read_backup(&self) -> Vec<BackupEntry> {
        let path = &self.settings.backup_path;
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_str::<BackupDocument>(&content) {
            Ok(doc) => doc.targets,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring malformed backup snapshot");
                Vec::new()
            }
        }
    }

    fn is_placeholder_only(&self, raw: &[RawTarget]) -> bool {
        match raw {
            [single] => self.settings.placeholder.matches(single),
            _ => false,
        }
    }
}
