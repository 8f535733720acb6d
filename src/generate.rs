//! One generation run: resolve targets, render documents, write outputs.

use anyhow::Result;
use tracing::info;

use crate::config::Settings;
use crate::store::TargetStore;
use crate::{landing, nginx, output, supervisor};

/// Execute a full run. Fatal errors (malformed primary options, unwritable
/// output paths) propagate; the gateway then keeps serving whatever the last
/// successful run produced.
pub fn run(settings: &Settings) -> Result<()> {
    let store = TargetStore::new(settings);
    let loaded = store.load()?;
    info!(
        count = loaded.targets.len(),
        restored = loaded.restored_from_backup,
        "resolved target list"
    );

    store.persist_backup(&loaded.targets)?;

    output::write_file(&settings.landing_path, &landing::render(&loaded.targets))?;
    output::write_file(&settings.nginx_conf_path, &nginx::render(&loaded.targets))?;
    info!(
        nginx = %settings.nginx_conf_path.display(),
        landing = %settings.landing_path.display(),
        "generated gateway configuration"
    );

    if loaded.restored_from_backup {
        supervisor::notify_restored(settings, &loaded.targets);
    }

    Ok(())
}
