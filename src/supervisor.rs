//! Best-effort sync of restored options back to the Supervisor.
//!
//! Only called after a backup restore, so the options the Supervisor hands
//! out on the next run match what the gateway is actually serving. This path
//! is a convenience, never load-bearing: every failure is logged and
//! swallowed, and generation does not depend on the outcome.

use std::time::Duration;

use serde_json::json;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::target::Target;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// POST the restored target list to the add-on options endpoint.
pub fn notify_restored(settings: &Settings, targets: &[Target]) {
    let token = match settings.supervisor_token.as_deref() {
        Some(token) => token,
        None => {
            debug!("no supervisor token available, skipping options sync");
            return;
        }
    };

    let url = format!(
        "{}/addons/self/options",
        settings.supervisor_endpoint.trim_end_matches('/')
    );
    let body = json!({
        "options": {
            "targets": targets
                .iter()
                .map(|target| json!({"name": target.name, "url": target.raw}))
                .collect::<Vec<_>>(),
        }
    });

    let client = match reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "failed to build supervisor client");
            return;
        }
    };

    match client.post(&url).bearer_auth(token).json(&body).send() {
        Ok(response) if response.status().is_success() => {
            debug!(url = %url, "supervisor options updated");
        }
        Ok(response) => {
            warn!(url = %url, status = %response.status(), "supervisor rejected options update");
        }
        Err(e) => {
            warn!(url = %url, error = %e, "supervisor options update failed");
        }
    }
}
