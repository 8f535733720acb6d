use tracing::{error, info};

use webui_proxy::config::Settings;
use webui_proxy::generate;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("webui_proxy=info".parse().expect("valid log directive")),
        )
        .init();

    let settings = Settings::from_env();
    info!(
        options = %settings.options_path.display(),
        nginx = %settings.nginx_conf_path.display(),
        "starting generation run"
    );

    generate::run(&settings).map_err(|e| {
        error!(error = %e, "generation failed");
        e
    })
}
