use mimalloc::MiMalloc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use byos_provisioner::ProvisionError;
use byos_provisioner::api::DomoApi;
use byos_provisioner::config::{self, Config};
use byos_provisioner::service::provisioner;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cfg = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            // Logging is configured from the config; a load failure goes to stderr.
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        instance = %cfg.instance,
        proxy = %cfg.proxy.as_ref().map(|u| u.as_str()).unwrap_or("<none>"),
        loglevel = %cfg.loglevel,
        "starting BYOS provisioning"
    );

    if let Err(e) = run(&cfg).await {
        error!(error = %e, "provisioning failed");
        std::process::exit(1);
    }
}

async fn run(cfg: &Config) -> Result<(), ProvisionError> {
    let token = config::load_access_token()?;
    let api = DomoApi::new(cfg, token)?;
    let outcome = provisioner::run(cfg, &api).await?;
    info!(
        account_id = %outcome.account_id,
        integration_id = %outcome.integration_id,
        warehouse_assigned = outcome.warehouse_assigned,
        "provisioning complete"
    );
    Ok(())
}
