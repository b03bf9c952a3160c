use tracing::{debug, info};

use crate::api::DomoApi;
use crate::config::Config;
use crate::error::ProvisionError;
use crate::service::key_loader;
use crate::types::ResourceId;
use crate::types::accounts::AccountRequest;
use crate::types::byos::{IntegrationRequest, WarehouseAssignment};

/// Identifiers produced by a successful run.
#[derive(Debug)]
pub struct ProvisionOutcome {
    pub account_id: ResourceId,
    pub integration_id: ResourceId,
    pub warehouse_assigned: bool,
}

/// Run the three-step pipeline: account, integration, optional warehouse
/// assignment. Any error aborts the remainder; resources already created
/// on the remote side are left as-is.
pub async fn run(cfg: &Config, api: &DomoApi) -> Result<ProvisionOutcome, ProvisionError> {
    let account_id = resolve_account(cfg, api).await?;
    let integration_id = create_integration(cfg, api, &account_id).await?;
    let warehouse_assigned = assign_warehouse(cfg, api, &integration_id).await?;
    Ok(ProvisionOutcome {
        account_id,
        integration_id,
        warehouse_assigned,
    })
}

/// Use the configured account id when present, otherwise create one.
async fn resolve_account(cfg: &Config, api: &DomoApi) -> Result<ResourceId, ProvisionError> {
    if !cfg.existing_account_id.is_empty() {
        info!(
            account_id = %cfg.existing_account_id,
            "using existing account; skipping account creation"
        );
        return Ok(ResourceId::from(cfg.existing_account_id.as_str()));
    }

    let private_key = key_loader::load_private_key(&cfg.private_key_file)?;
    let request = AccountRequest::from_config(cfg, private_key);
    debug!(payload = %request.redacted_json(), "account creation payload");
    info!(
        display_name = %cfg.display_name,
        instance = %cfg.instance,
        "creating Snowflake account"
    );
    api.create_account(&request).await
}

async fn create_integration(
    cfg: &Config,
    api: &DomoApi,
    account_id: &ResourceId,
) -> Result<ResourceId, ProvisionError> {
    let friendly_name = cfg.friendly_name();
    let request = IntegrationRequest::new(account_id, friendly_name, &cfg.integration_description);
    info!(
        friendly_name = %friendly_name,
        account_id = %account_id,
        "creating BYOS integration"
    );
    api.create_integration(&request).await
}

/// Assign the configured warehouse, or skip with a notice when none is set.
/// Returns whether an assignment was made.
async fn assign_warehouse(
    cfg: &Config,
    api: &DomoApi,
    integration_id: &ResourceId,
) -> Result<bool, ProvisionError> {
    if cfg.warehouse_name.is_empty() {
        info!("no warehouse configured; skipping warehouse assignment");
        return Ok(false);
    }

    let warehouses = api.list_warehouses(integration_id).await?;
    let Some(descriptor) = warehouses
        .iter()
        .find(|w| w.warehouse == cfg.warehouse_name)
        .cloned()
    else {
        return Err(ProvisionError::WarehouseNotFound {
            name: cfg.warehouse_name.clone(),
            available: warehouses.into_iter().map(|w| w.warehouse).collect(),
        });
    };

    info!(
        warehouse = %descriptor.warehouse,
        device = descriptor.device.as_deref().unwrap_or("<unknown>"),
        size = descriptor.warehouse_size_friendly_name.as_deref().unwrap_or("<unknown>"),
        "assigning warehouse to integration"
    );
    let assignment =
        WarehouseAssignment::from_descriptor(descriptor, cfg.warehouse_activities.clone());
    api.assign_warehouses(integration_id, std::slice::from_ref(&assignment))
        .await?;
    Ok(true)
}
