use reqwest::Client;
use std::time::Duration;
use tracing::info;
use url::Url;

use crate::config::Config;
use crate::error::ProvisionError;
use crate::types::accounts::AccountRequest;
use crate::types::byos::{IntegrationRequest, WarehouseAssignment, WarehouseDescriptor};
use crate::types::{Created, ResourceId};

const ACCOUNTS_PATH: &str = "api/data/v1/accounts";
const BYOS_ACCOUNTS_PATH: &str = "api/query/v1/byos/accounts";
const BYOS_WAREHOUSES_PATH: &str = "api/query/v1/byos/warehouses";

/// The one authenticated HTTP client shared by every provisioning step.
pub struct DomoApi {
    client: Client,
    token: String,
    base: Url,
}

impl DomoApi {
    /// Build the client from the static configuration and the bearer token.
    pub fn new(cfg: &Config, token: String) -> Result<Self, ProvisionError> {
        let mut builder = Client::builder()
            .user_agent(concat!("byos-provisioner/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
            .timeout(Duration::from_secs(cfg.request_timeout_secs));
        if let Some(proxy_url) = cfg.proxy.as_ref() {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
        }
        Ok(Self {
            client: builder.build()?,
            token,
            base: cfg.instance_url()?,
        })
    }

    /// Create the Snowflake account and return its id.
    pub async fn create_account(&self, req: &AccountRequest) -> Result<ResourceId, ProvisionError> {
        let url = self.base.join(ACCOUNTS_PATH)?;
        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(req)
            .send()
            .await?;
        let resp = ensure_success(resp).await?;
        let created: Created = resp.json().await?;
        let id = created.id.ok_or(ProvisionError::MissingId {
            endpoint: "account creation",
        })?;
        info!(account_id = %id, "account created");
        Ok(id)
    }

    /// Create the BYOS integration and return its id.
    pub async fn create_integration(
        &self,
        req: &IntegrationRequest,
    ) -> Result<ResourceId, ProvisionError> {
        let url = self.base.join(BYOS_ACCOUNTS_PATH)?;
        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(req)
            .send()
            .await?;
        let resp = ensure_success(resp).await?;
        let created: Created = resp.json().await?;
        let id = created.id.ok_or(ProvisionError::MissingId {
            endpoint: "integration creation",
        })?;
        info!(integration_id = %id, "BYOS integration created");
        Ok(id)
    }

    /// List the warehouses available to an integration.
    pub async fn list_warehouses(
        &self,
        integration_id: &ResourceId,
    ) -> Result<Vec<WarehouseDescriptor>, ProvisionError> {
        let url = self.warehouses_url(integration_id)?;
        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
            .send()
            .await?;
        let resp = ensure_success(resp).await?;
        let warehouses: Vec<WarehouseDescriptor> = resp.json().await?;
        info!(
            integration_id = %integration_id,
            count = warehouses.len(),
            "fetched available warehouses"
        );
        Ok(warehouses)
    }

    /// Replace the integration's warehouse assignments.
    pub async fn assign_warehouses(
        &self,
        integration_id: &ResourceId,
        assignments: &[WarehouseAssignment],
    ) -> Result<(), ProvisionError> {
        let url = self.warehouses_url(integration_id)?;
        let resp = self
            .client
            .put(url)
            .bearer_auth(&self.token)
            .json(&assignments)
            .send()
            .await?;
        ensure_success(resp).await?;
        info!(integration_id = %integration_id, "warehouse assignment applied");
        Ok(())
    }

    fn warehouses_url(&self, integration_id: &ResourceId) -> Result<Url, ProvisionError> {
        Ok(self
            .base
            .join(&format!("{BYOS_WAREHOUSES_PATH}/{integration_id}"))?)
    }
}

/// Non-2xx responses become an API error carrying the status and the body
/// verbatim; nothing is retried.
async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response, ProvisionError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ProvisionError::Api { status, body })
}
