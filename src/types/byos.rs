use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fmt, str::FromStr};

use super::ids::ResourceId;
use crate::error::ProvisionError;

/// Engine identifier sent with every integration request.
pub const SNOWFLAKE_ENGINE: &str = "SNOWFLAKE";

const CONFIG_TYPE: &str = "CONFIG";
const KEY_PAIR_AUTH: &str = "KEY_PAIR";

/// Operations a warehouse assignment may be granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
    Query,
    Index,
    Dataflow,
}

impl Activity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Index => "index",
            Self::Dataflow => "dataflow",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Activity {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "query" => Ok(Self::Query),
            "index" => Ok(Self::Index),
            "dataflow" => Ok(Self::Dataflow),
            other => Err(ProvisionError::Config(format!(
                "unknown warehouse activity '{other}'; expected one of query, index, dataflow"
            ))),
        }
    }
}

/// One `{key, configType, value}` entry in the integration properties map.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigProperty {
    pub key: &'static str,
    #[serde(rename = "configType")]
    pub config_type: &'static str,
    pub value: String,
}

impl ConfigProperty {
    fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            config_type: CONFIG_TYPE,
            value: value.into(),
        }
    }
}

/// Integration-creation request body.
#[derive(Debug, Clone, Serialize)]
pub struct IntegrationRequest {
    pub engine: &'static str,
    pub properties: IntegrationProperties,
}

#[derive(Debug, Clone, Serialize)]
pub struct IntegrationProperties {
    #[serde(rename = "friendlyName")]
    pub friendly_name: ConfigProperty,
    pub description: ConfigProperty,
    #[serde(rename = "serviceAccountId")]
    pub service_account_id: ConfigProperty,
    #[serde(rename = "AUTH_METHOD")]
    pub auth_method: ConfigProperty,
    #[serde(rename = "ADMIN_AUTH_METHOD")]
    pub admin_auth_method: ConfigProperty,
}

impl IntegrationRequest {
    pub fn new(
        account_id: &ResourceId,
        friendly_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            engine: SNOWFLAKE_ENGINE,
            properties: IntegrationProperties {
                friendly_name: ConfigProperty::new("friendlyName", friendly_name),
                description: ConfigProperty::new("description", description),
                service_account_id: ConfigProperty::new("serviceAccountId", account_id.to_string()),
                auth_method: ConfigProperty::new("AUTH_METHOD", KEY_PAIR_AUTH),
                admin_auth_method: ConfigProperty::new("ADMIN_AUTH_METHOD", KEY_PAIR_AUTH),
            },
        }
    }
}

/// Warehouse entry as returned by the availability listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseDescriptor {
    pub warehouse: String,
    #[serde(default)]
    pub device_name: Option<String>,
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub instance_size: Option<Value>,
    #[serde(default)]
    pub warehouse_size_friendly_name: Option<String>,
}

/// Assignment payload entry: the matched descriptor echoed back with the
/// granted activities.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseAssignment {
    pub device_name: Option<String>,
    pub warehouse: String,
    pub device: Option<String>,
    pub instance_size: Option<Value>,
    pub warehouse_size_friendly_name: Option<String>,
    pub activities: Vec<Activity>,
}

impl WarehouseAssignment {
    pub fn from_descriptor(descriptor: WarehouseDescriptor, activities: Vec<Activity>) -> Self {
        Self {
            device_name: descriptor.device_name,
            warehouse: descriptor.warehouse,
            device: descriptor.device,
            instance_size: descriptor.instance_size,
            warehouse_size_friendly_name: descriptor.warehouse_size_friendly_name,
            activities,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn activities_parse_from_their_wire_form() {
        assert_eq!("query".parse::<Activity>().unwrap(), Activity::Query);
        assert_eq!("index".parse::<Activity>().unwrap(), Activity::Index);
        assert_eq!("dataflow".parse::<Activity>().unwrap(), Activity::Dataflow);
    }

    #[test]
    fn unrecognized_activity_is_a_config_error() {
        let err = "transform".parse::<Activity>().expect_err("must reject");
        assert!(matches!(err, ProvisionError::Config(_)));
        assert!(err.to_string().contains("transform"));
    }

    #[test]
    fn activity_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value([Activity::Query, Activity::Dataflow]).unwrap(),
            json!(["query", "dataflow"])
        );
    }

    #[test]
    fn integration_request_wire_shape() {
        let req = IntegrationRequest::new(&ResourceId::Num(42), "Analytics", "BI warehouse");
        let body = serde_json::to_value(&req).unwrap();

        assert_eq!(body["engine"], "SNOWFLAKE");
        let props = &body["properties"];
        assert_eq!(props["friendlyName"]["key"], "friendlyName");
        assert_eq!(props["friendlyName"]["configType"], "CONFIG");
        assert_eq!(props["friendlyName"]["value"], "Analytics");
        assert_eq!(props["description"]["value"], "BI warehouse");
        // Numeric account ids are stringified on the wire.
        assert_eq!(props["serviceAccountId"]["value"], "42");
        assert_eq!(props["AUTH_METHOD"]["value"], "KEY_PAIR");
        assert_eq!(props["ADMIN_AUTH_METHOD"]["value"], "KEY_PAIR");
    }

    #[test]
    fn assignment_echoes_descriptor_fields_and_activities() {
        let descriptor: WarehouseDescriptor = serde_json::from_value(json!({
            "warehouse": "WH_PROD",
            "deviceName": "snowflake-1",
            "device": "dev-9",
            "instanceSize": "MEDIUM",
            "warehouseSizeFriendlyName": "Medium"
        }))
        .unwrap();

        let assignment =
            WarehouseAssignment::from_descriptor(descriptor, vec![Activity::Query, Activity::Index]);
        let body = serde_json::to_value(&assignment).unwrap();

        assert_eq!(body["warehouse"], "WH_PROD");
        assert_eq!(body["deviceName"], "snowflake-1");
        assert_eq!(body["device"], "dev-9");
        assert_eq!(body["instanceSize"], "MEDIUM");
        assert_eq!(body["warehouseSizeFriendlyName"], "Medium");
        assert_eq!(body["activities"], json!(["query", "index"]));
    }

    #[test]
    fn descriptor_tolerates_missing_optional_fields() {
        let descriptor: WarehouseDescriptor =
            serde_json::from_value(json!({ "warehouse": "WH_DEV" })).unwrap();
        assert_eq!(descriptor.warehouse, "WH_DEV");
        assert!(descriptor.device_name.is_none());
    }
}
