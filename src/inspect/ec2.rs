use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{InspectError, ProviderClient, ResourceInspector};
use crate::resource::{AttrMap, DeclaredResourceState};

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    pub value: String,
}

fn tags_to_map(tags: &[Tag]) -> Value {
    Value::Object(
        tags.iter()
            .map(|t| (t.key.clone(), Value::String(t.value.clone())))
            .collect(),
    )
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct GroupRef {
    pub group_id: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct Placement {
    #[serde(default)]
    pub availability_zone: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceState {
    #[serde(default)]
    pub name: String,
}

/// Raw EC2 instance document as returned by the describe API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstanceDoc {
    pub instance_id: String,
    pub instance_type: String,
    pub image_id: String,
    #[serde(default)]
    pub placement: Placement,
    #[serde(default)]
    pub subnet_id: String,
    #[serde(default)]
    pub security_groups: Vec<GroupRef>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub state: InstanceState,
    #[serde(default)]
    pub private_ip_address: String,
    #[serde(default)]
    pub public_ip_address: String,
}

impl InstanceDoc {
    /// Translate provider field names into the declared schema's
    /// attribute namespace.
    pub fn into_attributes(self) -> AttrMap {
        let mut attrs = AttrMap::new();
        attrs.insert("id".into(), json!(self.instance_id));
        attrs.insert("instance_type".into(), json!(self.instance_type));
        attrs.insert("ami".into(), json!(self.image_id));
        attrs.insert(
            "availability_zone".into(),
            json!(self.placement.availability_zone),
        );
        attrs.insert("subnet_id".into(), json!(self.subnet_id));
        attrs.insert(
            "vpc_security_group_ids".into(),
            Value::Array(
                self.security_groups
                    .iter()
                    .map(|g| Value::String(g.group_id.clone()))
                    .collect(),
            ),
        );
        attrs.insert("tags".into(), tags_to_map(&self.tags));
        attrs.insert("state".into(), json!(self.state.name));
        attrs.insert("private_ip".into(), json!(self.private_ip_address));
        attrs.insert("public_ip".into(), json!(self.public_ip_address));
        attrs
    }
}

pub struct Ec2InstanceInspector {
    client: ProviderClient,
}

impl Ec2InstanceInspector {
    pub fn new(client: ProviderClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceInspector for Ec2InstanceInspector {
    fn resource_type(&self) -> &str {
        "aws_instance"
    }

    async fn describe(
        &self,
        declared: &DeclaredResourceState,
    ) -> Result<Option<AttrMap>, InspectError> {
        let id = declared
            .attr_str("id")
            .ok_or(InspectError::MissingId { attribute: "id" })?;

        let Some(body) = self
            .client
            .describe_resource(&format!("ec2/instances/{id}"))
            .await?
        else {
            return Ok(None);
        };

        let doc: InstanceDoc = serde_json::from_value(body).map_err(|e| InspectError::Api {
            status: 200,
            message: format!("failed to parse instance document: {}", e),
        })?;
        Ok(Some(doc.into_attributes()))
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct IpRange {
    pub cidr_ip: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct IpPermission {
    #[serde(default)]
    pub from_port: i64,
    #[serde(default)]
    pub to_port: i64,
    #[serde(default = "default_protocol")]
    pub ip_protocol: String,
    #[serde(default)]
    pub ip_ranges: Vec<IpRange>,
    #[serde(default)]
    pub user_id_group_pairs: Vec<GroupRef>,
}

fn default_protocol() -> String {
    "-1".to_string()
}

impl IpPermission {
    fn into_rule(self) -> Value {
        json!({
            "from_port": self.from_port,
            "to_port": self.to_port,
            "protocol": self.ip_protocol,
            "cidr_blocks": self.ip_ranges.iter().map(|r| r.cidr_ip.clone()).collect::<Vec<_>>(),
            "security_groups": self.user_id_group_pairs.iter().map(|g| g.group_id.clone()).collect::<Vec<_>>(),
        })
    }
}

/// Raw security group document as returned by the describe API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SecurityGroupDoc {
    pub group_id: String,
    pub group_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub vpc_id: String,
    #[serde(default)]
    pub ip_permissions: Vec<IpPermission>,
    #[serde(default)]
    pub ip_permissions_egress: Vec<IpPermission>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl SecurityGroupDoc {
    pub fn into_attributes(self) -> AttrMap {
        let mut attrs = AttrMap::new();
        attrs.insert("id".into(), json!(self.group_id));
        attrs.insert("name".into(), json!(self.group_name));
        attrs.insert("description".into(), json!(self.description));
        attrs.insert("vpc_id".into(), json!(self.vpc_id));
        attrs.insert("tags".into(), tags_to_map(&self.tags));
        attrs.insert(
            "ingress".into(),
            Value::Array(
                self.ip_permissions
                    .into_iter()
                    .map(IpPermission::into_rule)
                    .collect(),
            ),
        );
        attrs.insert(
            "egress".into(),
            Value::Array(
                self.ip_permissions_egress
                    .into_iter()
                    .map(IpPermission::into_rule)
                    .collect(),
            ),
        );
        attrs
    }
}

pub struct SecurityGroupInspector {
    client: ProviderClient,
}

impl SecurityGroupInspector {
    pub fn new(client: ProviderClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceInspector for SecurityGroupInspector {
    fn resource_type(&self) -> &str {
        "aws_security_group"
    }

    async fn describe(
        &self,
        declared: &DeclaredResourceState,
    ) -> Result<Option<AttrMap>, InspectError> {
        let id = declared
            .attr_str("id")
            .ok_or(InspectError::MissingId { attribute: "id" })?;

        let Some(body) = self
            .client
            .describe_resource(&format!("ec2/security-groups/{id}"))
            .await?
        else {
            return Ok(None);
        };

        let doc: SecurityGroupDoc =
            serde_json::from_value(body).map_err(|e| InspectError::Api {
                status: 200,
                message: format!("failed to parse security group document: {}", e),
            })?;
        Ok(Some(doc.into_attributes()))
    }
}
