use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::ec2::Tag;
use super::{InspectError, ProviderClient, ResourceInspector};
use crate::resource::{AttrMap, DeclaredResourceState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Versioning {
    #[serde(default = "default_versioning_status")]
    pub status: String,
}

impl Default for Versioning {
    fn default() -> Self {
        Self {
            status: default_versioning_status(),
        }
    }
}

fn default_versioning_status() -> String {
    "Disabled".to_string()
}

/// Raw S3 bucket document as returned by the describe API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BucketDoc {
    pub name: String,
    #[serde(default)]
    pub location_constraint: Option<String>,
    #[serde(default)]
    pub versioning: Versioning,
    #[serde(default)]
    pub tag_set: Vec<Tag>,
}

impl BucketDoc {
    pub fn into_attributes(self) -> AttrMap {
        let mut attrs = AttrMap::new();
        attrs.insert("bucket".into(), json!(self.name));
        // An absent location constraint means the default region
        attrs.insert(
            "region".into(),
            json!(self.location_constraint.unwrap_or_else(|| "us-east-1".to_string())),
        );
        attrs.insert("versioning".into(), json!(self.versioning.status));
        attrs.insert(
            "tags".into(),
            serde_json::Value::Object(
                self.tag_set
                    .iter()
                    .map(|t| (t.key.clone(), serde_json::Value::String(t.value.clone())))
                    .collect(),
            ),
        );
        attrs
    }
}

pub struct S3BucketInspector {
    client: ProviderClient,
}

impl S3BucketInspector {
    pub fn new(client: ProviderClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceInspector for S3BucketInspector {
    fn resource_type(&self) -> &str {
        "aws_s3_bucket"
    }

    async fn describe(
        &self,
        declared: &DeclaredResourceState,
    ) -> Result<Option<AttrMap>, InspectError> {
        // Buckets are addressed by name, not by the synthetic `id`.
        let name = declared.attr_str("bucket").ok_or(InspectError::MissingId {
            attribute: "bucket",
        })?;

        let Some(body) = self
            .client
            .describe_resource(&format!("s3/buckets/{name}"))
            .await?
        else {
            return Ok(None);
        };

        let doc: BucketDoc = serde_json::from_value(body).map_err(|e| InspectError::Api {
            status: 200,
            message: format!("failed to parse bucket document: {}", e),
        })?;
        Ok(Some(doc.into_attributes()))
    }
}
