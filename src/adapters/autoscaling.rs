use anyhow::{anyhow, Result};
use async_trait::async_trait;
use aws_sdk_applicationautoscaling::error::DisplayErrorContext;
use aws_sdk_applicationautoscaling::types::{ScalableDimension, ServiceNamespace};
use aws_sdk_applicationautoscaling::Client;

use crate::core::domain::{ScalableTarget, ScalableTargetRef};
use crate::core::ports::AutoscalingApi;

#[derive(Clone)]
pub struct AutoscalingAdapter {
    client: Client,
}

impl AutoscalingAdapter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AutoscalingApi for AutoscalingAdapter {
    async fn describe_scalable_targets(&self, target: &ScalableTargetRef) -> Result<Vec<ScalableTarget>> {
        let out = self.client.describe_scalable_targets()
            .service_namespace(ServiceNamespace::from(target.namespace()))
            .scalable_dimension(ScalableDimension::from(target.dimension()))
            .resource_ids(target.resource_id.as_str())
            .send().await
            .map_err(|e| anyhow!("DescribeScalableTargets: {}", DisplayErrorContext(&e)))?;

        Ok(out.scalable_targets().iter().map(|t| ScalableTarget {
            resource_id: t.resource_id().to_string(),
            min_capacity: t.min_capacity(),
            max_capacity: t.max_capacity(),
        }).collect())
    }

    async fn register_scalable_target(&self, target: &ScalableTargetRef, min: i32, max: i32) -> Result<()> {
        self.client.register_scalable_target()
            .service_namespace(ServiceNamespace::from(target.namespace()))
            .scalable_dimension(ScalableDimension::from(target.dimension()))
            .resource_id(target.resource_id.as_str())
            .min_capacity(min)
            .max_capacity(max)
            .send().await
            .map_err(|e| anyhow!("RegisterScalableTarget: {}", DisplayErrorContext(&e)))?;
        Ok(())
    }
}
