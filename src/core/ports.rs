use anyhow::Result;
use async_trait::async_trait;

use crate::core::domain::{ScalableTarget, ScalableTargetRef, ServiceDescriptor, ServicePage};

/// Container orchestration control plane (ECS).
#[async_trait]
pub trait OrchestrationApi: Send + Sync {
    /// Canonical cluster name, or `None` when the cluster does not exist.
    async fn describe_cluster(&self, cluster: &str) -> Result<Option<String>>;

    async fn list_services_page(&self, cluster: &str, next_token: Option<String>) -> Result<ServicePage>;

    /// At most [`crate::core::toggler::DESCRIBE_BATCH_SIZE`] ARNs per call.
    async fn describe_services(&self, cluster: &str, service_arns: &[String]) -> Result<Vec<ServiceDescriptor>>;

    async fn update_desired_count(&self, cluster: &str, service_arn: &str, desired_count: i32) -> Result<()>;
}

/// Application autoscaling registrations.
#[async_trait]
pub trait AutoscalingApi: Send + Sync {
    /// Empty when the resource has no scalable target.
    async fn describe_scalable_targets(&self, target: &ScalableTargetRef) -> Result<Vec<ScalableTarget>>;

    async fn register_scalable_target(&self, target: &ScalableTargetRef, min: i32, max: i32) -> Result<()>;
}
