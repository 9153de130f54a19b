use anyhow::{anyhow, Result};
use async_trait::async_trait;
use aws_sdk_ecs::error::DisplayErrorContext;
use aws_sdk_ecs::Client;
use tracing::debug;

use crate::core::domain::{SchedulingStrategy, ServiceDescriptor, ServicePage};
use crate::core::ports::OrchestrationApi;

// ListServices caps a page at 100.
const LIST_PAGE_SIZE: i32 = 100;

#[derive(Clone)]
pub struct EcsAdapter {
    client: Client,
}

impl EcsAdapter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OrchestrationApi for EcsAdapter {
    async fn describe_cluster(&self, cluster: &str) -> Result<Option<String>> {
        let out = self.client.describe_clusters().clusters(cluster).send().await
            .map_err(|e| anyhow!("DescribeClusters: {}", DisplayErrorContext(&e)))?;

        for failure in out.failures() {
            debug!(
                event = "ECS_CLUSTER_LOOKUP_FAILURE",
                arn = failure.arn().unwrap_or_default(),
                reason = failure.reason().unwrap_or_default(),
                "Cluster lookup returned a failure"
            );
        }

        Ok(out.clusters().first()
            .and_then(|c| c.cluster_name())
            .map(str::to_string))
    }

    async fn list_services_page(&self, cluster: &str, next_token: Option<String>) -> Result<ServicePage> {
        let out = self.client.list_services()
            .cluster(cluster)
            .max_results(LIST_PAGE_SIZE)
            .set_next_token(next_token)
            .send().await
            .map_err(|e| anyhow!("ListServices: {}", DisplayErrorContext(&e)))?;

        Ok(ServicePage {
            service_arns: out.service_arns().to_vec(),
            next_token: out.next_token().map(str::to_string),
        })
    }

    async fn describe_services(&self, cluster: &str, service_arns: &[String]) -> Result<Vec<ServiceDescriptor>> {
        let out = self.client.describe_services()
            .cluster(cluster)
            .set_services(Some(service_arns.to_vec()))
            .send().await
            .map_err(|e| anyhow!("DescribeServices: {}", DisplayErrorContext(&e)))?;

        Ok(out.services().iter().filter_map(|svc| {
            let service_arn = svc.service_arn()?.to_string();
            let strategy = svc.scheduling_strategy().map(|s| s.as_str()).unwrap_or_default();
            Some(ServiceDescriptor {
                service_arn,
                scheduling_strategy: SchedulingStrategy::from_wire(strategy),
                desired_count: svc.desired_count(),
            })
        }).collect())
    }

    async fn update_desired_count(&self, cluster: &str, service_arn: &str, desired_count: i32) -> Result<()> {
        self.client.update_service()
            .cluster(cluster)
            .service(service_arn)
            .desired_count(desired_count)
            .send().await
            .map_err(|e| anyhow!("UpdateService: {}", DisplayErrorContext(&e)))?;
        Ok(())
    }
}
