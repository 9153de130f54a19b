use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::arn::parse_service_arn;
use crate::core::domain::{
    ScalableTargetRef, ServiceDescriptor, ServiceOutcome, ToggleReport, ToggleRequest,
};
use crate::core::error::ToggleError;
use crate::core::ports::{AutoscalingApi, OrchestrationApi};

/// DescribeServices accepts at most 10 services per call.
pub const DESCRIBE_BATCH_SIZE: usize = 10;

#[derive(Clone)]
pub struct ClusterToggler {
    orchestration: Arc<dyn OrchestrationApi>,
    autoscaling: Arc<dyn AutoscalingApi>,
}

impl ClusterToggler {
    pub fn new(orchestration: Arc<dyn OrchestrationApi>, autoscaling: Arc<dyn AutoscalingApi>) -> Self {
        Self { orchestration, autoscaling }
    }

    /// Switches every non-daemon service in the cluster on or off.
    ///
    /// Services are processed one at a time. A failure on one service is
    /// recorded in the report and the run moves on; only cluster lookup,
    /// listing and describe failures abort.
    pub async fn toggle(&self, request: &ToggleRequest) -> Result<ToggleReport, ToggleError> {
        info!(
            event = "TOGGLE_STARTED",
            action = %request.action,
            cluster = %request.cluster_arn,
            "Cluster toggle started"
        );

        let cluster_name = self.orchestration.describe_cluster(&request.cluster_arn).await?
            .ok_or_else(|| ToggleError::not_found(request.cluster_arn.clone()))?;

        let service_arns = self.list_all_services(&request.cluster_arn).await?;
        debug!(event = "SERVICES_LISTED", cluster.name = %cluster_name, count = service_arns.len(), "Services listed");

        let mut outcomes = Vec::with_capacity(service_arns.len());
        for batch in service_arns.chunks(DESCRIBE_BATCH_SIZE) {
            let services = self.orchestration.describe_services(&request.cluster_arn, batch).await?;
            for svc in &services {
                let outcome = self.toggle_service(request, &cluster_name, svc).await;
                outcomes.push((svc.service_arn.clone(), outcome));
            }
        }

        let report = ToggleReport::tally(request, service_arns.len(), outcomes);
        info!(
            event = "TOGGLE_COMPLETED",
            action = %request.action,
            cluster = %request.cluster_arn,
            services = report.service_count,
            updated = report.updated_count,
            skipped = report.skipped_count,
            errors = report.error_count,
            "✅ Cluster toggle completed"
        );
        Ok(report)
    }

    async fn list_all_services(&self, cluster: &str) -> anyhow::Result<Vec<String>> {
        let mut service_arns = Vec::new();
        let mut next_token = None;
        loop {
            let page = self.orchestration.list_services_page(cluster, next_token).await?;
            service_arns.extend(page.service_arns);
            next_token = page.next_token.filter(|t| !t.is_empty());
            if next_token.is_none() { break; }
        }
        Ok(service_arns)
    }

    async fn toggle_service(&self, request: &ToggleRequest, cluster_name: &str, svc: &ServiceDescriptor) -> ServiceOutcome {
        if svc.scheduling_strategy.is_daemon() {
            info!(event = "SERVICE_SKIPPED_DAEMON", service = %svc.service_arn, "Daemon service skipped");
            return ServiceOutcome::Skipped;
        }

        let parts = parse_service_arn(&svc.service_arn);
        let effective_cluster = parts.cluster_name.as_deref().unwrap_or(cluster_name);
        let target = ScalableTargetRef::for_service(effective_cluster, &parts.service_name);

        match self.apply(request, svc, &target).await {
            Ok(()) => ServiceOutcome::Updated,
            Err(e) => {
                let message = format!("{:#}", e);
                warn!(
                    event = "SERVICE_TOGGLE_FAILED",
                    service = %svc.service_arn,
                    error = %message,
                    "Service could not be toggled"
                );
                ServiceOutcome::Failed(message)
            }
        }
    }

    // Autoscaling bounds go first so the scaler cannot undo the new desired count.
    async fn apply(&self, request: &ToggleRequest, svc: &ServiceDescriptor, target: &ScalableTargetRef) -> anyhow::Result<()> {
        let capacity = request.target_capacity();

        let existing = self.autoscaling.describe_scalable_targets(target).await?;
        if let Some(current) = existing.first() {
            self.autoscaling.register_scalable_target(target, capacity.min, capacity.max).await?;
            debug!(
                event = "SCALABLE_TARGET_REGISTERED",
                resource_id = %current.resource_id,
                from.min = current.min_capacity,
                from.max = current.max_capacity,
                to.min = capacity.min,
                to.max = capacity.max,
                "Autoscaling bounds updated"
            );
        }

        self.orchestration.update_desired_count(&request.cluster_arn, &svc.service_arn, capacity.desired_count).await?;
        info!(
            event = "SERVICE_UPDATED",
            service = %svc.service_arn,
            strategy = svc.scheduling_strategy.as_str(),
            from = svc.desired_count,
            to = capacity.desired_count,
            autoscaling = !existing.is_empty(),
            "Desired count updated"
        );
        Ok(())
    }
}
