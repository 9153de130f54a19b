//! In-memory ECS + Application Auto Scaling double that records every call.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::core::domain::{
    ScalableTarget, ScalableTargetRef, SchedulingStrategy, ServiceDescriptor, ServicePage,
};
use crate::core::ports::{AutoscalingApi, OrchestrationApi};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    DescribeCluster(String),
    ListServices(Option<String>),
    DescribeServices(Vec<String>),
    UpdateService { service_arn: String, desired_count: i32 },
    DescribeTargets(String),
    RegisterTarget { resource_id: String, min: i32, max: i32 },
}

pub fn service_arn(cluster: &str, service: &str) -> String {
    format!("arn:aws:ecs:eu-west-1:123456789012:service/{}/{}", cluster, service)
}

pub struct FakeCluster {
    cluster_name: Option<String>,
    page_size: usize,
    order: Vec<String>,
    services: HashMap<String, ServiceDescriptor>,
    scalable: HashSet<String>,
    failing_updates: HashSet<String>,
    failing_registers: HashSet<String>,
    failing_list: bool,
    failing_describe: bool,
    calls: Mutex<Vec<Call>>,
}

impl FakeCluster {
    pub fn new(cluster_name: &str) -> Self {
        Self {
            cluster_name: Some(cluster_name.to_string()),
            page_size: 10,
            order: Vec::new(),
            services: HashMap::new(),
            scalable: HashSet::new(),
            failing_updates: HashSet::new(),
            failing_registers: HashSet::new(),
            failing_list: false,
            failing_describe: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn missing() -> Self {
        Self { cluster_name: None, ..Self::new("") }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_service(mut self, arn: &str, strategy: SchedulingStrategy) -> Self {
        self.order.push(arn.to_string());
        self.services.insert(arn.to_string(), ServiceDescriptor {
            service_arn: arn.to_string(),
            scheduling_strategy: strategy,
            desired_count: 1,
        });
        self
    }

    pub fn with_autoscaling(mut self, resource_id: &str) -> Self {
        self.scalable.insert(resource_id.to_string());
        self
    }

    pub fn failing_update(mut self, arn: &str) -> Self {
        self.failing_updates.insert(arn.to_string());
        self
    }

    pub fn failing_register(mut self, resource_id: &str) -> Self {
        self.failing_registers.insert(resource_id.to_string());
        self
    }

    pub fn failing_list(mut self) -> Self {
        self.failing_list = true;
        self
    }

    pub fn failing_describe(mut self) -> Self {
        self.failing_describe = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Last desired count written per service, in first-update order.
    pub fn desired_counts(&self) -> Vec<(String, i32)> {
        let mut counts: Vec<(String, i32)> = Vec::new();
        for call in self.calls() {
            if let Call::UpdateService { service_arn, desired_count } = call {
                match counts.iter_mut().find(|(arn, _)| *arn == service_arn) {
                    Some(entry) => entry.1 = desired_count,
                    None => counts.push((service_arn, desired_count)),
                }
            }
        }
        counts
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl OrchestrationApi for FakeCluster {
    async fn describe_cluster(&self, cluster: &str) -> Result<Option<String>> {
        self.record(Call::DescribeCluster(cluster.to_string()));
        Ok(self.cluster_name.clone())
    }

    async fn list_services_page(&self, _cluster: &str, next_token: Option<String>) -> Result<ServicePage> {
        self.record(Call::ListServices(next_token.clone()));
        if self.failing_list {
            return Err(anyhow!("ListServices: ThrottlingException: Rate exceeded"));
        }
        let start: usize = match next_token {
            Some(token) => token.parse()?,
            None => 0,
        };
        let end = (start + self.page_size).min(self.order.len());
        Ok(ServicePage {
            service_arns: self.order[start..end].to_vec(),
            next_token: (end < self.order.len()).then(|| end.to_string()),
        })
    }

    async fn describe_services(&self, _cluster: &str, service_arns: &[String]) -> Result<Vec<ServiceDescriptor>> {
        if service_arns.len() > 10 {
            return Err(anyhow!("InvalidParameterException: too many services"));
        }
        self.record(Call::DescribeServices(service_arns.to_vec()));
        if self.failing_describe {
            return Err(anyhow!("DescribeServices: AccessDeniedException: not authorized"));
        }
        Ok(service_arns.iter().filter_map(|arn| self.services.get(arn).cloned()).collect())
    }

    async fn update_desired_count(&self, _cluster: &str, service_arn: &str, desired_count: i32) -> Result<()> {
        if self.failing_updates.contains(service_arn) {
            return Err(anyhow!("UpdateService: ServiceNotActiveException: Service was not ACTIVE."));
        }
        self.record(Call::UpdateService { service_arn: service_arn.to_string(), desired_count });
        Ok(())
    }
}

#[async_trait]
impl AutoscalingApi for FakeCluster {
    async fn describe_scalable_targets(&self, target: &ScalableTargetRef) -> Result<Vec<ScalableTarget>> {
        self.record(Call::DescribeTargets(target.resource_id.clone()));
        if !self.scalable.contains(&target.resource_id) {
            return Ok(Vec::new());
        }
        Ok(vec![ScalableTarget { resource_id: target.resource_id.clone(), min_capacity: 1, max_capacity: 4 }])
    }

    async fn register_scalable_target(&self, target: &ScalableTargetRef, min: i32, max: i32) -> Result<()> {
        if self.failing_registers.contains(&target.resource_id) {
            return Err(anyhow!("RegisterScalableTarget: AccessDeniedException: not authorized"));
        }
        self.record(Call::RegisterTarget { resource_id: target.resource_id.clone(), min, max });
        Ok(())
    }
}
