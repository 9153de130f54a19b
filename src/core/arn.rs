//! Service ARN parsing.
//!
//! Long-form ARNs look like `arn:aws:ecs:region:account:service/cluster/service`.
//! Old short-form ARNs drop the cluster segment.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceArnParts {
    pub cluster_name: Option<String>,
    pub service_name: String,
}

pub fn parse_service_arn(service_arn: &str) -> ServiceArnParts {
    let suffix = service_arn.rsplit(":service/").next().unwrap_or(service_arn);
    let parts: Vec<&str> = suffix.split('/').collect();

    let service_name = parts.last().copied().unwrap_or_default().to_string();
    let cluster_name = if parts.len() >= 2 {
        Some(parts[0]).filter(|c| !c.is_empty()).map(str::to_string)
    } else {
        None
    };

    ServiceArnParts { cluster_name, service_name }
}
