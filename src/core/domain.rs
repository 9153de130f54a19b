use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

use crate::core::error::ToggleError;

pub const ECS_SERVICE_NAMESPACE: &str = "ecs";
pub const ECS_DESIRED_COUNT_DIMENSION: &str = "ecs:service:DesiredCount";
pub const MAX_REPORTED_ERRORS: usize = 25;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToggleAction {
    On,
    Off,
}

impl ToggleAction {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "on" => Some(Self::On),
            "off" => Some(Self::Off),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }
}

impl fmt::Display for ToggleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values applied when a cluster is switched back on.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct OnParams {
    pub desired_count: i32,
    pub autoscaling_min: i32,
    pub autoscaling_max: i32,
}

impl Default for OnParams {
    fn default() -> Self {
        Self { desired_count: 1, autoscaling_min: 1, autoscaling_max: 2 }
    }
}

/// Desired count plus autoscaling bounds that a single service is moved to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetCapacity {
    pub desired_count: i32,
    pub min: i32,
    pub max: i32,
}

/// Integer field that also accepts its string form (`"3"`). Anything else
/// is kept as raw JSON so it can be rejected as a validation error.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum IntOrString {
    Int(i64),
    Text(String),
    Other(Value),
}

impl IntOrString {
    fn to_i64(&self, field: &str) -> Result<i64, ToggleError> {
        let not_integer = || ToggleError::validation(format!("{} must be an integer", field));
        match self {
            Self::Int(v) => Ok(*v),
            Self::Text(s) => s.trim().parse::<i64>().map_err(|_| not_integer()),
            Self::Other(Value::Number(n)) if n.is_u64() => {
                Err(ToggleError::validation(format!("{} is out of range", field)))
            }
            Self::Other(_) => Err(not_integer()),
        }
    }
}

// A present key always yields `Some`, so an explicit `null` is rejected instead
// of falling back to the default.
fn present<'de, D>(deserializer: D) -> Result<Option<IntOrString>, D::Error>
where
    D: Deserializer<'de>,
{
    IntOrString::deserialize(deserializer).map(Some)
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct OnInput {
    #[serde(default, deserialize_with = "present")]
    pub desired_count: Option<IntOrString>,
    #[serde(default, deserialize_with = "present")]
    pub autoscaling_min: Option<IntOrString>,
    #[serde(default, deserialize_with = "present")]
    pub autoscaling_max: Option<IntOrString>,
}

/// Raw invocation payload, as received over HTTP or stdin. `action` and
/// `cluster_arn` stay untyped so a wrong JSON type is a validation error.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct ToggleEvent {
    pub action: Option<Value>,
    pub cluster_arn: Option<Value>,
    pub input: Option<OnInput>,
}

impl ToggleEvent {
    pub fn from_json(raw: &str) -> Result<Self, ToggleError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(raw).map_err(|e| ToggleError::validation(format!("Invalid event payload: {}", e)))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToggleRequest {
    pub action: ToggleAction,
    pub cluster_arn: String,
    pub on: OnParams,
}

impl ToggleRequest {
    /// Validates an event. Missing on-parameters fall back to `defaults`.
    pub fn from_event(event: ToggleEvent, defaults: &OnParams) -> Result<Self, ToggleError> {
        let action = event.action.as_ref()
            .and_then(Value::as_str)
            .and_then(ToggleAction::parse)
            .ok_or_else(|| ToggleError::validation("Input must include action: 'on' or 'off'"))?;

        let cluster_arn = event.cluster_arn.as_ref()
            .and_then(Value::as_str)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ToggleError::validation("Input must include cluster_arn"))?;

        let input = event.input.unwrap_or_default();
        let read = |value: &Option<IntOrString>, field: &str, fallback: i32| -> Result<i64, ToggleError> {
            match value {
                Some(v) => v.to_i64(field),
                None => Ok(i64::from(fallback)),
            }
        };
        let desired = read(&input.desired_count, "desired_count", defaults.desired_count)?;
        let min = read(&input.autoscaling_min, "autoscaling_min", defaults.autoscaling_min)?;
        let max = read(&input.autoscaling_max, "autoscaling_max", defaults.autoscaling_max)?;

        if desired < 0 {
            return Err(ToggleError::validation("desired_count must be >= 0"));
        }
        if min < 0 || max < 0 {
            return Err(ToggleError::validation("autoscaling_min/autoscaling_max must be >= 0"));
        }
        if max < min {
            return Err(ToggleError::validation("autoscaling_max must be >= autoscaling_min"));
        }

        let narrow = |v: i64, field: &str| {
            i32::try_from(v).map_err(|_| ToggleError::validation(format!("{} is out of range", field)))
        };

        Ok(Self {
            action,
            cluster_arn,
            on: OnParams {
                desired_count: narrow(desired, "desired_count")?,
                autoscaling_min: narrow(min, "autoscaling_min")?,
                autoscaling_max: narrow(max, "autoscaling_max")?,
            },
        })
    }

    pub fn target_capacity(&self) -> TargetCapacity {
        match self.action {
            ToggleAction::Off => TargetCapacity { desired_count: 0, min: 0, max: 0 },
            ToggleAction::On => TargetCapacity {
                desired_count: self.on.desired_count,
                min: self.on.autoscaling_min,
                max: self.on.autoscaling_max,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchedulingStrategy {
    Replica,
    /// One task per container instance; never toggled.
    Daemon,
    Other(String),
}

impl SchedulingStrategy {
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "REPLICA" => Self::Replica,
            "DAEMON" => Self::Daemon,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Replica => "REPLICA",
            Self::Daemon => "DAEMON",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_daemon(&self) -> bool {
        matches!(self, Self::Daemon)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceDescriptor {
    pub service_arn: String,
    pub scheduling_strategy: SchedulingStrategy,
    pub desired_count: i32,
}

/// One page of a `ListServices` walk.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServicePage {
    pub service_arns: Vec<String>,
    pub next_token: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScalableTargetRef {
    pub resource_id: String,
}

impl ScalableTargetRef {
    pub fn for_service(cluster_name: &str, service_name: &str) -> Self {
        Self { resource_id: format!("service/{}/{}", cluster_name, service_name) }
    }

    pub fn namespace(&self) -> &'static str {
        ECS_SERVICE_NAMESPACE
    }

    pub fn dimension(&self) -> &'static str {
        ECS_DESIRED_COUNT_DIMENSION
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScalableTarget {
    pub resource_id: String,
    pub min_capacity: i32,
    pub max_capacity: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ServiceOutcome {
    Updated,
    Skipped,
    Failed(String),
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceFailure {
    pub service_arn: String,
    pub error: String,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ToggleReport {
    pub action: ToggleAction,
    pub cluster_arn: String,
    pub desired_count_on: i32,
    pub autoscaling_min_on: i32,
    pub autoscaling_max_on: i32,
    pub service_count: usize,
    pub updated_count: usize,
    pub skipped_count: usize,
    pub error_count: usize,
    pub errors: Vec<ServiceFailure>,
}

impl ToggleReport {
    /// `service_count` is the number of listed services, which can exceed
    /// `outcomes.len()` when a listed service is not returned by describe.
    pub fn tally(request: &ToggleRequest, service_count: usize, outcomes: Vec<(String, ServiceOutcome)>) -> Self {
        let mut updated_count = 0;
        let mut skipped_count = 0;
        let mut error_count = 0;
        let mut errors = Vec::new();

        for (service_arn, outcome) in outcomes {
            match outcome {
                ServiceOutcome::Updated => updated_count += 1,
                ServiceOutcome::Skipped => skipped_count += 1,
                ServiceOutcome::Failed(error) => {
                    error_count += 1;
                    if errors.len() < MAX_REPORTED_ERRORS {
                        errors.push(ServiceFailure { service_arn, error });
                    }
                }
            }
        }

        Self {
            action: request.action,
            cluster_arn: request.cluster_arn.clone(),
            desired_count_on: request.on.desired_count,
            autoscaling_min_on: request.on.autoscaling_min,
            autoscaling_max_on: request.on.autoscaling_max,
            service_count,
            updated_count,
            skipped_count,
            error_count,
            errors,
        }
    }
}
