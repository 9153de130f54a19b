use std::env;

use crate::core::domain::OnParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Server,
    OneShot,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub node_name: String,
    pub host: String,
    pub http_port: u16,
    pub run_mode: RunMode,
    pub aws_region: Option<String>,
    pub default_on: OnParams,
}

impl AppConfig {
    pub fn load() -> Self {
        let run_mode = match env::var("RUN_MODE").unwrap_or_default().trim().to_lowercase().as_str() {
            "oneshot" | "one-shot" => RunMode::OneShot,
            _ => RunMode::Server,
        };

        Self {
            env: env::var("ENV").unwrap_or_else(|_| "production".into()),
            node_name: env::var("NODE_NAME").unwrap_or_else(|_|
                hostname::get().map(|h| h.to_string_lossy().into_owned()).unwrap_or("TOGGLE-NODE".into())
            ).to_uppercase(),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: env::var("HTTP_PORT").unwrap_or("11090".to_string()).parse().unwrap_or(11090),
            run_mode,
            aws_region: env::var("AWS_REGION").ok().filter(|r| !r.trim().is_empty()),
            default_on: OnParams {
                desired_count: env_i32("DEFAULT_DESIRED_COUNT", 1),
                autoscaling_min: env_i32("DEFAULT_AUTOSCALING_MIN", 1),
                autoscaling_max: env_i32("DEFAULT_AUTOSCALING_MAX", 2),
            },
        }
    }
}

fn env_i32(key: &str, fallback: i32) -> i32 {
    env::var(key).ok().and_then(|v| v.trim().parse().ok()).unwrap_or(fallback)
}
