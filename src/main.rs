mod config;
mod core;
mod adapters;
mod api;
mod telemetry;

use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

use crate::adapters::autoscaling::AutoscalingAdapter;
use crate::adapters::ecs::EcsAdapter;
use crate::config::{AppConfig, RunMode};
use crate::core::domain::{OnParams, ToggleEvent, ToggleRequest};
use crate::core::toggler::ClusterToggler;
use crate::telemetry::JsonLogFormatter;

pub struct AppState {
    pub toggler: ClusterToggler,
    pub default_on: OnParams,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = AppConfig::load();

    // --- LOGGING SETUP ---
    // stdout is reserved for the report in one-shot mode
    let rust_log_env = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&rust_log_env))?;
    let subscriber = Registry::default().with(env_filter);

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    if log_format == "json" {
        let formatter = JsonLogFormatter::new(
            env!("CARGO_PKG_NAME").to_string(),
            env!("CARGO_PKG_VERSION").to_string(),
            cfg.env.clone(),
            cfg.node_name.clone(),
        );
        subscriber.with(fmt::layer().event_format(formatter).with_writer(std::io::stderr)).init();
    } else {
        subscriber.with(fmt::layer().compact().with_writer(std::io::stderr)).init();
    }

    info!(
        event = "SYSTEM_STARTUP",
        service.version = env!("CARGO_PKG_VERSION"),
        node.name = %cfg.node_name,
        mode = if cfg.run_mode == RunMode::OneShot { "ONESHOT" } else { "SERVER" },
        region = cfg.aws_region.as_deref().unwrap_or("default-chain"),
        "💠 ECS SERVICE TOGGLE booting..."
    );

    let aws = adapters::load_aws_config(cfg.aws_region.clone()).await;
    let toggler = ClusterToggler::new(
        Arc::new(EcsAdapter::new(aws_sdk_ecs::Client::new(&aws))),
        Arc::new(AutoscalingAdapter::new(aws_sdk_applicationautoscaling::Client::new(&aws))),
    );

    match cfg.run_mode {
        RunMode::OneShot => run_once(&toggler, &cfg).await,
        RunMode::Server => {
            let state = Arc::new(AppState { toggler, default_on: cfg.default_on });
            let app = api::routes::create_router(state);
            let addr = format!("{}:{}", cfg.host, cfg.http_port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            info!(event = "HTTP_LISTENING", addr = %addr, "Toggle API listening");
            axum::serve(listener, app).await?;
            Ok(())
        }
    }
}

/// Reads one event from stdin and prints the report to stdout.
async fn run_once(toggler: &ClusterToggler, cfg: &AppConfig) -> anyhow::Result<()> {
    let mut raw = String::new();
    tokio::io::stdin().read_to_string(&mut raw).await?;

    let event = ToggleEvent::from_json(&raw)?;
    let request = ToggleRequest::from_event(event, &cfg.default_on)?;
    let report = toggler.toggle(&request).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
