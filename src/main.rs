use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use ci_dispatch::config::ServerConfig;
use ci_dispatch::github::GitHubStatusReporter;
use ci_dispatch::policy::PolicyConfig;
use ci_dispatch::server::{AppState, build_router};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ci_dispatch=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env().context("failed to read configuration")?;

    let policy = PolicyConfig::load(&config.policy_path).with_context(|| {
        format!(
            "failed to load branch policy from {}",
            config.policy_path.display()
        )
    })?;
    tracing::info!(
        path = %config.policy_path.display(),
        branches = policy.len(),
        "loaded branch policy"
    );

    let reporter = GitHubStatusReporter::from_token(
        config.github_token.clone(),
        config.github_api_url.as_deref(),
    )
    .context("failed to build GitHub client")?
    .with_status_context(config.status_context.clone());

    let executor = config.script_executor();
    tracing::info!(
        program = %config.build_program.display(),
        work_path = %config.work_path.display(),
        timeout_secs = config.build_timeout.map(|t| t.as_secs()),
        "build executor configured"
    );

    let app = build_router(AppState::new(Arc::new(policy), reporter, executor));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
