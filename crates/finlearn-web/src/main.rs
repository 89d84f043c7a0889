use std::process::ExitCode;
use std::sync::Arc;

use finlearn_core::{Feature, Secrets};
use finlearn_web::{bind_addr, router, AppState};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let secrets = match Secrets::load(None) {
        Ok(secrets) => secrets,
        Err(e) => {
            error!(error = %e, "failed to load secrets");
            return ExitCode::from(2);
        }
    };

    for feature in [Feature::News, Feature::MarketDataFallback] {
        if let Err(e) = secrets.require(feature) {
            warn!(error = %e, "feature disabled");
        }
    }

    let app = router(Arc::new(AppState::from_secrets(&secrets)));
    let addr = bind_addr();

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %addr, error = %e, "failed to bind API server");
            return ExitCode::FAILURE;
        }
    };

    info!(addr = %addr, "API server listening");
    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "API server failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
