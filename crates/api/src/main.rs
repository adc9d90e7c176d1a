use std::sync::Arc;

use textgen_api::app::{self, services};
use textgen_api::config::AppConfig;
use textgen_engine::{EchoLoader, ModelLoader};
use textgen_infra::hub;
use textgen_infra::worker::{Worker, WorkerConfig};

#[tokio::main]
async fn main() {
    textgen_observability::init();

    let config = AppConfig::from_env();

    match &config.hub_token {
        Some(token) => match hub::login(token).await {
            Ok(account) => tracing::info!(account, "logged in to model hub"),
            Err(err) => tracing::error!(error = %err, "model hub login failed"),
        },
        None => tracing::warn!("HUB_TOKEN not set; skipping model hub login"),
    }

    let loader: Arc<dyn ModelLoader> = Arc::new(EchoLoader::new());

    let services = match services::build_services(&config, Arc::clone(&loader)) {
        Ok(services) => Arc::new(services),
        Err(err) => {
            tracing::error!(error = %err, "failed to build services");
            std::process::exit(1);
        }
    };

    // The worker is started explicitly here (never as a module side effect)
    // and owns its own lazy model cache, separate from the sync path.
    let records = services::build_record_store(&config);
    let worker = Worker::new(Arc::clone(&services.broker), loader, records);
    let _worker = worker.spawn(WorkerConfig::default());

    let app = app::build_app(Arc::clone(&services));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {e}", config.bind_addr));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
