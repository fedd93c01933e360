mod assistant;
mod config;
mod errors;
mod export;
mod llm_client;
mod models;
mod routes;
mod state;
mod store;
mod templates;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::assistant::heuristic::HeuristicAssistant;
use crate::assistant::llm::LlmAssistant;
use crate::assistant::ResumeAssistant;
use crate::config::{Config, StateBackend};
use crate::export::normalize::NormalizeOptions;
use crate::export::paginate::PageGeometry;
use crate::export::raster::BlockRasterizer;
use crate::export::{ExportOptions, PdfExporter};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::persistence::{FileSnapshotStore, MemorySnapshotStore, SnapshotStore};
use crate::store::DocumentStore;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Vellum API v{}", env!("CARGO_PKG_VERSION"));

    // Document store, rehydrated from the persisted snapshot
    let persistence: Arc<dyn SnapshotStore> = match config.state_backend {
        StateBackend::File => {
            let file = FileSnapshotStore::new(config.state_path.clone());
            info!(path = %file.path().display(), "Using file-backed snapshot store");
            Arc::new(file)
        }
        StateBackend::Memory => {
            info!("Using in-memory snapshot store; edits are lost on restart");
            Arc::new(MemorySnapshotStore::new())
        }
    };
    let store = Arc::new(DocumentStore::open(persistence));

    let assistant = build_assistant(&config)?;
    info!(assistant = assistant.name(), "Assistant initialized");

    // Exporter: A4 at the configured density, oversampled by `export_scale`
    let exporter = Arc::new(PdfExporter::new(
        Arc::new(BlockRasterizer),
        ExportOptions {
            scale: config.export_scale,
            geometry: PageGeometry::a4(config.export_dpi),
            normalize: NormalizeOptions {
                root_font_px: config.root_font_px,
                ..NormalizeOptions::default()
            },
        },
    ));
    info!(
        dpi = config.export_dpi,
        scale = exporter.options().scale,
        "PDF exporter initialized"
    );

    let state = AppState {
        store,
        assistant,
        exporter,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the editor has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Model-backed when an API key is configured, heuristic otherwise.
fn build_assistant(config: &Config) -> Result<Arc<dyn ResumeAssistant>> {
    match &config.anthropic_api_key {
        Some(key) => {
            let mut client = LlmClient::new(key.clone())?;
            if let Some(url) = &config.anthropic_api_url {
                info!(endpoint = %url, "Using custom Messages endpoint");
                client = client.with_endpoint(url.as_str());
            }
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Ok(Arc::new(LlmAssistant::new(client)))
        }
        None => Ok(Arc::new(HeuristicAssistant)),
    }
}
