mod analysis;
mod config;
mod errors;
mod feedback;
mod models;
mod routes;
mod state;
mod store;
mod translation;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::analysis::lexicon::Lexicon;
use crate::analysis::normalizer::TextNormalizer;
use crate::analysis::pipeline::SentimentPipeline;
use crate::analysis::vader::VaderScorer;
use crate::config::Config;
use crate::feedback::service::{FeedbackService, SystemClock};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::DatasetStore;
use crate::translation::{DisabledTranslator, GoogleTranslateClient, Translator};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
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

    info!("Starting Transit Feedback API v{}", env!("CARGO_PKG_VERSION"));

    // Sentiment lexicon
    let lexicon = match &config.vader_lexicon_path {
        Some(path) => Lexicon::from_vader_file(path)
            .with_context(|| format!("Failed to load lexicon {}", path.display()))?,
        None => Lexicon::embedded(),
    };
    info!("Lexicon loaded ({} entries)", lexicon.len());

    // Translation client
    let translator: Arc<dyn Translator> = if config.translation_enabled {
        Arc::new(GoogleTranslateClient::new(
            config.translate_base_url.clone(),
            config.translate_timeout,
        )?)
    } else {
        warn!("Translation disabled; Spanish comments are scored untranslated");
        Arc::new(DisabledTranslator)
    };

    let pipeline = SentimentPipeline::new(
        TextNormalizer::new(translator, config.translate_timeout),
        Arc::new(VaderScorer::new(lexicon)),
    );

    let store = DatasetStore::new(&config.dataset_path);
    info!("Dataset: {}", store.path().display());

    let feedback = Arc::new(FeedbackService::new(store, pipeline, Arc::new(SystemClock)));

    if config.seed_on_startup {
        let seeded = feedback.initialize_if_empty().await?;
        if seeded > 0 {
            info!("Seeded {seeded} example comments");
        }
    }

    // Build app state
    let state = AppState {
        config: config.clone(),
        feedback,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
