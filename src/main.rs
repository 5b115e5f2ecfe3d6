use std::sync::Arc;

use tower_http::trace::TraceLayer;

use review_bot::channels::{CliChannel, LineMessenger, Messenger, WebhookState, webhook_routes};
use review_bot::config::BotConfig;
use review_bot::error::{ConfigError, Result};
use review_bot::llm::create_provider;
use review_bot::review::{ReviewManager, SessionStore, spawn_eviction_task};

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider before any TLS usage
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        eprintln!("Warning: a rustls crypto provider was already installed");
    }

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = match BotConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let ConfigError::MissingEnvVar(var) = &e {
                eprintln!("  export {}=...", var);
            }
            std::process::exit(1);
        }
    };

    eprintln!("📝 Review Bot v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.llm.model);
    eprintln!(
        "   Manuscript: {}..{} chars, chunks of {}",
        config.limits.min_chars, config.limits.max_chars, config.limits.chunk_chars
    );

    // Create LLM provider
    let llm = create_provider(&config.llm)?;

    // ── Sessions ─────────────────────────────────────────────────────────
    let sessions = SessionStore::new(config.session_idle_timeout);
    let _eviction_handle = spawn_eviction_task(Arc::clone(&sessions), config.eviction_interval);
    eprintln!(
        "   Sessions: evicted after {} min idle",
        config.session_idle_timeout.as_secs() / 60
    );

    // ── Terminal mode ────────────────────────────────────────────────────
    if config.cli {
        eprintln!("   Channel: cli");
        eprintln!("   Type a message and press Enter. /sticker sends a sticker, /quit exits.\n");
        let cli = Arc::new(CliChannel::new());
        let messenger: Arc<dyn Messenger> = cli.clone();
        let manager = Arc::new(ReviewManager::new(llm, messenger, sessions, config.limits));
        cli.run(manager).await?;
        return Ok(());
    }

    // ── LINE webhook ─────────────────────────────────────────────────────
    let line = config
        .line
        .ok_or_else(|| ConfigError::MissingEnvVar("LINE_CHANNEL_ACCESS_TOKEN".to_string()))?;
    let messenger: Arc<dyn Messenger> = Arc::new(LineMessenger::new(line.channel_access_token));
    let manager = Arc::new(ReviewManager::new(llm, messenger, sessions, config.limits));

    let app = webhook_routes(WebhookState::new(manager, line.channel_secret))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    eprintln!("   Webhook: http://0.0.0.0:{}/webhook\n", config.port);
    tracing::info!(port = config.port, "Webhook server started");
    axum::serve(listener, app).await?;

    Ok(())
}
