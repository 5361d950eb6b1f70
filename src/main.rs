use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use live_publisher::{
    create_router, AppState, Config, LoopbackFactory, SessionController, SessionNotification,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::info;

#[derive(Parser)]
#[command(name = "live-publisher")]
#[command(about = "Control a live publishing session")]
struct Args {
    /// Config file (extension optional)
    #[arg(short, long, default_value = "config/live-publisher")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP control API
    Serve,

    /// Publish to a target for a while, printing state changes and elapsed time
    Demo {
        /// Stream destination (defaults to the configured target)
        #[arg(short, long)]
        target: Option<String>,

        /// How long to stay live, in seconds
        #[arg(short, long, default_value = "5")]
        seconds: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("Live Publisher v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded config: {}", cfg.service.name);

    let factory = Arc::new(LoopbackFactory::new(cfg.connect_delay()));
    let session = SessionController::new(factory, cfg.controller_settings());

    match args.command {
        Command::Serve => serve(&cfg, session).await,
        Command::Demo { target, seconds } => {
            let target = target.unwrap_or_else(|| cfg.publisher.target.clone());
            demo(session, &target, Duration::from_secs(seconds)).await
        }
    }
}

async fn serve(cfg: &Config, session: SessionController) -> Result<()> {
    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let default_target = Some(cfg.publisher.target.clone());
    let app = create_router(AppState::new(session, default_target));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down");
        })
        .await
        .context("HTTP server failed")
}

async fn demo(session: SessionController, target: &str, live_for: Duration) -> Result<()> {
    let mut notifications = session.subscribe();

    session.initialize(target)?;
    session.toggle_publish()?;

    let printer = tokio::spawn(async move {
        while let Some(notification) = notifications.next().await {
            match notification {
                SessionNotification::StateChanged(change) => {
                    println!("[{}] {}", change.state, change.message);
                    if let Some(failure) = change.failure {
                        println!("  {}", failure);
                    }
                }
                SessionNotification::Elapsed(elapsed) => println!("LIVE {}", elapsed),
            }
        }
    });

    sleep(live_for).await;

    if session.is_tracking() {
        session.toggle_publish()?;
    }

    // Let the final transition reach the printer
    sleep(Duration::from_millis(100)).await;
    info!("Final state: {}", session.current_state());
    drop(session);
    printer.abort();

    Ok(())
}
