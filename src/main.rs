use std::io::{Error, ErrorKind};
use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use clap::Parser;
use tokio::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, filter::LevelFilter};

use job_board::api::{board::handlers::board_config, board::BoardService, health::health_config, validation};
use job_board::board::{Board, Clock, FixedClock, SnapshotStore, SystemClock};
use job_board::cli::{self, Cli, Command, ShowArgs};
use job_board::config;
use job_board::shutdown::ShutdownCoordinator;
use job_board::source::{FileJobSource, JobSource};
use job_board::worker::RefreshWorker;

/// Console output plus one daily rolling file per level under `log_dir`.
fn init_logging(log_dir: &str) -> std::io::Result<()> {
    std::fs::create_dir_all(log_dir)?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());

    let info_file = tracing_appender::rolling::daily(log_dir, "info.log");
    let warn_file = tracing_appender::rolling::daily(log_dir, "warn.log");
    let error_file = tracing_appender::rolling::daily(log_dir, "error.log");
    let debug_file = tracing_appender::rolling::daily(log_dir, "debug.log");

    let info_layer = tracing_subscriber::fmt::layer()
        .with_writer(info_file)
        .with_ansi(false)
        .with_filter(LevelFilter::INFO);

    let warn_layer = tracing_subscriber::fmt::layer()
        .with_writer(warn_file)
        .with_ansi(false)
        .with_filter(LevelFilter::WARN);

    let error_layer = tracing_subscriber::fmt::layer()
        .with_writer(error_file)
        .with_ansi(false)
        .with_filter(LevelFilter::ERROR);

    let debug_layer = tracing_subscriber::fmt::layer()
        .with_writer(debug_file)
        .with_ansi(false)
        .with_filter(LevelFilter::DEBUG);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(info_layer)
        .with(warn_layer)
        .with(error_layer)
        .with(debug_layer)
        .init();

    Ok(())
}

async fn serve() -> std::io::Result<()> {
    let config = config::Config::from_env()
        .map_err(|e| Error::new(ErrorKind::InvalidInput, e))?;

    init_logging(&config.log_dir)?;

    info!("Starting job-board application");
    info!("Configuration loaded successfully:");
    info!("  - Snapshot path: {}", config.snapshot_path.display());
    info!("  - Max payload size: {} bytes", config.max_payload_size);
    info!("  - Refresh interval: {}s", config.refresh_interval_secs);
    info!(
        "  - SLA thresholds: warning < {}, critical < {} of target",
        config.urgency.warning_fraction, config.urgency.critical_fraction
    );
    info!("  - Slot-in SLA default: {} minutes", config.slot_in_sla_minutes);

    let store = Arc::new(SnapshotStore::new());
    let source: Arc<dyn JobSource> = Arc::new(FileJobSource::new(&config.snapshot_path));
    let board = Board::new(config.urgency, config.slot_in_sla_minutes);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // watch channel allows the worker to observe the shutdown flag
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let worker = RefreshWorker::new(store.clone(), source.clone());
    let refresh_every = Duration::from_secs(config.refresh_interval_secs.max(1));
    let worker_handle = tokio::spawn(async move {
        worker.run(refresh_every, shutdown_rx).await;
    });
    info!("Spawned refresh worker");

    let board_service = web::Data::new(BoardService::new(store, source, board, clock));
    let max_payload_size = config.max_payload_size;

    let server = HttpServer::new(move || {
        let payload_config = web::PayloadConfig::default()
            .limit(max_payload_size);

        App::new()
            .app_data(board_service.clone())
            .app_data(payload_config) // Global payload size limit
            .app_data(validation::json_config().limit(max_payload_size))
            .app_data(validation::query_config())
            .configure(health_config)
            .configure(board_config)
    });

    info!("Server starting on http://{}:{}", config.bind_address, config.port);

    let server = server
        .bind((config.bind_address.as_str(), config.port))?
        .run();

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    let coordinator = ShutdownCoordinator::new(
        server_handle,
        server_task,
        worker_handle,
        shutdown_tx,
    );

    coordinator.wait_for_shutdown().await
}

async fn show(args: ShowArgs) -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let jobs = FileJobSource::new(&args.snapshot)
        .fetch()
        .await
        .map_err(|e| {
            error!("{}", e);
            Error::new(ErrorKind::InvalidData, e)
        })?;

    let clock: Box<dyn Clock> = match args.fixed_now() {
        Some(now) => Box::new(FixedClock::at_utc(now)),
        None => Box::new(SystemClock),
    };

    let output = cli::render_show(&jobs, &args, &Board::default(), clock.as_ref())
        .map_err(|e| Error::new(ErrorKind::InvalidData, e))?;
    println!("{}", output);
    Ok(())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None | Some(Command::Serve) => serve().await,
        Some(Command::Show(args)) => show(args).await,
    }
}
