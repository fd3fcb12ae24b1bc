use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use departure_board::config::AppConfig;
use departure_board::display::{ConsoleMatrix, DisplayLoop, DriverProcess};
use departure_board::service::DepartureService;
use departure_board::source;
use departure_board::web::{AppState, create_router};

#[derive(Debug, Parser)]
#[command(version, about = "Upcoming departures as JSON or on an LED matrix")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve departures over HTTP
    Serve,
    /// Scroll departures on the matrix
    Display {
        #[arg(long, value_enum, default_value_t = Surface::Console)]
        surface: Surface,
    },
    /// Print the current selection and exit
    Once {
        /// Print structured details as JSON instead of summary lines
        #[arg(long)]
        details: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Surface {
    /// Simulate the matrix in the terminal
    Console,
    /// Drive the hardware through the driver subprocess
    Driver,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "fatal");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    tracing::info!(
        source = config.source.kind(),
        destination = config.criteria.destination(),
        line = ?config.criteria.line(),
        max_results = config.criteria.max_results().get(),
        "loaded configuration"
    );

    let source = source::connect(&config.source)?;
    let service = Arc::new(DepartureService::new(
        source,
        config.criteria.clone(),
        config.service.clone(),
    ));

    match cli.command {
        Command::Serve => {
            let app = create_router(AppState::new(service));
            let listener = tokio::net::TcpListener::bind(config.server.bind_addr).await?;
            tracing::info!(addr = %config.server.bind_addr, "listening");
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
        Command::Display { surface } => {
            let display = &config.display;
            match surface {
                Surface::Console => {
                    let sink = ConsoleMatrix::stdout(display.geometry);
                    DisplayLoop::new(service, sink, display.refresh_interval)
                        .run(shutdown_signal())
                        .await?;
                }
                Surface::Driver => {
                    let sink = DriverProcess::spawn(&display.driver_command, display.geometry)?;
                    let sink = DisplayLoop::new(service, sink, display.refresh_interval)
                        .run(shutdown_signal())
                        .await?;
                    sink.shutdown().await?;
                }
            }
        }
        Command::Once { details } => {
            if details {
                let details = service.details().await?;
                println!("{}", serde_json::to_string_pretty(&details)?);
            } else {
                for line in service.summaries().await? {
                    println!("{line}");
                }
            }
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown requested"),
        Err(e) => {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    }
}
