use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flightbook_core::FlightStore;
use flightbook_engine::Session;
use flightbook_store::{Config, MemoryFlightStore, PgFlightStore, StoreBackend};

mod command;

use command::Command;

async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn FlightStore>> {
    match config.store.backend {
        StoreBackend::Postgres => {
            let store = PgFlightStore::connect(&config.database)
                .await
                .context("Failed to connect to PostgreSQL")?;
            if config.database.run_migrations {
                store.migrate().await.context("Failed to run migrations")?;
            }
            tracing::info!(
                "Connected to PostgreSQL ({:?} transactions)",
                config.database.isolation_level
            );
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            let store = match &config.store.seed_path {
                Some(path) => {
                    let json = tokio::fs::read_to_string(path)
                        .await
                        .with_context(|| format!("Failed to read seed file {}", path))?;
                    MemoryFlightStore::from_seed_json(&json)
                        .with_context(|| format!("Failed to parse seed file {}", path))?
                }
                None => MemoryFlightStore::new(),
            };
            tracing::info!("Using in-memory store with {} flights", store.flight_count().await);
            Ok(Arc::new(store))
        }
    }
}

/// Runs one command and renders its outcome, as a status line or as JSON.
async fn execute(
    session: &mut Session,
    command: Command,
    default_limit: usize,
    json: bool,
) -> anyhow::Result<String> {
    macro_rules! render {
        ($outcome:expr) => {{
            let outcome = $outcome;
            if json {
                serde_json::to_string(&outcome)?
            } else {
                outcome.to_string()
            }
        }};
    }

    let rendered = match command {
        Command::Create { username, password, balance } => {
            render!(session.create_customer(&username, &password, balance).await)
        }
        Command::Login { username, password } => render!(session.login(&username, &password).await),
        Command::Logout => render!(session.logout()),
        Command::Search { origin, destination, direct_only, day_of_month, limit } => render!(
            session
                .search(
                    &origin,
                    &destination,
                    direct_only,
                    day_of_month,
                    limit.unwrap_or(default_limit),
                )
                .await
        ),
        Command::Book { index } => render!(session.book(index).await),
        Command::Pay { rid } => render!(session.pay(rid).await),
        Command::Reservations => render!(session.reservations().await),
        Command::Cancel { rid } => render!(session.cancel(rid).await),
        Command::Quit => String::from("Goodbye"),
    };
    Ok(rendered)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flightbook=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let json = std::env::args().skip(1).any(|arg| arg == "--json");
    let config = Config::load().context("Failed to load config")?;
    let store = open_store(&config).await?;
    let mut session = Session::new(store);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let output = match command::parse(&line) {
            Ok(Command::Quit) => {
                stdout.write_all(b"Goodbye\n").await?;
                break;
            }
            Ok(command) => execute(&mut session, command, config.search.default_limit, json).await?,
            Err(e) => e.to_string(),
        };

        stdout.write_all(output.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
    }

    if let Some(username) = session.current_user() {
        tracing::info!(username, "Session closed");
    }
    Ok(())
}
