use anyhow::Context;
use bankrpc_core::SemanticsMode;
use bankrpc_net::controller::Event;
use bankrpc_net::server::Server;
use std::net::SocketAddr;
use std::str::FromStr;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use tracing_subscriber::{filter::Directive, EnvFilter, FmtSubscriber};

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli::cli().get_matches();

    let log_level = matches
        .get_one::<String>("log-level")
        .expect("log-level has a default value");
    let log_filter = EnvFilter::builder()
        .with_default_directive(
            Directive::from_str(log_level).context("invalid --log-level value")?,
        )
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder().with_env_filter(log_filter).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default tracing subscriber failed")?;

    let bind_addr = matches
        .get_one::<String>("bind-addr")
        .expect("bind-addr has a default value");
    let port = matches
        .get_one::<String>("port")
        .expect("port has a default value");
    let addr: SocketAddr = format!("{bind_addr}:{port}")
        .parse()
        .with_context(|| format!("invalid bind address: {bind_addr}:{port}"))?;

    let mode = parse_mode(
        matches
            .get_one::<String>("mode")
            .expect("mode has a default value"),
    );
    let loss_threshold = parse_loss_threshold(
        matches
            .get_one::<String>("loss-threshold")
            .expect("loss-threshold has a default value"),
    )?;

    let (server, mut events, _commands) = match Server::bind(addr, mode, loss_threshold).await {
        Ok(bound) => bound,
        Err(err) => {
            error!(%err, "failed to start bankrpc server");
            return Err(err.into());
        }
    };

    info!(%addr, ?mode, loss_threshold, "bankrpc server starting");

    // Drain observer events to the log; a future UI would take this receiver
    // instead and render its own console/table views.
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            log_event(event);
        }
    });

    let shutdown = CancellationToken::new();
    let server_shutdown = shutdown.clone();
    let server_task = tokio::spawn(server.run(server_shutdown));

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("received ctrl-c, shutting down");
        }
    }
    shutdown.cancel();
    let _ = server_task.await;

    Ok(())
}

/// Renders a core→observer notification as a structured log line:
/// account lifecycle events log at `info` or above and always include
/// the account id; per-datagram traffic logs at `debug`.
fn log_event(event: Event) {
    match event {
        Event::AccountCreated(account) => info!(account_id = account.id, "account created"),
        Event::AccountDeleted(account) => info!(account_id = account.id, "account deleted"),
        Event::Deposit(account) => info!(account_id = account.id, "deposit applied"),
        Event::Withdraw(account) => info!(account_id = account.id, "withdraw applied"),
        Event::Exchange(account) => info!(account_id = account.id, "exchange applied"),
        Event::Transfer { receiver, sender } => info!(
            sender_id = sender.id,
            receiver_id = receiver.id,
            "transfer applied"
        ),
        Event::CallbackCreated(sub) => info!(addr = %sub.addr, "subscription created"),
        Event::CallbackDeleted(sub) => info!(addr = %sub.addr, "subscription expired"),
        Event::Console(text) => info!(%text, "console"),
        Event::RequestReceived { ip, request } => {
            debug!(%ip, request_id = request.id, op = request.op.as_str(), "request received")
        }
        Event::ResponsePosted { ip, response } => {
            debug!(%ip, request_id = response.id, "response posted")
        }
    }
}

fn parse_mode(value: &str) -> SemanticsMode {
    match value {
        "at-least-once" => SemanticsMode::AtLeastOnce,
        "at-most-once" => SemanticsMode::AtMostOnce,
        "maybe" => SemanticsMode::Maybe,
        other => unreachable!("clap value_parser restricts --mode to a known set, got {other}"),
    }
}

fn parse_loss_threshold(value: &str) -> anyhow::Result<u8> {
    let threshold: u32 = value
        .parse()
        .with_context(|| format!("--loss-threshold must be an integer, got {value}"))?;
    if threshold > 100 {
        anyhow::bail!("--loss-threshold must be in 0..=100, got {threshold}");
    }
    Ok(threshold as u8)
}
