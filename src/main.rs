// src/main.rs
// Entry point: parses CLI args, dispatches to the serve/inject/findings
// subcommands, and maps outcomes onto the exit-code contract in 6
// (0 success, 1 runtime error, 2 argument error, 130 interrupted).

use anyhow::{Context, Result};
use clap::Parser;
use ricochet::callback;
use ricochet::cli::{CliArgs, Command};
use ricochet::config::CONFIG;
use ricochet::injector::request::ParsedRequest;
use ricochet::injector::Injector;
use ricochet::limiter::RateLimiter;
use ricochet::model::Severity;
use ricochet::store::{FindingsQuery, Store};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_tracing();

    let exit_code = match run(args).await {
        Ok(()) => 0,
        Err(e) if e.downcast_ref::<Interrupted>().is_some() => 130,
        Err(e) => {
            error!(error = %e, "ricochet exited with an error");
            1
        }
    };

    std::process::exit(exit_code);
}

#[derive(Debug, thiserror::Error)]
#[error("interrupted")]
struct Interrupted;

fn init_tracing() {
    let filter = EnvFilter::try_new(&CONFIG.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Waits for SIGINT or (on unix) SIGTERM, whichever arrives first.
async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut terminate = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = terminate.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

async fn run(args: CliArgs) -> Result<()> {
    let database_url = args
        .database
        .clone()
        .unwrap_or_else(|| CONFIG.store.database_url.clone());
    let store = Store::open(&database_url, CONFIG.store.max_connections)
        .await
        .context("failed to open store")?;

    match args.command {
        Command::Serve(serve_args) => run_serve(store, serve_args).await,
        Command::Inject(inject_args) => run_inject(store, inject_args).await,
        Command::Findings(findings_args) => run_findings(store, findings_args).await,
    }
}

async fn run_serve(store: Store, serve_args: ricochet::cli::args::ServeArgs) -> Result<()> {
    let cancel = CancellationToken::new();
    let shutdown_cancel = cancel.clone();
    let interrupted = cancel.clone();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        info!("shutdown signal received");
        shutdown_cancel.cancel();
    });

    if serve_args.http_only {
        let addr = CONFIG.http_server.bind_address()?;
        callback::http_server::serve(addr, store, async move { cancel.cancelled().await }).await?;
    } else if serve_args.dns_only {
        let addr = CONFIG.dns_server.bind_address()?;
        callback::dns_server::serve(addr, store, cancel).await?;
    } else {
        callback::run(&CONFIG.http_server, &CONFIG.dns_server, store, cancel).await?;
    }

    if interrupted.is_cancelled() {
        return Err(Interrupted.into());
    }
    Ok(())
}

async fn run_inject(store: Store, inject_args: ricochet::cli::args::InjectArgs) -> Result<()> {
    let limiter = RateLimiter::new(CONFIG.rate_limit.rate, CONFIG.rate_limit.burst)?;
    let injector = Injector::new(store, limiter, CONFIG.injector.clone())?;

    let request = ParsedRequest {
        method: "GET".to_string(),
        url: inject_args.url,
        headers: Vec::new(),
        body: None,
        host: String::new(),
    };

    let results = injector
        .inject_all_vectors(&request, &inject_args.payload, inject_args.context, inject_args.dry_run)
        .await?;

    for result in &results {
        println!(
            "{}\t{}\t{}\tstatus={}\tsuccess={}",
            result.correlation_id, result.vector.qualified_name(), result.url, result.status, result.success
        );
    }
    Ok(())
}

async fn run_findings(store: Store, findings_args: ricochet::cli::args::FindingsArgs) -> Result<()> {
    let min_severity = findings_args.min_severity.as_deref().map(Severity::parse_or_info);
    let findings = store
        .get_findings(FindingsQuery {
            since: findings_args.since,
            min_severity,
        })
        .await?;

    for finding in &findings {
        println!(
            "{}\t{}\t{}\tseverity={}\tdelay={:.2}s",
            finding.correlation_id,
            finding.target_url,
            finding.request_path,
            finding.severity(),
            finding.delay_seconds(),
        );
    }
    Ok(())
}
