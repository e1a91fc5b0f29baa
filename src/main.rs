//! tempo — latency-aware priority scheduler.
//!
//! Watches the task registry maintained by external instrumentation and nudges
//! OS scheduling so latency-sensitive tasks make their deadlines.
//!
//! # Usage
//!
//! ```bash
//! # Monitor with tempo.toml from the working directory (or defaults)
//! tempo
//!
//! # Custom config and registry location
//! tempo --config /etc/tempo.toml --registry /run/tempo/tasks.json
//!
//! # Single pass, report printed as JSON
//! tempo --once
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use tempo::config::{ContentionPolicy, SchedulerConfig};
use tempo::control::platform_control;
use tempo::kernel::time::SystemClock;
use tempo::registry;
use tempo::Reactor;

/// Protects latency-sensitive tasks by adjusting priorities and throttling contenders.
#[derive(Parser, Debug)]
#[command(name = "tempo", version, about)]
struct Cli {
    /// Path to the TOML configuration file (default: ./tempo.toml when present).
    #[arg(long, env = "TEMPO_CONFIG")]
    config: Option<PathBuf>,

    /// Registry document to monitor; overrides the config file.
    #[arg(long, env = "TEMPO_REGISTRY")]
    registry: Option<PathBuf>,

    /// Seconds to sleep between evaluation passes.
    #[arg(long)]
    interval_secs: Option<u64>,

    /// Seconds each lower-priority contender is throttled for.
    #[arg(long)]
    throttle_secs: Option<u64>,

    /// How contenders are held back during an overtime escalation.
    #[arg(long, value_enum)]
    contention: Option<ContentionPolicy>,

    /// Run a single pass, print its report as JSON and exit.
    #[arg(long)]
    once: bool,
}

impl Cli {
    fn resolve_config(&self) -> anyhow::Result<SchedulerConfig> {
        let mut config = SchedulerConfig::discover(self.config.as_deref())?;
        if let Some(path) = &self.registry {
            config.registry = path.clone();
        }
        if let Some(secs) = self.interval_secs {
            config.interval_secs = secs;
        }
        if let Some(secs) = self.throttle_secs {
            config.throttle_secs = secs;
        }
        if let Some(policy) = self.contention {
            config.contention = policy;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.resolve_config().context("failed to load configuration")?;

    tracing::info!("Starting task monitoring and prioritization...");

    let registry = registry::open(&config.registry)
        .with_context(|| format!("failed to open task registry {}", config.registry.display()))?;

    let mut reactor = Reactor::new(
        registry,
        platform_control(),
        Box::new(SystemClock::new(config.clock)),
        &config,
    );

    if cli.once {
        let report = reactor.cycle_step().await;
        reactor.release_suspended();
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown requested, finishing current cycle");
        trigger.cancel();
    });

    reactor.run(shutdown).await;
    Ok(())
}

// ── Signal handling ──────────────────────────────────────────────────

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("Failed to register SIGTERM handler: {}", e);
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = ctrl_c.await {
            tracing::warn!("Failed to listen for ctrl_c: {}", e);
        }
    }
}
