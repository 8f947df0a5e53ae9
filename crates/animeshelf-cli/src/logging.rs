use anyhow::Result;
use std::io;
use std::io::IsTerminal;
use std::path::Path;
use tracing_subscriber::{
    layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry,
};
use tracing_subscriber::fmt::{self, time::ChronoUtc};
use tracing_appender::rolling::{RollingFileAppender, Rotation};

/// Pick the filter directive: `--quiet` beats `-v`, which beats `RUST_LOG`,
/// which beats the configured level
fn filter_for(verbose_level: u8, quiet: bool, configured_level: &str) -> EnvFilter {
    if quiet {
        return EnvFilter::new("error");
    }

    match verbose_level {
        0 => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(configured_level)),
        // -v: debug, but keep the HTTP stack quiet
        1 => EnvFilter::new("debug,hyper=warn,reqwest=info"),
        _ => EnvFilter::new("trace"),
    }
}

pub fn init_logging(
    verbose_level: u8,
    quiet: bool,
    configured_level: &str,
    log_file: Option<&Path>,
) -> Result<()> {
    let filter = filter_for(verbose_level, quiet, configured_level);

    let json = std::env::var("RUST_LOG_JSON")
        .map(|v| v == "true")
        .unwrap_or_else(|_| !io::stdout().is_terminal());

    let registry = Registry::default().with(filter);

    let Some(log_path) = log_file else {
        if json {
            let json_layer = fmt::layer()
                .json()
                .with_timer(ChronoUtc::rfc_3339())
                .with_writer(io::stderr);
            registry.with(json_layer).init();
        } else {
            let fmt_layer = fmt::layer()
                .with_timer(ChronoUtc::rfc_3339())
                .with_writer(io::stderr);
            registry.with(fmt_layer).init();
        }
        return Ok(());
    };

    let log_dir = log_path.parent()
        .ok_or_else(|| anyhow::anyhow!("Log file path has no parent directory"))?;
    std::fs::create_dir_all(log_dir)?;

    let log_filename = log_path.file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid log filename"))?;

    // animeshelf.log rotates into animeshelf.2026-01-17 and so on
    let log_prefix = log_filename
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(log_filename);

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, log_prefix);

    if json {
        let json_layer = fmt::layer()
            .json()
            .with_timer(ChronoUtc::rfc_3339())
            .with_writer(file_appender);
        registry.with(json_layer).init();
    } else {
        let fmt_layer = fmt::layer()
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(false)
            .with_writer(file_appender);
        registry.with(fmt_layer).init();
    }

    Ok(())
}
