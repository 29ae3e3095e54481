//! Tracing subscriber bootstrap.

use anyhow::Context;
use tracing_subscriber::{
    fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter,
};

use folio_kernel::settings::{LogFormat, TelemetrySettings};

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let env_filter = build_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok(), settings)?;

    let fmt_layer = match settings.log_format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    tracing::debug!(target: "folio-telemetry", format = ?settings.log_format, "telemetry initialized");
    Ok(())
}

fn build_filter(
    rust_log: Option<String>,
    settings: &TelemetrySettings,
) -> anyhow::Result<EnvFilter> {
    match rust_log {
        Some(directives) if !directives.is_empty() => {
            EnvFilter::try_new(directives).context("invalid RUST_LOG directives")
        }
        _ => EnvFilter::try_new(&settings.level)
            .with_context(|| format!("invalid log level '{}'", settings.level)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_level(level: &str) -> TelemetrySettings {
        TelemetrySettings {
            level: level.to_string(),
            ..TelemetrySettings::default()
        }
    }

    #[test]
    fn configured_level_builds_filter() {
        let filter = build_filter(None, &with_level("folio_app=debug,info")).unwrap();
        assert!(filter.to_string().contains("folio_app=debug"));
    }

    #[test]
    fn empty_rust_log_falls_back_to_configured_level() {
        let filter = build_filter(Some(String::new()), &with_level("warn")).unwrap();
        assert_eq!(filter.to_string(), "warn");
    }

    #[test]
    fn rust_log_wins_over_configured_level() {
        let filter = build_filter(Some("folio_cache=trace".to_string()), &with_level("warn"))
            .unwrap();
        let rendered = filter.to_string();

        assert!(rendered.contains("folio_cache=trace"));
        assert!(!rendered.contains("warn"));
    }

    #[test]
    fn garbage_level_is_rejected() {
        let err = build_filter(None, &with_level("folio_app=loudest")).unwrap_err();
        assert!(err.to_string().contains("folio_app=loudest"));
    }

    #[test]
    fn garbage_rust_log_is_rejected() {
        let err = build_filter(Some("folio_app=loudest".to_string()), &with_level("info"))
            .unwrap_err();
        assert!(err.to_string().contains("RUST_LOG"));
    }
}
