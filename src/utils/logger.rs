use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn cli_directive(verbose: bool) -> &'static str {
    if verbose {
        "image_redactor=debug,info"
    } else {
        "image_redactor=info"
    }
}

fn batch_directive(log_level: Option<&str>) -> String {
    let level = log_level
        .map(str::trim)
        .filter(|level| !level.is_empty())
        .unwrap_or("info");
    format!("image_redactor={}", level.to_lowercase())
}

/// `RUST_LOG` wins over the built-in directive.
fn env_or(directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive))
}

pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_or(cli_directive(verbose)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// Structured output for unattended batch runs.
pub fn init_batch_logger(log_level: Option<&str>) {
    tracing_subscriber::registry()
        .with(env_or(&batch_directive(log_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .json(),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_directive_defaults_to_info() {
        assert_eq!(batch_directive(None), "image_redactor=info");
        assert_eq!(batch_directive(Some("  ")), "image_redactor=info");
    }

    #[test]
    fn test_batch_directive_uses_configured_level() {
        assert_eq!(batch_directive(Some("DEBUG")), "image_redactor=debug");
        assert_eq!(batch_directive(Some("warn")), "image_redactor=warn");
    }

    #[test]
    fn test_cli_directive_follows_verbosity() {
        assert_eq!(cli_directive(false), "image_redactor=info");
        assert_eq!(cli_directive(true), "image_redactor=debug,info");
        assert!(EnvFilter::try_new(cli_directive(true)).is_ok());
        assert!(EnvFilter::try_new(batch_directive(Some("trace"))).is_ok());
    }
}
