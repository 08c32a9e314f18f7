use fluency_core::error::ErrorReport;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub const DEFAULT_LOG_FILTER: &str = "fluency_cli=info,fluency_core=info";

/// Logs go to stderr so the conversation on stdout stays readable.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

pub fn exit_error(code: &str, message: &str, docs_hint: Option<&str>) -> ! {
    exit_report(&ErrorReport {
        error: code.to_string(),
        message: message.to_string(),
        docs_hint: docs_hint.map(str::to_string),
    })
}

pub fn exit_report(report: &ErrorReport) -> ! {
    match serde_json::to_string_pretty(report) {
        Ok(rendered) => eprintln!("{rendered}"),
        Err(_) => eprintln!("{}: {}", report.error, report.message),
    }
    std::process::exit(1);
}
