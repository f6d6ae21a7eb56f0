use once_cell::sync::OnceCell;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

static INIT: OnceCell<()> = OnceCell::new();

fn enabled() -> bool {
    for key in ["EXLAB_OBSERVABILITY_ENABLED", "EXLAB_OBSERVABILITY"] {
        if let Ok(value) = std::env::var(key) {
            return !matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "0" | "false" | "no" | "off" | "disabled"
            );
        }
    }
    true
}

fn env_filter() -> tracing_subscriber::EnvFilter {
    std::env::var("EXLAB_LOG_LEVEL")
        .ok()
        .and_then(|level| tracing_subscriber::EnvFilter::try_new(level).ok())
        .or_else(|| tracing_subscriber::EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| tracing_subscriber::EnvFilter::new("info"))
}

/// Initialize tracing once per process.
///
/// `EXLAB_LOG_LEVEL` (or `RUST_LOG`) sets the filter; `EXLAB_JSON_LOG_PATH`
/// switches from console output to JSONL in the given file;
/// `EXLAB_OBSERVABILITY[_ENABLED]` turns logging off entirely.
pub fn init_observability() {
    INIT.get_or_init(|| {
        if !enabled() {
            return;
        }
        match std::env::var("EXLAB_JSON_LOG_PATH").map(std::path::PathBuf::from) {
            Ok(path) => {
                let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
                if let Some(dir) = dir {
                    let _ = std::fs::create_dir_all(dir);
                }
                let file_name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("exlab.logs.jsonl");
                let writer = tracing_appender::rolling::never(
                    dir.unwrap_or_else(|| std::path::Path::new(".")),
                    file_name,
                );
                let _ = tracing_subscriber::registry()
                    .with(env_filter())
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_target(false)
                            .with_writer(writer),
                    )
                    .try_init();
            }
            Err(_) => {
                let _ = tracing_subscriber::registry()
                    .with(env_filter())
                    .with(
                        tracing_subscriber::fmt::layer()
                            .compact()
                            .with_target(false)
                            .with_writer(std::io::stdout),
                    )
                    .try_init();
            }
        }
    });
}
