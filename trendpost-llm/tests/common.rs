use std::sync::OnceLock;

use trendpost_common::observability::{LogConfig, LogFormat};

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();
static LOG_DIR: OnceLock<tempfile::TempDir> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let dir = LOG_DIR.get_or_init(|| tempfile::tempdir().expect("log tempdir"));
        let config = LogConfig {
            app_name: "trendpost-tests",
            log_dir: Some(dir.path().to_path_buf()),
            emit_stderr: true,
            format: if std::env::var("TRENDPOST_LOG_FORMAT")
                .map(|raw| raw.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false)
            {
                LogFormat::Json
            } else {
                LogFormat::Text
            },
            default_filter: "debug".to_string(),
        };

        trendpost_common::observability::init_logging(config).unwrap_or_default()
    });
}
