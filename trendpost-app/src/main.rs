use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use trendpost_app::Pipeline;
use trendpost_common::observability::{LogConfig, LogFormat, init_logging};
use trendpost_config::{TrendpostConfig, TrendpostConfigLoader};

/// Post about what is trending on X, with one of our links attached.
#[derive(Debug, Parser)]
#[command(name = "trendpost", version, about)]
struct Cli {
    /// YAML config file; skipped when absent.
    #[arg(long, default_value = "trendpost.yaml")]
    config: PathBuf,

    /// Links file, overrides `links.path`.
    #[arg(long)]
    links: Option<PathBuf>,

    /// Number of trends to fold into the prompt, overrides `trends.limit`.
    #[arg(long)]
    limit: Option<usize>,

    /// Generate the post and log it without publishing.
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    fn apply_overrides(&self, cfg: &mut TrendpostConfig) {
        if let Some(links) = &self.links {
            cfg.links.path = links.display().to_string();
        }
        if let Some(limit) = self.limit {
            cfg.trends.limit = limit;
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // 1) Load config (env wins)
    let mut cfg = TrendpostConfigLoader::new()
        .with_optional_file(&cli.config)
        .load()
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;
    cli.apply_overrides(&mut cfg);

    // 2) Logging as configured
    let format = cfg.logging.format.parse::<LogFormat>();
    let log_file = init_logging(LogConfig {
        log_dir: cfg.logging.dir.as_ref().map(PathBuf::from),
        emit_stderr: true,
        format: format.clone().unwrap_or(LogFormat::Text),
        default_filter: cfg.logging.filter.clone(),
        ..Default::default()
    })?;
    if let Err(e) = format {
        tracing::warn!("{e}, falling back to text logs");
    }
    tracing::debug!(log_file = %log_file.display(), "logging initialised");

    tracing::info!(dry_run = cli.dry_run, "starting auto-post run");
    let pipeline = match Pipeline::from_config(&cfg, cli.dry_run) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            tracing::error!("{e}");
            return Err(e.into());
        }
    };

    let report = pipeline.run().await;
    tracing::info!(
        succeeded = report.succeeded(),
        dry_run = report.dry_run,
        "run finished"
    );
    Ok(report.exit_code())
}
