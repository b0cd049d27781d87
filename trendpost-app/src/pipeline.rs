//! Sequential orchestration of a single posting run.
//!
//! Every stage returns a `Result`. The first failure is logged once with its
//! stage name, recorded in the [`RunReport`], and ends the run. Nothing is
//! retried.
use crate::links::{FileLinkPicker, LinkPicker};
use std::process::ExitCode;
use std::sync::Arc;
use trendpost_common::{
    GeneratedPost, PostResult, Result, SelectedLink, TrendList, TrendpostError,
};
use trendpost_config::TrendpostConfig;
use trendpost_llm::gemini::GeminiClient;
use trendpost_llm::post::{DEFAULT_POST_LANGUAGE, audit_post, generate_post};
use trendpost_llm::traits::LlmClient;
use trendpost_social::{Publisher, TwitterApi, XCredentials};
use trendpost_web::{DEFAULT_TREND_LIMIT, TrendSource, TrendsPage};

/// What a run produced, stage by stage.
#[derive(Debug, Default)]
pub struct RunReport {
    pub trends: Option<TrendList>,
    pub link: Option<SelectedLink>,
    pub post: Option<GeneratedPost>,
    pub published: Option<PostResult>,
    pub failure: Option<TrendpostError>,
    pub dry_run: bool,
}

impl RunReport {
    fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    pub fn succeeded(&self) -> bool {
        self.failure.is_none() && (self.dry_run || self.published.is_some())
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.succeeded() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }

    fn fail(mut self, err: TrendpostError) -> Self {
        let stage = err.stage().map(|s| s.as_str()).unwrap_or("setup");
        if err.is_warning() {
            tracing::warn!(stage, "{err}");
        } else {
            tracing::error!(stage, "{err}");
        }
        self.failure = Some(err);
        self
    }
}

pub struct Pipeline {
    trends: Arc<dyn TrendSource>,
    links: Arc<dyn LinkPicker>,
    llm: Arc<dyn LlmClient>,
    publisher: Arc<dyn Publisher>,
    trend_limit: usize,
    language: String,
    dry_run: bool,
}

impl Pipeline {
    pub fn new(
        trends: Arc<dyn TrendSource>,
        links: Arc<dyn LinkPicker>,
        llm: Arc<dyn LlmClient>,
        publisher: Arc<dyn Publisher>,
    ) -> Self {
        Self {
            trends,
            links,
            llm,
            publisher,
            trend_limit: DEFAULT_TREND_LIMIT,
            language: DEFAULT_POST_LANGUAGE.to_string(),
            dry_run: false,
        }
    }

    pub fn with_trend_limit(mut self, limit: usize) -> Self {
        self.trend_limit = limit;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Generate but never publish.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Build the production pipeline. Credentials are checked before any
    /// client is constructed, so a bad environment never reaches the network.
    pub fn from_config(cfg: &TrendpostConfig, dry_run: bool) -> Result<Self> {
        cfg.validate()?;

        let trends = TrendsPage::new(
            &cfg.trends.url,
            &cfg.trends.selector,
            &cfg.trends.user_agent,
        )?;
        let llm = GeminiClient::with_base_url(
            &cfg.generation.base_url,
            cfg.generation.api_key.expose().to_string(),
            cfg.generation.model.clone(),
        )?;
        let publisher = TwitterApi::with_base_url(
            &cfg.publish.base_url,
            XCredentials {
                bearer_token: cfg.publish.bearer_token.expose().to_string(),
                api_key: cfg.publish.api_key.expose().to_string(),
                api_secret: cfg.publish.api_secret.expose().to_string(),
                access_token: cfg.publish.access_token.expose().to_string(),
                access_token_secret: cfg.publish.access_token_secret.expose().to_string(),
            },
        )?;

        Ok(Self::new(
            Arc::new(trends),
            Arc::new(FileLinkPicker::new(&cfg.links.path)),
            Arc::new(llm),
            Arc::new(publisher),
        )
        .with_trend_limit(cfg.trends.limit)
        .with_language(cfg.generation.language.clone())
        .with_dry_run(dry_run))
    }

    pub async fn run(&self) -> RunReport {
        let mut report = RunReport::new(self.dry_run);

        let trends = match self.trends.fetch_top_trends(self.trend_limit).await {
            Ok(trends) => trends,
            Err(e) => return report.fail(e),
        };
        report.trends = Some(trends.clone());

        let link = match self.links.pick_random_link() {
            Ok(link) => link,
            Err(e) => return report.fail(e),
        };
        report.link = Some(link.clone());

        let post = match generate_post(self.llm.as_ref(), &trends, &link, &self.language).await {
            Ok(post) => post,
            Err(e) => return report.fail(e),
        };
        for finding in audit_post(&post, &link) {
            tracing::warn!(stage = "generate", "{finding}");
        }
        report.post = Some(post.clone());

        if self.dry_run {
            tracing::info!("dry run, not publishing: {}", post.as_str());
            return report;
        }

        match self.publisher.publish(&post).await {
            Ok(result) => report.published = Some(result),
            Err(e) => return report.fail(e),
        }
        report
    }
}
