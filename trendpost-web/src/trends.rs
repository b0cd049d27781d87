use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use scraper::{Html, Selector};
use trendpost_common::{Result, TrendList, TrendpostError};
use trendpost_http::{HttpClient, RequestOpts};

/// How many trends a run folds into the prompt unless configured otherwise.
pub const DEFAULT_TREND_LIMIT: usize = 4;

#[async_trait]
pub trait TrendSource: Send + Sync {
    /// Fetch at most `limit` trending terms, most prominent first.
    async fn fetch_top_trends(&self, limit: usize) -> Result<TrendList>;
}

/// Scrapes trending terms from a single HTML page.
///
/// One GET per call, with a browser-like `User-Agent` so the page is served
/// the same markup a visitor sees.
pub struct TrendsPage {
    http: HttpClient,
    selector: String,
    user_agent: HeaderValue,
}

impl TrendsPage {
    pub fn new(url: &str, selector: &str, user_agent: &str) -> Result<Self> {
        let http = HttpClient::new(url)
            .map_err(|e| TrendpostError::Config(format!("trends.url: {e}")))?;
        parse_selector(selector)?;
        let user_agent = HeaderValue::from_str(user_agent)
            .map_err(|e| TrendpostError::Config(format!("trends.user_agent: {e}")))?;
        Ok(Self {
            http,
            selector: selector.to_string(),
            user_agent,
        })
    }
}

#[async_trait]
impl TrendSource for TrendsPage {
    async fn fetch_top_trends(&self, limit: usize) -> Result<TrendList> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, self.user_agent.clone());

        tracing::debug!(url = %self.http.base(), limit, "fetching trends page");
        let html = self
            .http
            .get_text(
                "",
                RequestOpts {
                    headers: Some(headers),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| TrendpostError::Fetch(e.to_string()))?;

        let selector = parse_selector(&self.selector)?;
        let trends = extract_trends(&html, &selector, limit);
        if trends.is_empty() {
            return Err(TrendpostError::EmptyResult);
        }

        tracing::info!("Trends found: {:?}", trends.as_slice());
        Ok(trends)
    }
}

fn parse_selector(raw: &str) -> Result<Selector> {
    Selector::parse(raw)
        .map_err(|e| TrendpostError::Config(format!("trends.selector '{raw}': {e:?}")))
}

/// Take the first `limit` matches in document order.
///
/// Each entry is trimmed and loses its leading `#` markers, so `"#Music "`
/// becomes `"Music"`.
pub fn extract_trends(html: &str, selector: &Selector, limit: usize) -> TrendList {
    let document = Html::parse_document(html);
    document
        .select(selector)
        .take(limit)
        .map(|el| clean_trend(&el.text().collect::<String>()))
        .collect::<Vec<_>>()
        .into()
}

fn clean_trend(raw: &str) -> String {
    raw.trim().trim_start_matches('#').trim().to_string()
}
