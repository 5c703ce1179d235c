use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use serde::Deserialize;
use time::Weekday;

use crate::data_source::{HistoryRequest, MarketDataProvider, SourceError};
use crate::http_client::{HttpAuth, HttpClient, HttpRequest, HttpResponse, ReqwestHttpClient};
use crate::{Fundamentals, PricePoint, PriceSeries, ProviderId, Symbol, UtcDateTime};

const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URLS: [&str; 2] = [
    "https://query1.finance.yahoo.com/v1/test/getcrumb",
    "https://query2.finance.yahoo.com/v1/test/getcrumb",
];
const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const SUMMARY_URL: &str = "https://query1.finance.yahoo.com/v10/finance/quoteSummary";
const SUMMARY_MODULES: &str = "summaryDetail,defaultKeyStatistics";
const REFERER: &str = "https://finance.yahoo.com/";
const AUTH_TTL: Duration = Duration::from_secs(3600);
const NOT_FOUND_CODE: &str = "Not Found";

/// Symbol that always has no history in offline mode.
pub const MOCK_EMPTY_SYMBOL: &str = "EMPTY";

// ============================================================================
// Yahoo Auth Manager - cookie/crumb handling
// ============================================================================

#[derive(Debug, Default)]
struct CachedCrumb {
    crumb: Option<String>,
    fetched_at: Option<Instant>,
}

/// Manages the Yahoo crumb token.
///
/// Yahoo's unofficial API requires a session cookie from `fc.yahoo.com`
/// (kept by the transport's cookie jar) and a crumb passed as a query
/// parameter. `YAHOO_COOKIE`, when set, is sent explicitly on every call.
#[derive(Debug)]
pub struct YahooAuthManager {
    cached: Mutex<CachedCrumb>,
    ttl: Duration,
    cookie_override: Option<String>,
}

impl Default for YahooAuthManager {
    fn default() -> Self {
        Self {
            cached: Mutex::new(CachedCrumb::default()),
            ttl: AUTH_TTL,
            cookie_override: std::env::var("YAHOO_COOKIE").ok().filter(|c| !c.is_empty()),
        }
    }
}

impl YahooAuthManager {
    pub fn without_env_override() -> Self {
        Self {
            cookie_override: None,
            ..Self::default()
        }
    }

    pub fn auth(&self) -> HttpAuth {
        self.cookie_override
            .clone()
            .map_or(HttpAuth::None, HttpAuth::Cookie)
    }

    fn cached_crumb(&self) -> Option<String> {
        let cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        match (&cached.crumb, cached.fetched_at) {
            (Some(crumb), Some(at)) if at.elapsed() < self.ttl => Some(crumb.clone()),
            _ => None,
        }
    }

    /// Cached crumb, refreshed from Yahoo when missing or expired.
    pub async fn crumb(
        &self,
        http_client: &dyn HttpClient,
        timeout_ms: u64,
    ) -> Result<String, SourceError> {
        if let Some(crumb) = self.cached_crumb() {
            return Ok(crumb);
        }

        let crumb = self.fetch_crumb(http_client, timeout_ms).await?;
        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        cached.crumb = Some(crumb.clone());
        cached.fetched_at = Some(Instant::now());
        Ok(crumb)
    }

    pub fn invalidate(&self) {
        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        *cached = CachedCrumb::default();
    }

    async fn fetch_crumb(
        &self,
        http_client: &dyn HttpClient,
        timeout_ms: u64,
    ) -> Result<String, SourceError> {
        let auth = self.auth();

        // fc.yahoo.com answers 404 but still sets the session cookie.
        let cookie_request = HttpRequest::get(COOKIE_URL)
            .with_header("referer", REFERER)
            .with_auth(&auth)
            .with_timeout_ms(timeout_ms);
        http_client.execute(cookie_request).await.map_err(|e| {
            SourceError::unavailable(format!("failed to fetch Yahoo cookie: {}", e.message()))
        })?;

        for endpoint in CRUMB_URLS {
            let crumb_request = HttpRequest::get(endpoint)
                .with_header("referer", REFERER)
                .with_auth(&auth)
                .with_timeout_ms(timeout_ms);

            let response = match http_client.execute(crumb_request).await {
                Ok(response) => response,
                Err(error) => {
                    tracing::debug!(endpoint, error = %error, "crumb endpoint failed");
                    continue;
                }
            };

            if response.status == 429 {
                return Err(SourceError::rate_limited(
                    "Yahoo rate limited while fetching crumb",
                ));
            }
            if !response.is_success() {
                continue;
            }

            let body = response.body.trim();
            if body.to_ascii_lowercase().contains("too many requests") {
                return Err(SourceError::rate_limited(
                    "Yahoo rate limited while fetching crumb",
                ));
            }
            if is_plausible_crumb(body) {
                return Ok(body.to_owned());
            }
        }

        Err(SourceError::unavailable(
            "failed to fetch Yahoo crumb from all endpoints",
        ))
    }
}

fn is_plausible_crumb(body: &str) -> bool {
    !body.is_empty()
        && body.len() < 100
        && !body.contains(char::is_whitespace)
        && !body.contains('<')
}

// ============================================================================
// Yahoo Adapter
// ============================================================================

/// Yahoo Finance provider, either live over HTTP or with deterministic
/// offline data.
#[derive(Clone)]
pub struct YahooAdapter {
    /// `None` selects offline mode.
    http_client: Option<Arc<dyn HttpClient>>,
    auth_manager: Arc<YahooAuthManager>,
    timeout_ms: u64,
}

impl std::fmt::Debug for YahooAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooAdapter")
            .field("live", &self.http_client.is_some())
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl Default for YahooAdapter {
    fn default() -> Self {
        Self::mock()
    }
}

impl YahooAdapter {
    /// Offline adapter returning deterministic data derived from the symbol.
    pub fn mock() -> Self {
        Self {
            http_client: None,
            auth_manager: Arc::new(YahooAuthManager::without_env_override()),
            timeout_ms: 10_000,
        }
    }

    /// Live adapter over reqwest.
    pub fn live() -> Result<Self, SourceError> {
        let client = ReqwestHttpClient::new()
            .map_err(|e| SourceError::internal(e.message().to_owned()))?;
        Ok(Self::with_http_client(Arc::new(client)))
    }

    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        Self::with_http_client_and_auth(http_client, YahooAuthManager::default())
    }

    pub fn with_http_client_and_auth(
        http_client: Arc<dyn HttpClient>,
        auth_manager: YahooAuthManager,
    ) -> Self {
        Self {
            http_client: Some(http_client),
            auth_manager: Arc::new(auth_manager),
            timeout_ms: 10_000,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn is_live(&self) -> bool {
        self.http_client.is_some()
    }

    /// GET a crumb-authenticated endpoint, renewing the crumb once on 401/429.
    async fn get_with_crumb<F>(
        &self,
        http_client: &dyn HttpClient,
        build_url: F,
    ) -> Result<HttpResponse, SourceError>
    where
        F: Fn(&str) -> String + Send + Sync,
    {
        let crumb = self.auth_manager.crumb(http_client, self.timeout_ms).await?;
        let response = self.send(http_client, &build_url(&crumb)).await?;
        if response.status != 401 && response.status != 429 {
            return Ok(response);
        }

        tracing::warn!(status = response.status, "yahoo rejected crumb; refreshing auth");
        self.auth_manager.invalidate();
        let crumb = self.auth_manager.crumb(http_client, self.timeout_ms).await?;
        let retry = self.send(http_client, &build_url(&crumb)).await?;
        match retry.status {
            429 => Err(SourceError::rate_limited(
                "yahoo returned status 429 after auth refresh",
            )),
            401 => Err(SourceError::unavailable(
                "yahoo returned status 401 after auth refresh",
            )),
            _ => Ok(retry),
        }
    }

    async fn send(
        &self,
        http_client: &dyn HttpClient,
        url: &str,
    ) -> Result<HttpResponse, SourceError> {
        tracing::debug!(url = redact_crumb(url), "yahoo request");
        let request = HttpRequest::get(url)
            .with_header("referer", REFERER)
            .with_auth(&self.auth_manager.auth())
            .with_timeout_ms(self.timeout_ms);

        http_client.execute(request).await.map_err(|error| {
            if error.retryable() {
                SourceError::unavailable(format!("yahoo transport error: {}", error.message()))
            } else {
                SourceError::internal(format!("yahoo transport error: {}", error.message()))
            }
        })
    }

    async fn fetch_real_history(
        &self,
        http_client: &dyn HttpClient,
        req: &HistoryRequest,
    ) -> Result<PriceSeries, SourceError> {
        let symbol = urlencoding::encode(req.symbol.as_str()).into_owned();
        let range = req.range.as_str();
        let response = self
            .get_with_crumb(http_client, |crumb| {
                format!(
                    "{CHART_URL}/{symbol}?range={range}&interval=1d&events=div%2Csplit&crumb={}",
                    urlencoding::encode(crumb)
                )
            })
            .await?;

        if !response.is_success() && response.status != 404 {
            return Err(SourceError::unavailable(format!(
                "yahoo chart returned status {}",
                response.status
            )));
        }

        parse_chart_response(&req.symbol, &response.body)
    }

    async fn fetch_real_fundamentals(
        &self,
        http_client: &dyn HttpClient,
        symbol: &Symbol,
    ) -> Result<Fundamentals, SourceError> {
        let encoded = urlencoding::encode(symbol.as_str()).into_owned();
        let response = self
            .get_with_crumb(http_client, |crumb| {
                format!(
                    "{SUMMARY_URL}/{encoded}?modules={SUMMARY_MODULES}&crumb={}",
                    urlencoding::encode(crumb)
                )
            })
            .await?;

        if !response.is_success() && response.status != 404 {
            return Err(SourceError::unavailable(format!(
                "yahoo quoteSummary returned status {}",
                response.status
            )));
        }

        parse_summary_response(symbol, &response.body)
    }
}

impl MarketDataProvider for YahooAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PriceSeries, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            match &self.http_client {
                Some(client) => self.fetch_real_history(client.as_ref(), &req).await,
                None => Ok(mock_history(&req)),
            }
        })
    }

    fn fundamentals<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<Fundamentals, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            match &self.http_client {
                Some(client) => self.fetch_real_fundamentals(client.as_ref(), symbol).await,
                None => Ok(mock_fundamentals(symbol)),
            }
        })
    }
}

// ============================================================================
// Payload parsing
// ============================================================================

/// Parse a `v8/finance/chart` body into a daily close series.
///
/// Adjusted closes are preferred over raw closes; sessions with a missing
/// close are skipped. A "Not Found" API error is an empty series.
pub fn parse_chart_response(symbol: &Symbol, body: &str) -> Result<PriceSeries, SourceError> {
    let chart_response: YahooChartResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::internal(format!("failed to parse yahoo chart: {e}")))?;

    if let Some(error) = chart_response.chart.error {
        if error.code == NOT_FOUND_CODE {
            tracing::debug!(%symbol, "yahoo chart has no data for symbol");
            return Ok(PriceSeries::empty(symbol.clone()));
        }
        return Err(SourceError::unavailable(format!(
            "yahoo chart API error: {}",
            error.describe()
        )));
    }

    let Some(result) = chart_response.chart.result.into_iter().flatten().next() else {
        return Ok(PriceSeries::empty(symbol.clone()));
    };
    let Some(timestamps) = result.timestamp else {
        return Ok(PriceSeries::empty(symbol.clone()));
    };

    let adjusted = result
        .indicators
        .adjclose
        .into_iter()
        .flatten()
        .next()
        .map(|series| series.adjclose);
    let raw = result
        .indicators
        .quote
        .into_iter()
        .flatten()
        .next()
        .map(|series| series.close);
    let closes = adjusted
        .filter(|values| values.len() == timestamps.len())
        .or(raw)
        .ok_or_else(|| SourceError::internal("no close data in yahoo chart"))?;

    let mut points = Vec::with_capacity(timestamps.len());
    for (ts_value, close) in timestamps.iter().zip(closes) {
        let Some(close) = close else {
            continue;
        };
        let ts = UtcDateTime::from_unix_timestamp(*ts_value)?;
        match PricePoint::new(ts, close) {
            Ok(point) => points.push(point),
            Err(error) => tracing::debug!(%symbol, %error, "skipping unusable close"),
        }
    }

    Ok(PriceSeries::new(symbol.clone(), points))
}

/// Parse a `v10/finance/quoteSummary` body into fundamentals.
///
/// Missing figures stay `None`; a "Not Found" API error yields fully
/// unavailable fundamentals.
pub fn parse_summary_response(symbol: &Symbol, body: &str) -> Result<Fundamentals, SourceError> {
    let summary_response: YahooQuoteSummaryResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::internal(format!("failed to parse yahoo fundamentals: {e}")))?;

    if let Some(error) = summary_response.quote_summary.error {
        if error.code == NOT_FOUND_CODE {
            tracing::warn!(%symbol, "yahoo has no fundamentals for symbol");
            return Ok(Fundamentals::unavailable(symbol.clone()));
        }
        return Err(SourceError::unavailable(format!(
            "yahoo fundamentals API error: {}",
            error.describe()
        )));
    }

    let Some(result) = summary_response
        .quote_summary
        .result
        .into_iter()
        .flatten()
        .next()
    else {
        return Ok(Fundamentals::unavailable(symbol.clone()));
    };

    let detail = result.summary_detail.unwrap_or_default();
    let stats = result.default_key_statistics.unwrap_or_default();

    let pe_ratio = raw(&detail.trailing_pe).or_else(|| raw(&stats.trailing_pe));
    let dividend_yield = raw(&detail.dividend_yield)
        .or_else(|| raw(&detail.fund_yield))
        .or_else(|| raw(&stats.fund_yield));

    Ok(Fundamentals::new(symbol.clone(), pe_ratio, dividend_yield)?)
}

fn raw(value: &Option<YahooRawValue>) -> Option<f64> {
    value
        .as_ref()
        .and_then(|v| v.raw)
        .filter(|v| v.is_finite())
}

fn redact_crumb(url: &str) -> &str {
    url.split("&crumb=").next().unwrap_or(url)
}

#[derive(Debug, Deserialize)]
struct YahooApiError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

impl YahooApiError {
    fn describe(&self) -> String {
        match &self.description {
            Some(description) => format!("{}: {description}", self.code),
            None => self.code.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooApiError>,
}

#[derive(Debug, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    #[serde(default)]
    quote: Option<Vec<YahooQuoteIndicator>>,
    #[serde(default)]
    adjclose: Option<Vec<YahooAdjCloseIndicator>>,
}

#[derive(Debug, Deserialize)]
struct YahooQuoteIndicator {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct YahooAdjCloseIndicator {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct YahooQuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: YahooQuoteSummary,
}

#[derive(Debug, Deserialize)]
struct YahooQuoteSummary {
    #[serde(default)]
    result: Option<Vec<YahooQuoteSummaryResult>>,
    #[serde(default)]
    error: Option<YahooApiError>,
}

#[derive(Debug, Deserialize)]
struct YahooQuoteSummaryResult {
    #[serde(rename = "summaryDetail", default)]
    summary_detail: Option<YahooSummaryDetail>,
    #[serde(rename = "defaultKeyStatistics", default)]
    default_key_statistics: Option<YahooKeyStatistics>,
}

#[derive(Debug, Default, Deserialize)]
struct YahooSummaryDetail {
    #[serde(rename = "trailingPE", default)]
    trailing_pe: Option<YahooRawValue>,
    #[serde(rename = "dividendYield", default)]
    dividend_yield: Option<YahooRawValue>,
    /// Distribution yield reported for funds instead of `dividendYield`.
    #[serde(rename = "yield", default)]
    fund_yield: Option<YahooRawValue>,
}

#[derive(Debug, Default, Deserialize)]
struct YahooKeyStatistics {
    #[serde(rename = "trailingPE", default)]
    trailing_pe: Option<YahooRawValue>,
    #[serde(rename = "yield", default)]
    fund_yield: Option<YahooRawValue>,
}

/// Yahoo wraps numbers as `{"raw": 0.0125, "fmt": "1.25%"}`, or `{}` when absent.
#[derive(Debug, Deserialize)]
struct YahooRawValue {
    #[serde(default)]
    raw: Option<f64>,
}

// ============================================================================
// Offline data
// ============================================================================

fn mock_history(req: &HistoryRequest) -> PriceSeries {
    if req.symbol.as_str() == MOCK_EMPTY_SYMBOL {
        return PriceSeries::empty(req.symbol.clone());
    }

    let seed = symbol_seed(&req.symbol);
    let mut state = seed | 1;
    let drift = ((seed % 7) as f64 - 2.0) * 0.0004;
    let amplitude = 0.01 + (seed % 5) as f64 * 0.003;
    let mut close = 40.0 + (seed % 400) as f64;

    // Fixed anchor keeps offline output reproducible across runs.
    let mut date = time::macros::datetime!(2024-01-02 21:00 UTC);
    let mut points = Vec::with_capacity(req.range.trading_days());
    while points.len() < req.range.trading_days() {
        if !matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday) {
            if let Ok(point) = UtcDateTime::from_offset_datetime(date)
                .and_then(|ts| PricePoint::new(ts, round_cents(close)))
            {
                points.push(point);
            }
            state = next_random(state);
            let shock = (unit_interval(state) - 0.5) * 2.0 * amplitude;
            close *= 1.0 + drift + shock;
        }
        date += time::Duration::days(1);
    }

    PriceSeries::new(req.symbol.clone(), points)
}

fn mock_fundamentals(symbol: &Symbol) -> Fundamentals {
    let seed = symbol_seed(symbol);
    let pe_ratio = (seed % 4 != 0).then(|| 12.0 + (seed % 240) as f64 / 10.0);
    let dividend_yield = (seed % 5 != 0).then(|| (seed % 40) as f64 / 1_000.0);
    Fundamentals {
        symbol: symbol.clone(),
        pe_ratio,
        dividend_yield,
    }
}

fn symbol_seed(symbol: &Symbol) -> u64 {
    symbol.as_str().bytes().fold(5381_u64, |acc, byte| {
        acc.wrapping_mul(33).wrapping_add(u64::from(byte))
    })
}

fn next_random(state: u64) -> u64 {
    state
        .wrapping_mul(6_364_136_223_846_793_005)
        .wrapping_add(1_442_695_040_888_963_407)
}

fn unit_interval(state: u64) -> f64 {
    (state >> 11) as f64 / (1_u64 << 53) as f64
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
