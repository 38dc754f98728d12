use lazy_static::lazy_static;
use prometheus::proto::MetricFamily;
use prometheus::{
    Counter, CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry,
    TextEncoder,
};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Labels shared by the volume and fee instruments.
///
/// Pool events only set `from_token`/`to_token`, position events only the
/// collateral/index/direction triple; the rest stay empty.
pub static TRADE_LABELS: [&str; 7] = [
    "event_name",
    "type",
    "collateral_token",
    "index_token",
    "direction",
    "from_token",
    "to_token",
];
pub static LIQUIDATION_LABELS: [&str; 3] = ["collateral_token", "index_token", "direction"];
pub static VAULT_LABELS: [&str; 1] = ["name"];

lazy_static! {
    pub static ref REGISTRY: Mutex<Option<Registry>> = Mutex::new(None);

    // Domain metrics
    pub static ref TRADING_VOLUME_USD: GaugeVec = GaugeVec::new(
        Opts::new("trading_volume_usd", "USD volume of the last event"),
        &TRADE_LABELS
    )
    .expect("Failed to create trading_volume_usd gauge");

    // Running totals take negative increments (rebates, losing liquidations),
    // which a Prometheus counter rejects, so they are gauges.
    pub static ref CUMULATIVE_TRADING_VOLUME_USD: GaugeVec = GaugeVec::new(
        Opts::new("cumulative_trading_volume_usd", "Total USD trading volume"),
        &TRADE_LABELS
    )
    .expect("Failed to create cumulative_trading_volume_usd gauge");

    pub static ref FEE: GaugeVec = GaugeVec::new(
        Opts::new("fee", "USD fee of the last event"),
        &TRADE_LABELS
    )
    .expect("Failed to create fee gauge");

    pub static ref CUMULATIVE_FEE: GaugeVec = GaugeVec::new(
        Opts::new("cumulative_fee", "Total USD fees"),
        &TRADE_LABELS
    )
    .expect("Failed to create cumulative_fee gauge");

    pub static ref LIQUIDATION_USD: CounterVec = CounterVec::new(
        Opts::new("liquidation_usd", "USD size of liquidated positions"),
        &LIQUIDATION_LABELS
    )
    .expect("Failed to create liquidation_usd counter");

    pub static ref VAULT_TOTAL_AMOUNT: GaugeVec = GaugeVec::new(
        Opts::new("total_amount", "Vault liquidity plus reserved plus unrealised fees, in tokens"),
        &VAULT_LABELS
    )
    .expect("Failed to create total_amount gauge");

    pub static ref VAULT_TVL: GaugeVec = GaugeVec::new(
        Opts::new("tvl", "Vault total value locked in USD"),
        &VAULT_LABELS
    )
    .expect("Failed to create tvl gauge");

    // HTTP metrics
    pub static ref HTTP_REQUESTS: Counter = Counter::new(
        "http_requests",
        "Total number of HTTP requests"
    )
    .expect("Failed to create http_requests counter");

    pub static ref HTTP_REQUEST_SUCCESS: Counter = Counter::new(
        "http_request_success",
        "Number of successful HTTP requests"
    )
    .expect("Failed to create http_request_success counter");

    pub static ref HTTP_REQUEST_ERROR: Counter = Counter::new(
        "http_request_error",
        "Number of HTTP request errors"
    )
    .expect("Failed to create http_request_error counter");

    pub static ref REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "request_duration_seconds",
            "Duration of HTTP requests in seconds"
        ).buckets(vec![0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0]),
        &["method", "route", "status_code"]
    )
    .expect("Failed to create request_duration_seconds histogram");
}

#[derive(Debug, Error)]
pub enum GatherError {
    #[error("Metrics not initialized")]
    NotInitialized,

    #[error("Failed to encode metrics: {0}")]
    Encode(#[from] prometheus::Error),

    #[error("Metrics output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Register every instrument with a registry using `prefix`.
///
/// Only the first call has an effect.
pub fn init(prefix: &str) -> Result<(), prometheus::Error> {
    let mut slot = REGISTRY.lock().unwrap_or_else(PoisonError::into_inner);
    if slot.is_some() {
        return Ok(());
    }

    let registry = Registry::new_custom(Some(prefix.to_string()), None)?;

    registry.register(Box::new(TRADING_VOLUME_USD.clone()))?;
    registry.register(Box::new(CUMULATIVE_TRADING_VOLUME_USD.clone()))?;
    registry.register(Box::new(FEE.clone()))?;
    registry.register(Box::new(CUMULATIVE_FEE.clone()))?;
    registry.register(Box::new(LIQUIDATION_USD.clone()))?;
    registry.register(Box::new(VAULT_TOTAL_AMOUNT.clone()))?;
    registry.register(Box::new(VAULT_TVL.clone()))?;

    registry.register(Box::new(HTTP_REQUESTS.clone()))?;
    registry.register(Box::new(HTTP_REQUEST_SUCCESS.clone()))?;
    registry.register(Box::new(HTTP_REQUEST_ERROR.clone()))?;
    registry.register(Box::new(REQUEST_DURATION_SECONDS.clone()))?;

    *slot = Some(registry);
    Ok(())
}

pub fn gather_metric_families() -> Result<Vec<MetricFamily>, GatherError> {
    let slot = REGISTRY.lock().unwrap_or_else(PoisonError::into_inner);
    let registry = slot.as_ref().ok_or(GatherError::NotInitialized)?;
    Ok(registry.gather())
}

/// Gather all metrics as Prometheus text format
pub fn gather_metrics() -> Result<String, GatherError> {
    let metric_families = gather_metric_families()?;
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
