//! Output ports for decoded records.

use super::types::NormalizedEvent;

pub const TRADING_VOLUME_USD: &str = "Trading_Volume_USD";
pub const CUMULATIVE_TRADING_VOLUME_USD: &str = "Cumulative_Trading_Volume_USD";
pub const FEE: &str = "Fee";
pub const CUMULATIVE_FEE: &str = "Cumulative_Fee";
pub const LIQUIDATION_USD: &str = "Liquidation_USD";
pub const TOTAL_AMOUNT: &str = "total_amount";
pub const TVL: &str = "tvl";

pub const USER_INTERACTION: &str = "User_Interaction";

/// Metric tags, in emission order
pub type Tags = Vec<(&'static str, String)>;

pub trait MetricsSink: Send + Sync {
    fn gauge(&self, name: &str, value: f64, tags: &[(&'static str, String)]);
    fn counter(&self, name: &str, value: f64, tags: &[(&'static str, String)]);
}

/// Per-actor structured event log
pub trait EventLogSink: Send + Sync {
    fn emit(&self, distinct_id: &str, event: &NormalizedEvent);
}

/// Writes `User_Interaction` records to the `user_interaction` tracing target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventLog;

impl EventLogSink for TracingEventLog {
    fn emit(&self, distinct_id: &str, event: &NormalizedEvent) {
        match serde_json::to_string(event) {
            Ok(record) => tracing::info!(
                target: "user_interaction",
                distinct_id = %distinct_id,
                event_name = %event.event_name,
                record = %record,
                "{}",
                USER_INTERACTION
            ),
            Err(err) => tracing::warn!(
                target: "user_interaction",
                distinct_id = %distinct_id,
                error = %err,
                "Failed to serialize interaction record"
            ),
        }
    }
}
