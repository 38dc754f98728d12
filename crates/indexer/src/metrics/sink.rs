use prometheus::{CounterVec, GaugeVec};

use crate::abex::sink::{
    CUMULATIVE_FEE, CUMULATIVE_TRADING_VOLUME_USD, FEE, LIQUIDATION_USD, MetricsSink,
    TOTAL_AMOUNT, TRADING_VOLUME_USD, TVL,
};

use super::registry::{self, LIQUIDATION_LABELS, TRADE_LABELS, VAULT_LABELS};

/// [`MetricsSink`] backed by the process Prometheus registry
#[derive(Debug, Default, Clone, Copy)]
pub struct PrometheusSink;

impl PrometheusSink {
    fn gauge_for(name: &str) -> Option<(&'static GaugeVec, &'static [&'static str])> {
        match name {
            TRADING_VOLUME_USD => Some((&*registry::TRADING_VOLUME_USD, &TRADE_LABELS[..])),
            FEE => Some((&*registry::FEE, &TRADE_LABELS[..])),
            TOTAL_AMOUNT => Some((&*registry::VAULT_TOTAL_AMOUNT, &VAULT_LABELS[..])),
            TVL => Some((&*registry::VAULT_TVL, &VAULT_LABELS[..])),
            _ => None,
        }
    }

    fn accumulator_for(name: &str) -> Option<(Accumulator, &'static [&'static str])> {
        match name {
            CUMULATIVE_TRADING_VOLUME_USD => Some((
                Accumulator::Total(&*registry::CUMULATIVE_TRADING_VOLUME_USD),
                &TRADE_LABELS[..],
            )),
            CUMULATIVE_FEE => Some((
                Accumulator::Total(&*registry::CUMULATIVE_FEE),
                &TRADE_LABELS[..],
            )),
            LIQUIDATION_USD => Some((
                Accumulator::Monotonic(&*registry::LIQUIDATION_USD),
                &LIQUIDATION_LABELS[..],
            )),
            _ => None,
        }
    }
}

/// Backing instrument of a sink counter
enum Accumulator {
    /// Signed running total
    Total(&'static GaugeVec),
    Monotonic(&'static CounterVec),
}

impl MetricsSink for PrometheusSink {
    fn gauge(&self, name: &str, value: f64, tags: &[(&'static str, String)]) {
        let Some((gauge, labels)) = Self::gauge_for(name) else {
            tracing::warn!(metric = name, "Unknown gauge, dropping sample");
            return;
        };
        let values = label_values(labels, tags);
        gauge.with_label_values(&as_strs(&values)).set(value);
    }

    fn counter(&self, name: &str, value: f64, tags: &[(&'static str, String)]) {
        let Some((accumulator, labels)) = Self::accumulator_for(name) else {
            tracing::warn!(metric = name, "Unknown counter, dropping sample");
            return;
        };
        if !value.is_finite() {
            tracing::warn!(metric = name, value, "Skipping non-finite increment");
            return;
        }
        let values = label_values(labels, tags);
        match accumulator {
            Accumulator::Total(total) => total.with_label_values(&as_strs(&values)).add(value),
            // Prometheus counters panic on negative increments.
            Accumulator::Monotonic(_) if value < 0.0 => {
                tracing::warn!(metric = name, value, "Skipping negative counter increment");
            }
            Accumulator::Monotonic(counter) => {
                counter.with_label_values(&as_strs(&values)).inc_by(value)
            }
        }
    }
}

/// Tag values in the vector's label order, empty where a tag is absent.
fn label_values(labels: &[&str], tags: &[(&'static str, String)]) -> Vec<String> {
    labels
        .iter()
        .map(|label| {
            tags.iter()
                .find(|(key, _)| key == label)
                .map(|(_, value)| value.clone())
                .unwrap_or_default()
        })
        .collect()
}

fn as_strs(values: &[String]) -> Vec<&str> {
    values.iter().map(String::as_str).collect()
}
