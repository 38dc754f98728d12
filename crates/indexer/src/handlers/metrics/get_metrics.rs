use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use prometheus::proto::{Metric, MetricFamily};
use serde_json::{Value, json};

use crate::metrics::{GatherError, gather_metric_families, gather_metrics};

fn gather_failed(err: GatherError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": format!("Failed to gather metrics: {}", err) })),
    )
        .into_response()
}

/// Prometheus text exposition
pub async fn get_metrics() -> Response {
    match gather_metrics() {
        Ok(metrics) => (
            StatusCode::OK,
            [("Content-Type", "text/plain; version=0.0.4")],
            metrics,
        )
            .into_response(),
        Err(err) => gather_failed(err),
    }
}

/// The same families as JSON, one entry per labelled series
pub async fn get_metrics_json() -> Response {
    match gather_metric_families() {
        Ok(families) => {
            let body: Vec<Value> = families.iter().map(family_json).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => gather_failed(err),
    }
}

fn family_json(family: &MetricFamily) -> Value {
    json!({
        "name": family.get_name(),
        "help": family.get_help(),
        "type": format!("{:?}", family.get_field_type()),
        "metrics": family.get_metric().iter().map(metric_json).collect::<Vec<_>>(),
    })
}

fn metric_json(metric: &Metric) -> Value {
    let labels: Vec<Value> = metric
        .get_label()
        .iter()
        .map(|label| json!({ "name": label.get_name(), "value": label.get_value() }))
        .collect();

    let value = if metric.has_counter() {
        json!(metric.get_counter().get_value())
    } else if metric.has_gauge() {
        json!(metric.get_gauge().get_value())
    } else if metric.has_histogram() {
        let histogram = metric.get_histogram();
        json!({
            "sample_count": histogram.get_sample_count(),
            "sample_sum": histogram.get_sample_sum(),
        })
    } else {
        Value::Null
    };

    json!({ "labels": labels, "value": value })
}
