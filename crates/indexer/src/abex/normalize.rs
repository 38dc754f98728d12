// Copyright (C) 2026 ABEX Indexer Developers
// SPDX-License-Identifier: GPL-3.0-or-later

//! Per-kind formulas turning an envelope into a [`NormalizedEvent`].

use config::Network;
use serde_json::Value;
use std::sync::Arc;

use super::classify::{
    Category, ClassifiedEvent, EventKind, PositionEventKind, classify, classify_position,
    direction_of,
};
use super::error::DecodeError;
use super::numeric::{decode_decimal, decode_integer, decode_signed};
use super::payload::{self, LiquidationSchema, PositionPayload, required};
use super::sink::{
    CUMULATIVE_FEE, CUMULATIVE_TRADING_VOLUME_USD, EventLogSink, FEE, LIQUIDATION_USD,
    MetricsSink, TRADING_VOLUME_USD, Tags,
};
use super::token::{TokenInfo, TokenResolver};
use super::types::{EventEnvelope, NormalizedEvent, Prices};

/// ALP, the pool share token
pub const ALP_DECIMALS: i32 = 6;

pub struct EventNormalizer {
    resolver: Arc<TokenResolver>,
    network: Network,
}

impl EventNormalizer {
    pub fn new(resolver: Arc<TokenResolver>, network: Network) -> Self {
        Self { resolver, network }
    }

    pub fn resolver(&self) -> &Arc<TokenResolver> {
        &self.resolver
    }

    /// Normalize one envelope and hand the result to the sinks.
    ///
    /// Nothing is emitted when decoding fails.
    pub async fn process(
        &self,
        envelope: &EventEnvelope,
        metrics: &dyn MetricsSink,
        event_log: &dyn EventLogSink,
    ) -> Result<NormalizedEvent, DecodeError> {
        let event = self.normalize(envelope).await?;

        record_metrics(&event, metrics);
        let actor = payload::actor(&envelope.payload, &envelope.sender);
        event_log.emit(actor, &event);

        Ok(event)
    }

    pub async fn normalize(&self, envelope: &EventEnvelope) -> Result<NormalizedEvent, DecodeError> {
        let classified = classify(&envelope.type_tag)?;
        let payload = &envelope.payload;

        let mut event = NormalizedEvent {
            kind: classified.kind,
            category: classified.kind.category(),
            ..Default::default()
        };

        match classified.kind {
            EventKind::Deposited | EventKind::Withdrawn | EventKind::Swapped => {
                event.event_name = classified.kind.name().to_string();
                self.pool(&classified, payload, &mut event).await?;
            }
            EventKind::OrderCreated | EventKind::OrderExecuted | EventKind::OrderCleared => {
                event.event_name = classified.kind.name().to_string();
                self.order(&classified, payload, &mut event).await?;
            }
            EventKind::PositionClaimed => {
                let position_kind = classify_position(&envelope.type_tag);
                event.event_name = position_kind.name().to_string();
                event.position_kind = Some(position_kind);
                self.position(&classified, position_kind, payload, &mut event)
                    .await?;
            }
            EventKind::ReferralAdded => {
                event.event_name = classified.kind.name().to_string();
            }
            EventKind::Unknown => {
                tracing::debug!(type_tag = %envelope.type_tag, "Unrecognized event type");
            }
        }

        Ok(event)
    }

    async fn resolve(&self, raw_type: &str) -> TokenInfo {
        self.resolver.resolve(raw_type, self.network).await
    }

    async fn pool(
        &self,
        classified: &ClassifiedEvent,
        payload: &Value,
        event: &mut NormalizedEvent,
    ) -> Result<(), DecodeError> {
        let source = param(classified, 0)?;
        event.fee_usd = decode_decimal(required(payload, "fee_value")?)?;

        match classified.kind {
            EventKind::Deposited => {
                event.from_token = self.resolve(source).await.symbol;
                let minted = decode_integer(required(payload, "mint_amount")?)?;
                let price = decode_decimal(required(payload, "price")?)?;
                event.volume_usd = minted / 10f64.powi(ALP_DECIMALS) * price;
            }
            EventKind::Withdrawn => {
                event.to_token = self.resolve(source).await.symbol;
                let burned = decode_integer(required(payload, "burn_amount")?)?;
                let price = decode_decimal(required(payload, "price")?)?;
                event.volume_usd = burned / 10f64.powi(ALP_DECIMALS) * price;
            }
            _ => {
                let dest = param(classified, 1)?;
                let (from, to) = tokio::join!(self.resolve(source), self.resolve(dest));
                let amount = decode_integer(required(payload, "dest_amount")?)?;
                let price = decode_decimal(required(payload, "dest_price")?)?;
                event.volume_usd = amount / to.scale() * price;
                event.from_token = from.symbol;
                event.to_token = to.symbol;
            }
        }

        Ok(())
    }

    async fn order(
        &self,
        classified: &ClassifiedEvent,
        payload: &Value,
        event: &mut NormalizedEvent,
    ) -> Result<(), DecodeError> {
        let (collateral, index) = self.market_tokens(classified, event).await?;
        event.collateral_token = collateral.symbol;
        event.index_token = index.symbol;

        if let Some(fee_token) = classified.generic_params.get(3) {
            event.fee_token = Some(self.resolve(fee_token).await.symbol);
        }

        event.order_id = payload::order_id(payload);
        event.position_id = payload::order_position_id(payload);

        if classified.kind == EventKind::OrderCreated {
            let inner = required(payload, "event")?;
            event.prices.limited_index_price =
                Some(decode_decimal(required(inner, "limited_index_price")?)?);
            event.prices.collateral_price_threshold =
                Some(decode_decimal(required(inner, "collateral_price_threshold")?)?);
        }

        Ok(())
    }

    async fn position(
        &self,
        classified: &ClassifiedEvent,
        position_kind: PositionEventKind,
        payload: &Value,
        event: &mut NormalizedEvent,
    ) -> Result<(), DecodeError> {
        let (collateral, index) = self.market_tokens(classified, event).await?;
        event.collateral_token = collateral.symbol.clone();
        event.index_token = index.symbol.clone();
        event.position_id = payload::position_id(payload);

        let Some(inner) = PositionPayload::locate(payload).event() else {
            return Ok(());
        };

        match position_kind {
            PositionEventKind::OpenPositionSuccess => {
                let opened = decode_integer(required(inner, "open_amount")?)?;
                let open_fee = decode_integer(required(inner, "open_fee_amount")?)?;
                let prices = position_prices(inner)?;

                event.volume_usd = opened / index.scale() * prices.index;
                event.fee_usd = open_fee / collateral.scale() * prices.collateral;
                event.prices = prices.into();
            }
            PositionEventKind::DecreasePositionSuccess => {
                let decreased = decode_integer(required(inner, "decrease_amount")?)?;
                let prices = position_prices(inner)?;

                event.volume_usd = decreased / index.scale() * prices.index;
                event.fee_usd = decode_decimal(required(inner, "decrease_fee_value")?)?
                    + settlement_fee(inner)?;
                event.pnl_usd = decode_signed(required(inner, "delta_realised_pnl")?)?;
                event.prices = prices.into();
            }
            PositionEventKind::LiquidatePosition => {
                let pnl = decode_signed(required(inner, "delta_realised_pnl")?)?;

                if let LiquidationSchema::Current { position_size } =
                    LiquidationSchema::detect(inner)
                {
                    let size = decode_decimal(position_size)?;
                    event.volume_usd = size + pnl;
                    event.liquidation_size_usd = Some(size);
                }

                event.fee_usd = settlement_fee(inner)?;
                event.pnl_usd = pnl;
                event.prices = position_prices(inner)?.into();
            }
            PositionEventKind::DecreaseReservedFromPosition
            | PositionEventKind::PledgeInPosition
            | PositionEventKind::RedeemFromPosition
            | PositionEventKind::OpenPositionFailed
            | PositionEventKind::DecreasePositionFailed
            | PositionEventKind::Unknown => {}
        }

        Ok(())
    }

    /// Collateral and index tokens plus direction, from parameters 0 to 2.
    async fn market_tokens(
        &self,
        classified: &ClassifiedEvent,
        event: &mut NormalizedEvent,
    ) -> Result<(TokenInfo, TokenInfo), DecodeError> {
        let collateral = param(classified, 0)?;
        let index = param(classified, 1)?;
        event.direction = direction_of(param(classified, 2)?).to_string();

        Ok(tokio::join!(self.resolve(collateral), self.resolve(index)))
    }
}

struct PositionPrices {
    collateral: f64,
    index: f64,
}

impl From<PositionPrices> for Prices {
    fn from(prices: PositionPrices) -> Self {
        Prices {
            collateral_price: Some(prices.collateral),
            index_price: Some(prices.index),
            ..Default::default()
        }
    }
}

fn position_prices(inner: &Value) -> Result<PositionPrices, DecodeError> {
    Ok(PositionPrices {
        collateral: decode_decimal(required(inner, "collateral_price")?)?,
        index: decode_decimal(required(inner, "index_price")?)?,
    })
}

/// Reserving fee plus signed funding fee
fn settlement_fee(inner: &Value) -> Result<f64, DecodeError> {
    Ok(decode_decimal(required(inner, "reserving_fee_value")?)?
        + decode_signed(required(inner, "funding_fee_value")?)?)
}

fn param<'a>(classified: &'a ClassifiedEvent, idx: usize) -> Result<&'a str, DecodeError> {
    classified
        .generic_params
        .get(idx)
        .map(String::as_str)
        .ok_or_else(|| DecodeError::MissingTypeParam {
            tag: classified.kind.name().to_string(),
            expected: idx + 1,
            found: classified.generic_params.len(),
        })
}

fn metric_tags(event: &NormalizedEvent) -> Option<Tags> {
    let mut tags: Tags = vec![("event_name", event.event_name.clone())];

    match event.kind {
        EventKind::Deposited => tags.push(("from_token", event.from_token.clone())),
        EventKind::Withdrawn => tags.push(("to_token", event.to_token.clone())),
        EventKind::Swapped => {
            tags.push(("from_token", event.from_token.clone()));
            tags.push(("to_token", event.to_token.clone()));
        }
        EventKind::PositionClaimed => {
            tags.push(("collateral_token", event.collateral_token.clone()));
            tags.push(("index_token", event.index_token.clone()));
            tags.push(("direction", event.direction.clone()));
        }
        _ => return None,
    }

    let category = event.category.as_ref().map(Category::as_str).unwrap_or_default();
    tags.push(("type", category.to_string()));
    Some(tags)
}

fn record_metrics(event: &NormalizedEvent, metrics: &dyn MetricsSink) {
    if let Some(size) = event.liquidation_size_usd {
        let tags: Tags = vec![
            ("collateral_token", event.collateral_token.clone()),
            ("index_token", event.index_token.clone()),
            ("direction", event.direction.clone()),
        ];
        metrics.counter(LIQUIDATION_USD, size, &tags);
    }

    let Some(tags) = metric_tags(event) else {
        return;
    };

    metrics.gauge(TRADING_VOLUME_USD, event.volume_usd, &tags);
    metrics.counter(CUMULATIVE_TRADING_VOLUME_USD, event.volume_usd, &tags);
    metrics.gauge(FEE, event.fee_usd, &tags);
    metrics.counter(CUMULATIVE_FEE, event.fee_usd, &tags);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{
        ETH, RecordingEventLog, RecordingMetrics, SUI, USDC, decimal, order_tag, pool_tag,
        position_tag, signed, static_normalizer,
    };
    use serde_json::json;

    fn approx(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
    }

    #[tokio::test]
    async fn test_deposited() {
        let envelope = EventEnvelope::new(
            pool_tag("Deposited", &[SUI]),
            json!({
                "mint_amount": "2000000",
                "price": decimal("1000000000000000000"),
                "fee_value": decimal("10000000000000000"),
            }),
            "0xsender",
        );

        let event = static_normalizer().normalize(&envelope).await.unwrap();
        assert_eq!(event.event_name, "Deposited");
        assert_eq!(event.category, Some(Category::Pool));
        assert_eq!(event.from_token, "sui");
        approx(event.volume_usd, 2.0);
        approx(event.fee_usd, 0.01);
    }

    #[tokio::test]
    async fn test_withdrawn() {
        let envelope = EventEnvelope::new(
            pool_tag("Withdrawn", &[USDC]),
            json!({
                "burn_amount": "4000000",
                "price": decimal("500000000000000000"),
                "fee_value": decimal("0"),
            }),
            "0xsender",
        );

        let event = static_normalizer().normalize(&envelope).await.unwrap();
        assert_eq!(event.to_token, "usdc");
        assert!(event.from_token.is_empty());
        approx(event.volume_usd, 2.0);
        approx(event.fee_usd, 0.0);
    }

    #[tokio::test]
    async fn test_swapped_uses_destination_decimals() {
        let envelope = EventEnvelope::new(
            pool_tag("Swapped", &[USDC, SUI]),
            json!({
                "dest_amount": "3000000000",
                "dest_price": decimal("2000000000000000000"),
                "fee_value": decimal("5000000000000000"),
            }),
            "0xsender",
        );

        let event = static_normalizer().normalize(&envelope).await.unwrap();
        assert_eq!(event.category, Some(Category::Swap));
        assert_eq!((event.from_token.as_str(), event.to_token.as_str()), ("usdc", "sui"));
        approx(event.volume_usd, 6.0);
        approx(event.fee_usd, 0.005);
    }

    #[tokio::test]
    async fn test_open_position_scales_amount_then_price() {
        // 0.5 SUI at 3.0 USD, 1 USDC fee at 1.0 USD
        let open = json!({
            "open_amount": "500000000",
            "open_fee_amount": "1000000",
            "index_price": decimal("3000000000000000000"),
            "collateral_price": decimal("1000000000000000000"),
        });
        let tag = position_tag(USDC, SUI, "LONG", "OpenPositionSuccessEvent");

        let direct = EventEnvelope::new(tag.clone(), json!({ "event": open.clone() }), "0xs");
        let claimed = EventEnvelope::new(tag, json!({ "claim": { "event": open } }), "0xs");

        for envelope in [direct, claimed] {
            let event = static_normalizer().normalize(&envelope).await.unwrap();
            assert_eq!(event.event_name, "OpenPositionSuccessEvent");
            assert_eq!(event.position_kind, Some(PositionEventKind::OpenPositionSuccess));
            assert_eq!(event.collateral_token, "usdc");
            assert_eq!(event.index_token, "sui");
            assert_eq!(event.direction, "LONG");
            approx(event.volume_usd, 1.5);
            approx(event.fee_usd, 1.0);
            assert_eq!(event.prices.index_price, Some(3.0));
        }
    }

    #[tokio::test]
    async fn test_open_position_without_event_is_zero() {
        let envelope = EventEnvelope::new(
            position_tag(USDC, ETH, "SHORT", "OpenPositionSuccessEvent"),
            json!({ "position_name": { "id": "9", "owner": "0xowner" } }),
            "0xs",
        );

        let event = static_normalizer().normalize(&envelope).await.unwrap();
        assert_eq!(event.index_token, "eth");
        assert_eq!(event.direction, "SHORT");
        assert_eq!(event.position_id.as_deref(), Some("9"));
        assert_eq!(event.volume_usd, 0.0);
        assert_eq!(event.fee_usd, 0.0);
        assert_eq!(event.prices, Prices::default());
    }

    #[tokio::test]
    async fn test_decrease_position() {
        let envelope = EventEnvelope::new(
            position_tag(USDC, SUI, "SHORT", "DecreasePositionSuccessEvent"),
            json!({ "event": {
                "decrease_amount": "2000000000",
                "index_price": decimal("1500000000000000000"),
                "collateral_price": decimal("1000000000000000000"),
                "decrease_fee_value": decimal("100000000000000000"),
                "reserving_fee_value": decimal("50000000000000000"),
                "funding_fee_value": signed(false, "20000000000000000"),
                "delta_realised_pnl": signed(false, "250000000000000000"),
            }}),
            "0xs",
        );

        let event = static_normalizer().normalize(&envelope).await.unwrap();
        approx(event.volume_usd, 3.0);
        approx(event.fee_usd, 0.13);
        approx(event.pnl_usd, -0.25);
        assert_eq!(event.prices.collateral_price, Some(1.0));
    }

    fn liquidation(position_size: Option<&str>) -> EventEnvelope {
        let mut inner = json!({
            "collateral_price": decimal("1000000000000000000"),
            "index_price": decimal("2000000000000000000"),
            "reserving_fee_value": decimal("10000000000000000"),
            "funding_fee_value": signed(true, "20000000000000000"),
            "delta_realised_pnl": signed(false, "1000000000000000000"),
        });
        if let Some(size) = position_size {
            inner["position_size"] = decimal(size);
        }
        EventEnvelope::new(
            position_tag(USDC, ETH, "LONG", "LiquidatePositionEvent"),
            json!({ "event": inner }),
            "0xkeeper",
        )
    }

    #[tokio::test]
    async fn test_liquidation_current_schema() {
        let metrics = RecordingMetrics::default();
        let log = RecordingEventLog::default();

        let event = static_normalizer()
            .process(&liquidation(Some("10000000000000000000")), &metrics, &log)
            .await
            .unwrap();

        approx(event.volume_usd, 9.0);
        approx(event.fee_usd, 0.03);
        approx(event.pnl_usd, -1.0);
        assert_eq!(event.liquidation_size_usd, Some(10.0));

        let liquidated = metrics.named(LIQUIDATION_USD);
        assert_eq!(liquidated.len(), 1);
        approx(liquidated[0].value, 10.0);
        assert_eq!(liquidated[0].tag("collateral_token"), Some("usdc"));
        assert_eq!(liquidated[0].tag("index_token"), Some("eth"));
        assert_eq!(liquidated[0].tag("direction"), Some("LONG"));
    }

    #[tokio::test]
    async fn test_liquidation_legacy_schema() {
        let metrics = RecordingMetrics::default();
        let event = static_normalizer()
            .process(&liquidation(None), &metrics, &RecordingEventLog::default())
            .await
            .unwrap();

        assert_eq!(event.volume_usd, 0.0);
        approx(event.fee_usd, 0.03);
        assert!(metrics.named(LIQUIDATION_USD).is_empty());
    }

    #[tokio::test]
    async fn test_informational_position_events_are_zero() {
        for name in ["PledgeInPositionEvent", "RedeemFromPositionEvent", "OpenPositionFailedEvent"] {
            let envelope = EventEnvelope::new(
                position_tag(USDC, SUI, "LONG", name),
                json!({ "event": { "anything": 1 } }),
                "0xs",
            );
            let event = static_normalizer().normalize(&envelope).await.unwrap();
            assert_eq!(event.event_name, name);
            assert_eq!(event.volume_usd, 0.0);
            assert_eq!(event.collateral_token, "usdc");
        }
    }

    #[tokio::test]
    async fn test_order_created() {
        let envelope = EventEnvelope::new(
            order_tag("OrderCreated", USDC, SUI, "SHORT", SUI),
            json!({
                "order_name": { "id": "3", "owner": "0xtrader", "position_id": "8" },
                "event": {
                    "limited_index_price": decimal("1250000000000000000"),
                    "collateral_price_threshold": decimal("990000000000000000"),
                }
            }),
            "0xs",
        );

        let event = static_normalizer().normalize(&envelope).await.unwrap();
        assert_eq!(event.category, Some(Category::Order));
        assert_eq!(event.fee_token.as_deref(), Some("sui"));
        assert_eq!(event.order_id.as_deref(), Some("3"));
        assert_eq!(event.position_id.as_deref(), Some("8"));
        assert_eq!(event.prices.limited_index_price, Some(1.25));
        assert_eq!(event.volume_usd, 0.0);
    }

    #[tokio::test]
    async fn test_order_executed_emits_log_only() {
        let metrics = RecordingMetrics::default();
        let log = RecordingEventLog::default();
        let envelope = EventEnvelope::new(
            order_tag("OrderExecuted", USDC, SUI, "LONG", USDC),
            json!({ "order_name": { "owner": "0xtrader" } }),
            "0xs",
        );

        let event = static_normalizer().process(&envelope, &metrics, &log).await.unwrap();
        assert_eq!(event.event_name, "OrderExecuted");
        assert_eq!(event.prices.limited_index_price, None);
        assert!(metrics.is_empty());
        assert_eq!(log.actors(), vec!["0xtrader".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_and_referral_are_default() {
        let normalizer = static_normalizer();

        let unknown = EventEnvelope::new("0x2::coin::Mint<0x2::sui::SUI>", json!({}), "0xs");
        assert_eq!(normalizer.normalize(&unknown).await.unwrap(), NormalizedEvent::default());

        let referral = EventEnvelope::new(
            format!("{}::referral::ReferralAdded", crate::test_fixtures::PKG),
            json!({ "referrer": "0x1" }),
            "0xs",
        );
        let event = normalizer.normalize(&referral).await.unwrap();
        assert_eq!(event.event_name, "ReferralAdded");
        assert_eq!(event.volume_usd, 0.0);
        assert!(event.collateral_token.is_empty());
    }

    #[tokio::test]
    async fn test_process_emits_volume_metrics_and_interaction() {
        let metrics = RecordingMetrics::default();
        let log = RecordingEventLog::default();
        let envelope = EventEnvelope::new(
            pool_tag("Swapped", &[USDC, SUI]),
            json!({
                "dest_amount": "3000000000",
                "dest_price": decimal("2000000000000000000"),
                "fee_value": decimal("5000000000000000"),
            }),
            "0xswapper",
        );

        static_normalizer().process(&envelope, &metrics, &log).await.unwrap();

        let names: Vec<_> = metrics.records().into_iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![TRADING_VOLUME_USD, CUMULATIVE_TRADING_VOLUME_USD, FEE, CUMULATIVE_FEE]
        );
        let volume = &metrics.named(TRADING_VOLUME_USD)[0];
        assert_eq!(volume.tag("type"), Some("Swap"));
        assert_eq!(volume.tag("from_token"), Some("usdc"));
        assert_eq!(volume.tag("to_token"), Some("sui"));
        assert_eq!(volume.tag("event_name"), Some("Swapped"));
        assert_eq!(log.actors(), vec!["0xswapper".to_string()]);
    }

    #[tokio::test]
    async fn test_process_tags_deposit_by_source_token() {
        let metrics = RecordingMetrics::default();
        let envelope = EventEnvelope::new(
            pool_tag("Deposited", &[SUI]),
            json!({
                "mint_amount": "2000000",
                "price": decimal("1000000000000000000"),
                "fee_value": decimal("10000000000000000"),
            }),
            "0xlp",
        );

        static_normalizer()
            .process(&envelope, &metrics, &RecordingEventLog::default())
            .await
            .unwrap();

        let records = metrics.records();
        assert_eq!(records.len(), 4);
        for record in &records {
            assert_eq!(record.tag("event_name"), Some("Deposited"));
            assert_eq!(record.tag("type"), Some("Pool"));
            assert_eq!(record.tag("from_token"), Some("sui"));
            assert_eq!(record.tag("to_token"), None);
        }
        approx(metrics.named(CUMULATIVE_TRADING_VOLUME_USD)[0].value, 2.0);
        approx(metrics.named(CUMULATIVE_FEE)[0].value, 0.01);
    }

    #[tokio::test]
    async fn test_process_tags_withdrawal_by_destination_token() {
        let metrics = RecordingMetrics::default();
        let envelope = EventEnvelope::new(
            pool_tag("Withdrawn", &[USDC]),
            json!({
                "burn_amount": "4000000",
                "price": decimal("500000000000000000"),
                "fee_value": decimal("0"),
            }),
            "0xlp",
        );

        static_normalizer()
            .process(&envelope, &metrics, &RecordingEventLog::default())
            .await
            .unwrap();

        let volume = &metrics.named(TRADING_VOLUME_USD)[0];
        assert_eq!(volume.tag("event_name"), Some("Withdrawn"));
        assert_eq!(volume.tag("type"), Some("Pool"));
        assert_eq!(volume.tag("to_token"), Some("usdc"));
        assert_eq!(volume.tag("from_token"), None);
        approx(volume.value, 2.0);
    }

    #[tokio::test]
    async fn test_process_tags_position_by_market() {
        let metrics = RecordingMetrics::default();
        let log = RecordingEventLog::default();
        let envelope = EventEnvelope::new(
            position_tag(USDC, SUI, "LONG", "OpenPositionSuccessEvent"),
            json!({
                "position_name": { "id": "5", "owner": "0xtrader" },
                "event": {
                    "open_amount": "500000000",
                    "open_fee_amount": "1000000",
                    "index_price": decimal("3000000000000000000"),
                    "collateral_price": decimal("1000000000000000000"),
                }
            }),
            "0xkeeper",
        );

        static_normalizer().process(&envelope, &metrics, &log).await.unwrap();

        let names: Vec<_> = metrics.records().into_iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![TRADING_VOLUME_USD, CUMULATIVE_TRADING_VOLUME_USD, FEE, CUMULATIVE_FEE]
        );
        let fee = &metrics.named(FEE)[0];
        assert_eq!(fee.tag("event_name"), Some("OpenPositionSuccessEvent"));
        assert_eq!(fee.tag("type"), Some("Position"));
        assert_eq!(fee.tag("collateral_token"), Some("usdc"));
        assert_eq!(fee.tag("index_token"), Some("sui"));
        assert_eq!(fee.tag("direction"), Some("LONG"));
        assert_eq!(fee.tag("from_token"), None);
        approx(fee.value, 1.0);
        assert_eq!(log.actors(), vec!["0xtrader".to_string()]);
        assert_eq!(log.events()[0].event_name, "OpenPositionSuccessEvent");
    }

    #[tokio::test]
    async fn test_cumulative_fee_nets_funding_rebates() {
        use crate::metrics::{PrometheusSink, registry};

        fn decrease(funding_positive: bool) -> EventEnvelope {
            EventEnvelope::new(
                position_tag(USDC, ETH, "LONG", "DecreasePositionSuccessEvent"),
                json!({ "event": {
                    "decrease_amount": "0",
                    "index_price": decimal("1000000000000000000"),
                    "collateral_price": decimal("1000000000000000000"),
                    "decrease_fee_value": decimal("0"),
                    "reserving_fee_value": decimal("10000000000000000"),
                    "funding_fee_value": signed(funding_positive, "50000000000000000"),
                    "delta_realised_pnl": signed(true, "0"),
                }}),
                "0xs",
            )
        }
        let labels = [
            "DecreasePositionSuccessEvent",
            "Position",
            "usdc",
            "eth",
            "LONG",
            "",
            "",
        ];
        let cumulative = || registry::CUMULATIVE_FEE.with_label_values(&labels).get();

        let normalizer = static_normalizer();
        let log = RecordingEventLog::default();
        let before = cumulative();

        let charged = normalizer
            .process(&decrease(true), &PrometheusSink, &log)
            .await
            .unwrap();
        let rebated = normalizer
            .process(&decrease(false), &PrometheusSink, &log)
            .await
            .unwrap();

        approx(charged.fee_usd, 0.06);
        approx(rebated.fee_usd, -0.04);
        approx(cumulative() - before, 0.02);
    }

    #[tokio::test]
    async fn test_decode_failure_emits_nothing() {
        let metrics = RecordingMetrics::default();
        let log = RecordingEventLog::default();
        let envelope = EventEnvelope::new(
            pool_tag("Deposited", &[SUI]),
            json!({ "mint_amount": "2000000", "fee_value": decimal("0") }),
            "0xs",
        );

        let err = static_normalizer()
            .process(&envelope, &metrics, &log)
            .await
            .unwrap_err();
        assert!(matches!(err, DecodeError::MissingField { field: "price", .. }));
        assert!(metrics.is_empty());
        assert!(log.actors().is_empty());
    }

    #[tokio::test]
    async fn test_too_few_position_params() {
        let tag = format!(
            "{pkg}::market::PositionClaimed<{pkg}::market::PositionName<{USDC}, {SUI}>, {pkg}::position::OpenPositionSuccessEvent>",
            pkg = crate::test_fixtures::PKG
        );
        let envelope = EventEnvelope::new(tag, json!({}), "0xs");
        assert!(matches!(
            static_normalizer().normalize(&envelope).await,
            Err(DecodeError::MissingTypeParam { expected: 3, found: 2, .. })
        ));
    }
}
