//! Courier tracking client.
//!
//! The tracking refresh talks to the courier aggregator's HTTP API through
//! the `CourierClient` trait so tests can substitute a mock. The HTTP
//! implementation expects `GET {base}/track/{awb}` to return
//! `{"awb": ..., "status": ..., "timestamp": ..., "remark": ...}`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use strum::{Display, EnumString};
use tracing::{debug, instrument};
use url::Url;

use crate::errors::ServiceError;

/// Internal tracking states courier statuses are normalized onto.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TrackingState {
    InTransit,
    OutForDelivery,
    Delivered,
    RtoInitiated,
    RtoDelivered,
    Unknown,
}

/// Result of one tracking call.
#[derive(Debug, Clone, Serialize)]
pub struct TrackingStatus {
    pub awb: String,
    pub state: TrackingState,
    /// Raw status string as the courier reported it.
    pub raw_status: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub remark: Option<String>,
}

/// Normalizes a courier status string.
///
/// Couriers are inconsistent about casing and separators; RTO variants are
/// matched before plain "delivered" since "RTO Delivered" contains it.
pub fn map_courier_status(raw: &str) -> TrackingState {
    let status = raw.trim().to_ascii_lowercase().replace(['-', '_'], " ");
    if status.contains("rto") || status.contains("return to origin") {
        if status.contains("delivered") {
            TrackingState::RtoDelivered
        } else {
            TrackingState::RtoInitiated
        }
    } else if status.contains("delivered") {
        TrackingState::Delivered
    } else if status.contains("out for delivery") {
        TrackingState::OutForDelivery
    } else if status.contains("in transit")
        || status.contains("shipped")
        || status.contains("picked up")
        || status.contains("pickup")
    {
        TrackingState::InTransit
    } else {
        TrackingState::Unknown
    }
}

#[async_trait]
pub trait CourierClient: Send + Sync {
    async fn track(&self, awb: &str) -> Result<TrackingStatus, ServiceError>;
}

#[derive(Debug, Deserialize)]
struct TrackingPayload {
    #[serde(default)]
    awb: Option<String>,
    status: String,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    remark: Option<String>,
}

/// reqwest-backed courier client.
#[derive(Clone)]
pub struct HttpCourierClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl HttpCourierClient {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ServiceError::InternalError(format!("invalid courier API URL: {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::InternalError(format!("courier client build failed: {e}")))?;
        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }
}

#[async_trait]
impl CourierClient for HttpCourierClient {
    #[instrument(skip(self))]
    async fn track(&self, awb: &str) -> Result<TrackingStatus, ServiceError> {
        let url = self
            .base_url
            .join(&format!("track/{awb}"))
            .map_err(|e| ServiceError::InternalError(format!("invalid tracking URL: {e}")))?;

        let mut request = self.client.get(url);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ServiceError::UpstreamError(format!("courier request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ServiceError::UpstreamError(format!(
                "courier returned {} for AWB {awb}",
                response.status()
            )));
        }

        let payload: TrackingPayload = response
            .json()
            .await
            .map_err(|e| ServiceError::UpstreamError(format!("courier payload malformed: {e}")))?;

        let state = map_courier_status(&payload.status);
        debug!(awb, raw = %payload.status, state = %state, "courier status fetched");

        Ok(TrackingStatus {
            awb: payload.awb.unwrap_or_else(|| awb.to_string()),
            state,
            raw_status: payload.status,
            timestamp: payload.timestamp,
            remark: payload.remark,
        })
    }
}

/// Placeholder client used when no courier API is configured: every call
/// fails with an upstream error, which the refresh loop records as a
/// failure and moves on.
pub struct UnconfiguredCourier;

#[async_trait]
impl CourierClient for UnconfiguredCourier {
    async fn track(&self, _awb: &str) -> Result<TrackingStatus, ServiceError> {
        Err(ServiceError::UpstreamError(
            "courier tracking API is not configured".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Delivered", TrackingState::Delivered; "delivered_titlecase")]
    #[test_case("DELIVERED ", TrackingState::Delivered; "delivered_uppercase_trailing_space")]
    #[test_case("RTO Delivered", TrackingState::RtoDelivered; "rto_delivered_titlecase")]
    #[test_case("rto_delivered", TrackingState::RtoDelivered; "rto_delivered_snakecase")]
    #[test_case("RTO Initiated", TrackingState::RtoInitiated; "rto_initiated")]
    #[test_case("Return to Origin", TrackingState::RtoInitiated; "return_to_origin")]
    #[test_case("Out for Delivery", TrackingState::OutForDelivery; "out_for_delivery")]
    #[test_case("In Transit", TrackingState::InTransit; "in_transit_titlecase")]
    #[test_case("in_transit", TrackingState::InTransit; "in_transit_snakecase")]
    #[test_case("Picked Up", TrackingState::InTransit; "picked_up")]
    #[test_case("Shipment Manifested", TrackingState::Unknown; "shipment_manifested")]
    #[test_case("", TrackingState::Unknown; "empty")]
    fn maps_courier_statuses(raw: &str, expected: TrackingState) {
        assert_eq!(map_courier_status(raw), expected);
    }
}
