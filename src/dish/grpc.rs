// Starlink dish client over the device gRPC API (SpaceX.API.Device.Device/Handle)

use std::time::Duration;

use tonic::transport::{Channel, Endpoint};

use super::history::samples_since;
use super::{DishConnector, DishError, DishSession};
use crate::models::{HistoryBatch, StatusFields};

pub mod proto {
    #![allow(clippy::all, dead_code)]
    tonic::include_proto!("space_x.api.device");
}

use proto::device_client::DeviceClient;
use proto::{DishGetStatusResponse, GetHistoryRequest, GetStatusRequest, request, response};

pub struct GrpcDishConnector {
    target: String,
    timeout: Duration,
}

impl GrpcDishConnector {
    /// `target` is `host:port`; `timeout` bounds both connect and each call.
    pub fn new(target: impl Into<String>, timeout: Duration) -> Self {
        Self {
            target: target.into(),
            timeout,
        }
    }
}

impl DishConnector for GrpcDishConnector {
    type Session = GrpcDishSession;

    fn target(&self) -> &str {
        &self.target
    }

    async fn connect(&self) -> Result<GrpcDishSession, DishError> {
        let endpoint = Endpoint::from_shared(format!("http://{}", self.target))
            .map_err(|e| DishError::Connection(format!("invalid dish address {}: {e}", self.target)))?
            .connect_timeout(self.timeout)
            .timeout(self.timeout);
        let channel = endpoint.connect().await?;
        tracing::info!(dish = %self.target, "Connected to Starlink dish");
        Ok(GrpcDishSession {
            client: DeviceClient::new(channel),
            target: self.target.clone(),
        })
    }
}

pub struct GrpcDishSession {
    client: DeviceClient<Channel>,
    target: String,
}

impl GrpcDishSession {
    async fn handle(&mut self, request: request::Request) -> Result<response::Response, DishError> {
        let reply = self
            .client
            .handle(proto::Request {
                id: 0,
                request: Some(request),
            })
            .await?;
        reply
            .into_inner()
            .response
            .ok_or_else(|| DishError::Protocol("dish returned an empty response".into()))
    }
}

fn variant_name(response: &response::Response) -> &'static str {
    match response {
        response::Response::DishGetStatus(_) => "dish_get_status",
        response::Response::DishGetHistory(_) => "dish_get_history",
    }
}

fn status_fields(status: DishGetStatusResponse) -> StatusFields {
    if status.gps_stats.is_none() {
        tracing::warn!(field = "gps_stats", "Field not found in status response, using defaults");
    }
    if status.obstruction_stats.is_none() {
        tracing::warn!(
            field = "obstruction_stats",
            "Field not found in status response, using defaults"
        );
    }
    if status.device_info.is_none() {
        tracing::warn!(field = "device_info", "Field not found in status response, using defaults");
    }

    let gps = status.gps_stats.unwrap_or_default();
    let obstruction = status.obstruction_stats.unwrap_or_default();
    let info = status.device_info.unwrap_or_default();
    let state = status.device_state.unwrap_or_default();

    StatusFields {
        pop_ping_drop_rate: status.pop_ping_drop_rate.map(f64::from),
        pop_ping_latency_ms: status.pop_ping_latency_ms.map(f64::from),
        downlink_throughput_bps: status.downlink_throughput_bps.map(f64::from),
        uplink_throughput_bps: status.uplink_throughput_bps.map(f64::from),
        gps_sats: gps.gps_sats,
        gps_valid: gps.gps_valid,
        obstruction_fraction: obstruction.fraction_obstructed.map(f64::from),
        obstruction_time: obstruction.time_obstructed.map(f64::from),
        snr_above_noise_floor: status.is_snr_above_noise_floor,
        boresight_azimuth_deg: status.boresight_azimuth_deg.map(f64::from),
        boresight_elevation_deg: status.boresight_elevation_deg.map(f64::from),
        uptime_s: state.uptime_s,
        eth_speed_mbps: status.eth_speed_mbps,
        hardware_version: info.hardware_version,
        software_version: info.software_version,
        country_code: info.country_code,
    }
}

impl DishSession for GrpcDishSession {
    async fn fetch_status(&mut self) -> Result<StatusFields, DishError> {
        match self.handle(request::Request::GetStatus(GetStatusRequest {})).await? {
            response::Response::DishGetStatus(status) => Ok(status_fields(status)),
            other => Err(DishError::Protocol(format!(
                "expected dish_get_status, got {}",
                variant_name(&other)
            ))),
        }
    }

    async fn fetch_history_since(&mut self, since: Option<u64>) -> Result<HistoryBatch, DishError> {
        match self.handle(request::Request::GetHistory(GetHistoryRequest {})).await? {
            response::Response::DishGetHistory(history) => Ok(HistoryBatch {
                end_counter: history.current,
                samples: samples_since(&history.pop_ping_drop_rate, history.current, since),
            }),
            other => Err(DishError::Protocol(format!(
                "expected dish_get_history, got {}",
                variant_name(&other)
            ))),
        }
    }

    async fn close(self) {
        drop(self.client);
        tracing::info!(dish = %self.target, "Disconnected from Starlink dish");
    }
}
