// Point-in-time dish status and the gauge set derived from it

/// Label value used for identity fields the dish did not report.
pub const UNKNOWN_LABEL: &str = "unknown";

/// One status read from the dish. Every field is optional: older firmware omits some
/// sub-messages, and the monitor must keep working with whatever subset it gets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusFields {
    pub pop_ping_drop_rate: Option<f64>,
    pub pop_ping_latency_ms: Option<f64>,
    pub downlink_throughput_bps: Option<f64>,
    pub uplink_throughput_bps: Option<f64>,
    pub gps_sats: Option<u32>,
    pub gps_valid: Option<bool>,
    pub obstruction_fraction: Option<f64>,
    pub obstruction_time: Option<f64>,
    pub snr_above_noise_floor: Option<bool>,
    pub boresight_azimuth_deg: Option<f64>,
    pub boresight_elevation_deg: Option<f64>,
    pub uptime_s: Option<u64>,
    pub eth_speed_mbps: Option<i32>,
    pub hardware_version: Option<String>,
    pub software_version: Option<String>,
    pub country_code: Option<String>,
}

/// Gauges and identity labels exposed on /metrics.
///
/// `Default` is the documented fallback table: numbers are zero, flags are false
/// (rendered as `0`) and identity labels are [`UNKNOWN_LABEL`].
#[derive(Debug, Clone, PartialEq)]
pub struct DishGauges {
    pub pop_ping_latency_ms: f64,
    pub downlink_throughput_bps: f64,
    pub uplink_throughput_bps: f64,
    pub gps_sats: u32,
    pub gps_valid: bool,
    pub obstruction_fraction: f64,
    pub obstruction_time: f64,
    pub snr_above_noise_floor: bool,
    pub boresight_azimuth_deg: f64,
    pub boresight_elevation_deg: f64,
    pub uptime_s: u64,
    pub eth_speed_mbps: i32,
    pub hardware_version: String,
    pub software_version: String,
    pub country_code: String,
}

impl Default for DishGauges {
    fn default() -> Self {
        Self {
            pop_ping_latency_ms: 0.0,
            downlink_throughput_bps: 0.0,
            uplink_throughput_bps: 0.0,
            gps_sats: 0,
            gps_valid: false,
            obstruction_fraction: 0.0,
            obstruction_time: 0.0,
            snr_above_noise_floor: false,
            boresight_azimuth_deg: 0.0,
            boresight_elevation_deg: 0.0,
            uptime_s: 0,
            eth_speed_mbps: 0,
            hardware_version: UNKNOWN_LABEL.to_string(),
            software_version: UNKNOWN_LABEL.to_string(),
            country_code: UNKNOWN_LABEL.to_string(),
        }
    }
}

impl DishGauges {
    /// Build the full gauge set from a status read, substituting the default for any absent field.
    pub fn from_status(status: &StatusFields) -> Self {
        let d = Self::default();
        Self {
            pop_ping_latency_ms: status.pop_ping_latency_ms.unwrap_or(d.pop_ping_latency_ms),
            downlink_throughput_bps: status
                .downlink_throughput_bps
                .unwrap_or(d.downlink_throughput_bps),
            uplink_throughput_bps: status
                .uplink_throughput_bps
                .unwrap_or(d.uplink_throughput_bps),
            gps_sats: status.gps_sats.unwrap_or(d.gps_sats),
            gps_valid: status.gps_valid.unwrap_or(d.gps_valid),
            obstruction_fraction: status
                .obstruction_fraction
                .unwrap_or(d.obstruction_fraction),
            obstruction_time: status.obstruction_time.unwrap_or(d.obstruction_time),
            snr_above_noise_floor: status
                .snr_above_noise_floor
                .unwrap_or(d.snr_above_noise_floor),
            boresight_azimuth_deg: status
                .boresight_azimuth_deg
                .unwrap_or(d.boresight_azimuth_deg),
            boresight_elevation_deg: status
                .boresight_elevation_deg
                .unwrap_or(d.boresight_elevation_deg),
            uptime_s: status.uptime_s.unwrap_or(d.uptime_s),
            eth_speed_mbps: status.eth_speed_mbps.unwrap_or(d.eth_speed_mbps),
            hardware_version: status.hardware_version.clone().unwrap_or(d.hardware_version),
            software_version: status.software_version.clone().unwrap_or(d.software_version),
            country_code: status.country_code.clone().unwrap_or(d.country_code),
        }
    }
}
