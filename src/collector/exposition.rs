// Prometheus text exposition for the aggregate. Metric names are a scrape contract; do not rename.

use std::fmt::{Display, Write};
use std::time::{Duration, UNIX_EPOCH};

use super::AggregateState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MetricKind {
    Gauge,
    Counter,
}

impl MetricKind {
    fn as_str(self) -> &'static str {
        match self {
            MetricKind::Gauge => "gauge",
            MetricKind::Counter => "counter",
        }
    }
}

/// Formats a float the way the exposition format spells non-finite values.
struct Float(f64);

impl Display for Float {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            v if v.is_nan() => f.write_str("NaN"),
            v if v == f64::INFINITY => f.write_str("+Inf"),
            v if v == f64::NEG_INFINITY => f.write_str("-Inf"),
            v => write!(f, "{v}"),
        }
    }
}

fn header(out: &mut String, name: &str, help: &str, kind: MetricKind) {
    if !out.is_empty() {
        out.push('\n');
    }
    let _ = writeln!(out, "# HELP {name} {help}");
    let _ = writeln!(out, "# TYPE {name} {}", kind.as_str());
}

fn metric(out: &mut String, name: &str, help: &str, kind: MetricKind, value: impl Display) {
    header(out, name, help, kind);
    let _ = writeln!(out, "{name} {value}");
}

fn esc(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

fn flag(b: bool) -> u8 {
    u8::from(b)
}

pub(crate) fn render(state: &AggregateState, monitor_uptime: Duration) -> String {
    use MetricKind::{Counter, Gauge};

    let g = &state.gauges;
    let last_update = state
        .last_update
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);

    let mut out = String::with_capacity(4096);
    metric(
        &mut out,
        "starlink_ping_drop_rate_current",
        "Current ping drop rate (0.0-1.0)",
        Gauge,
        Float(state.current_drop_rate),
    );
    metric(
        &mut out,
        "starlink_ping_drop_rate_peak",
        "Peak ping drop rate observed (0.0-1.0)",
        Gauge,
        Float(state.peak_drop_rate),
    );
    metric(
        &mut out,
        "starlink_ping_drop_total_seconds",
        "Total time with packet loss in seconds",
        Counter,
        Float(state.total_drop_seconds),
    );
    metric(
        &mut out,
        "starlink_ping_drop_events_total",
        "Number of ping drop events (transitions to dropping state)",
        Counter,
        state.drop_events,
    );
    metric(
        &mut out,
        "starlink_ping_samples_total",
        "Total number of samples processed",
        Counter,
        state.total_samples,
    );
    metric(
        &mut out,
        "starlink_pop_ping_latency_ms",
        "Round-trip latency to Starlink Point of Presence in milliseconds",
        Gauge,
        Float(g.pop_ping_latency_ms),
    );
    metric(
        &mut out,
        "starlink_downlink_throughput_bps",
        "Current downlink (download) throughput in bits per second",
        Gauge,
        Float(g.downlink_throughput_bps),
    );
    metric(
        &mut out,
        "starlink_uplink_throughput_bps",
        "Current uplink (upload) throughput in bits per second",
        Gauge,
        Float(g.uplink_throughput_bps),
    );
    metric(
        &mut out,
        "starlink_gps_satellites",
        "Number of GPS satellites currently tracked",
        Gauge,
        g.gps_sats,
    );
    metric(
        &mut out,
        "starlink_gps_valid",
        "GPS lock status (1=valid, 0=invalid)",
        Gauge,
        flag(g.gps_valid),
    );
    metric(
        &mut out,
        "starlink_obstruction_fraction",
        "Fraction of time the dish view is obstructed (0.0-1.0)",
        Gauge,
        Float(g.obstruction_fraction),
    );
    metric(
        &mut out,
        "starlink_obstruction_time_seconds",
        "Total time obstructed in seconds",
        Gauge,
        Float(g.obstruction_time),
    );
    metric(
        &mut out,
        "starlink_snr_above_noise_floor",
        "Signal-to-noise ratio quality indicator (1=good, 0=poor)",
        Gauge,
        flag(g.snr_above_noise_floor),
    );
    metric(
        &mut out,
        "starlink_boresight_azimuth_degrees",
        "Dish boresight azimuth angle in degrees",
        Gauge,
        Float(g.boresight_azimuth_deg),
    );
    metric(
        &mut out,
        "starlink_boresight_elevation_degrees",
        "Dish boresight elevation angle in degrees",
        Gauge,
        Float(g.boresight_elevation_deg),
    );
    metric(
        &mut out,
        "starlink_uptime_seconds",
        "Device uptime in seconds",
        Gauge,
        g.uptime_s,
    );
    metric(
        &mut out,
        "starlink_eth_speed_mbps",
        "Ethernet link speed in Mbps",
        Gauge,
        g.eth_speed_mbps,
    );

    header(&mut out, "starlink_info", "Static device information", Gauge);
    let _ = writeln!(
        out,
        "starlink_info{{hardware_version=\"{}\",software_version=\"{}\",country_code=\"{}\"}} 1",
        esc(&g.hardware_version),
        esc(&g.software_version),
        esc(&g.country_code)
    );

    metric(
        &mut out,
        "starlink_monitor_last_update_timestamp",
        "Unix timestamp of last successful update",
        Gauge,
        Float(last_update),
    );
    metric(
        &mut out,
        "starlink_monitor_errors_total",
        "Total number of errors communicating with dish",
        Counter,
        state.errors_total,
    );
    metric(
        &mut out,
        "starlink_monitor_scrapes_total",
        "Total number of metric scrapes",
        Counter,
        state.scrapes_total,
    );
    metric(
        &mut out,
        "starlink_monitor_uptime_seconds",
        "Uptime of the monitoring service in seconds",
        Counter,
        Float(monitor_uptime.as_secs_f64()),
    );
    out
}
