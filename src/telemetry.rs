//! Telemetry uploader.
//!
//! One upload = one short-lived TCP connection carrying one HTTP/1.1 GET:
//!
//! ```text
//! GET /update?api_key=KEY&field1=55.3&field2=1&field3=1&field4=51.7 HTTP/1.1\r\n
//! Host: HOST\r\n
//! Connection: close\r\n
//! \r\n
//! ```
//!
//! | Field    | Value                    |
//! |----------|--------------------------|
//! | `field1` | gas %, one decimal       |
//! | `field2` | flame, `0`/`1`           |
//! | `field3` | alert, `0`/`1`           |
//! | `field4` | temperature °C, one decimal |
//!
//! The response is read once (at most [`RESPONSE_LIMIT`] bytes) and thrown
//! away; the status line is not checked.  The connection is closed on every
//! path out of [`TelemetryUploader::upload`].

use core::fmt::Write;

use log::debug;

use crate::app::ports::{Connection, NetStack, TelemetryPort};
use crate::config::MonitorConfig;
use crate::diagnostics;
use crate::error::UploadError;
use crate::safety::HazardState;
use crate::sensors::SensorReading;

/// Upper bound on the response bytes read per upload.
pub const RESPONSE_LIMIT: usize = 128;

/// Request buffer capacity: fixed text plus the longest key, host and
/// numeric fields the config allows.
pub const REQUEST_CAPACITY: usize = 320;

pub type Request = heapless::String<REQUEST_CAPACITY>;

/// The values sent for one upload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UploadRecord {
    pub timestamp_ms: u32,
    pub gas_percent: f32,
    pub flame_code: u8,
    pub alert_code: u8,
    pub temperature_c: f32,
}

impl UploadRecord {
    pub fn from_reading(timestamp_ms: u32, reading: &SensorReading, hazard: HazardState) -> Self {
        Self {
            timestamp_ms,
            gas_percent: reading.gas_percent,
            flame_code: reading.flame_code(),
            alert_code: hazard.alert_code(),
            temperature_c: reading.temperature_c,
        }
    }
}

/// Acknowledgement of a completed exchange.  Carries only how much of the
/// response was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    pub bytes_received: usize,
}

/// Render the full request for `record`.
pub fn build_request(api_key: &str, host: &str, record: &UploadRecord) -> Result<Request, UploadError> {
    let mut req = Request::new();
    write!(
        req,
        "GET /update?api_key={}&field1={:.1}&field2={}&field3={}&field4={:.1} HTTP/1.1\r\n\
         Host: {}\r\n\
         Connection: close\r\n\
         \r\n",
        api_key,
        record.gas_percent,
        record.flame_code,
        record.alert_code,
        record.temperature_c,
        host,
    )
    .map_err(|_| UploadError::Encode)?;
    Ok(req)
}

/// Sends [`UploadRecord`]s over a [`NetStack`].
pub struct TelemetryUploader<N> {
    net: N,
    host: heapless::String<64>,
    port: u16,
    api_key: heapless::String<32>,
    timeout_ms: u32,
}

impl<N: NetStack> TelemetryUploader<N> {
    pub fn new(net: N, config: &MonitorConfig) -> Self {
        Self {
            net,
            host: config.telemetry_host.clone(),
            port: config.telemetry_port,
            api_key: config.api_key.clone(),
            timeout_ms: config.upload_timeout_ms,
        }
    }

    pub fn net(&self) -> &N {
        &self.net
    }
}

impl<N: NetStack> TelemetryPort for TelemetryUploader<N> {
    fn upload(&mut self, record: &UploadRecord) -> Result<Ack, UploadError> {
        let request = build_request(&self.api_key, &self.host, record)?;

        diagnostics::heap_checkpoint("upload");

        let addr = self.net.resolve(&self.host, self.port)?;
        let mut conn = self.net.open(addr, self.timeout_ms)?;
        let result = exchange(&mut conn, request.as_bytes());
        conn.close();

        if let Ok(ack) = &result {
            debug!("telemetry: {} -> {} response bytes", addr, ack.bytes_received);
        }
        result
    }
}

fn exchange(conn: &mut impl Connection, request: &[u8]) -> Result<Ack, UploadError> {
    conn.send_all(request)?;
    let mut buf = [0u8; RESPONSE_LIMIT];
    let bytes_received = conn.recv(&mut buf)?;
    Ok(Ack { bytes_received })
}

/// Uplink used when the node runs without a network link.  Every upload
/// fails with [`UploadError::Offline`] and no I/O happens.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineUplink;

impl TelemetryPort for OfflineUplink {
    fn upload(&mut self, _record: &UploadRecord) -> Result<Ack, UploadError> {
        Err(UploadError::Offline)
    }
}
