//! DHT22 / DHT11 single-wire temperature sensor.
//!
//! Both parts speak the same start-signal / 40-bit frame protocol but pack
//! the temperature differently, so the driver has to know which one is
//! fitted.  That is decided once at start-up by [`Dht::probe`], which reads
//! frames until one decodes sensibly under exactly one layout; the
//! resulting [`DhtKind`] is fixed for the lifetime of the driver.
//!
//! Decoded temperatures outside the part's range are rejected, so a wrong
//! guess yields invalid readings rather than a phantom over-temperature.
//!
//! ## Frame layout
//!
//! | Byte | DHT22                  | DHT11              |
//! |------|------------------------|--------------------|
//! | 0–1  | RH × 10 (big-endian)   | RH integer, 0      |
//! | 2–3  | T × 10, bit 15 = sign  | T integer, tenths  |
//! | 4    | checksum (sum of 0–3)  | checksum           |

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::{debug, info, warn};

use crate::error::SensorReadError;

/// Host pulls the line low this long to request a frame.
const START_LOW_MS: u32 = 18;
/// Upper bound on any single level while waiting for an edge.
const EDGE_TIMEOUT_US: u32 = 100;
/// A data bit is `1` if the line is still high this long after it rose.
const BIT_SAMPLE_US: u32 = 35;
/// Largest humidity word a DHT22 can report (100.0 %RH).
const DHT22_MAX_RH_WORD: u16 = 1000;
/// DHT22 temperature range, tenths of a degree.
const DHT22_MIN_DECI_C: i16 = -400;
const DHT22_MAX_DECI_C: i16 = 800;
/// DHT11 range (clones reach 60 C).
const DHT11_MAX_C: u8 = 60;
/// Frames read by [`Dht::probe`] before it gives up.
pub const PROBE_ATTEMPTS: u32 = 3;
/// Gap between probe reads; DHT parts need ~2 s between conversions.
const PROBE_RETRY_MS: u32 = 2_000;

/// Anything that yields one temperature measurement in Celsius.
pub trait TemperatureDriver {
    fn measure(&mut self) -> Result<f32, SensorReadError>;
}

/// Which DHT part is fitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DhtKind {
    Dht22,
    Dht11,
}

impl DhtKind {
    /// Part assumed when no probe frame identifies the sensor.
    pub const FALLBACK: Self = Self::Dht22;

    /// Classify a frame.  `None` if the checksum fails or the frame is
    /// plausible under both layouts (or neither).
    pub fn detect(frame: &[u8; 5]) -> Option<Self> {
        verify_checksum(frame).ok()?;
        match (Self::Dht22.plausible(frame), Self::Dht11.plausible(frame)) {
            (true, false) => Some(Self::Dht22),
            (false, true) => Some(Self::Dht11),
            _ => None,
        }
    }

    fn plausible(self, frame: &[u8; 5]) -> bool {
        match self {
            Self::Dht22 => {
                let rh_word = u16::from_be_bytes([frame[0], frame[1]]);
                rh_word <= DHT22_MAX_RH_WORD && dht22_deci_c(frame).is_some()
            }
            Self::Dht11 => {
                frame[0] <= 100 && frame[1] == 0 && frame[2] <= DHT11_MAX_C && frame[3] & 0x0F <= 9
            }
        }
    }
}

/// DHT22 temperature in tenths of a degree, if within the part's range.
fn dht22_deci_c(frame: &[u8; 5]) -> Option<i16> {
    let magnitude = (i16::from(frame[2] & 0x7F) << 8) | i16::from(frame[3]);
    let deci = if frame[2] & 0x80 != 0 { -magnitude } else { magnitude };
    (DHT22_MIN_DECI_C..=DHT22_MAX_DECI_C).contains(&deci).then_some(deci)
}

fn verify_checksum(frame: &[u8; 5]) -> Result<(), SensorReadError> {
    let sum = frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum == frame[4] {
        Ok(())
    } else {
        Err(SensorReadError::ChecksumMismatch)
    }
}

/// Decode the temperature from a raw frame.
pub fn decode_celsius(kind: DhtKind, frame: &[u8; 5]) -> Result<f32, SensorReadError> {
    verify_checksum(frame)?;
    match kind {
        DhtKind::Dht22 => dht22_deci_c(frame)
            .map(|deci| f32::from(deci) / 10.0)
            .ok_or(SensorReadError::OutOfRange),
        DhtKind::Dht11 if frame[2] <= DHT11_MAX_C => {
            Ok(f32::from(frame[2]) + f32::from(frame[3] & 0x0F) / 10.0)
        }
        DhtKind::Dht11 => Err(SensorReadError::OutOfRange),
    }
}

/// Read up to `attempts` frames until one identifies the part.
///
/// `read` gets the attempt index; it is expected to wait between reads.
pub fn identify(
    attempts: u32,
    mut read: impl FnMut(u32) -> Result<[u8; 5], SensorReadError>,
) -> Option<DhtKind> {
    for attempt in 0..attempts {
        match read(attempt) {
            Ok(frame) => match DhtKind::detect(&frame) {
                Some(kind) => return Some(kind),
                None => debug!("DHT: probe frame {:02x?} inconclusive", frame),
            },
            Err(e) => debug!("DHT: probe read {} failed: {}", attempt + 1, e),
        }
    }
    None
}

/// Bit-banged DHT driver over an open-drain pin.
pub struct Dht<P, D> {
    pin: P,
    delay: D,
    kind: DhtKind,
}

impl<P, D> Dht<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    /// Build a driver for a known part.
    pub fn new(pin: P, delay: D, kind: DhtKind) -> Self {
        Self { pin, delay, kind }
    }

    /// Read frames until one identifies the part.
    ///
    /// Call after the sensor's power-up settling time.  If no frame is
    /// conclusive, [`DhtKind::FALLBACK`] is used; out-of-range decodes
    /// then surface as invalid readings.  `delay` does the bit timing;
    /// `retry_delay` waits between reads and should yield.
    pub fn probe(pin: P, delay: D, retry_delay: &mut impl DelayNs) -> Self {
        let mut dht = Self::new(pin, delay, DhtKind::FALLBACK);
        let found = identify(PROBE_ATTEMPTS, |attempt| {
            if attempt > 0 {
                retry_delay.delay_ms(PROBE_RETRY_MS);
            }
            dht.read_frame()
        });
        match found {
            Some(kind) => {
                dht.kind = kind;
                info!("DHT: probe detected {:?}", kind);
            }
            None => warn!(
                "DHT: no conclusive frame in {} reads, assuming {:?}",
                PROBE_ATTEMPTS,
                DhtKind::FALLBACK
            ),
        }
        dht
    }

    pub fn kind(&self) -> DhtKind {
        self.kind
    }

    fn read_frame(&mut self) -> Result<[u8; 5], SensorReadError> {
        // Start signal: hold low, then release to the pull-up.
        self.pin.set_low().map_err(|_| SensorReadError::NoResponse)?;
        self.delay.delay_ms(START_LOW_MS);
        self.pin.set_high().map_err(|_| SensorReadError::NoResponse)?;

        // Response: ~80 µs low, ~80 µs high, then the first bit's low.
        self.wait_for_level(false).map_err(|_| SensorReadError::NoResponse)?;
        self.wait_for_level(true).map_err(|_| SensorReadError::NoResponse)?;
        self.wait_for_level(false).map_err(|_| SensorReadError::NoResponse)?;

        let mut frame = [0u8; 5];
        for bit in 0..40 {
            self.wait_for_level(true)?;
            self.delay.delay_us(BIT_SAMPLE_US);
            let one = self.pin.is_high().map_err(|_| SensorReadError::Timeout)?;
            if one {
                frame[bit / 8] |= 0x80 >> (bit % 8);
                self.wait_for_level(false)?;
            }
        }
        Ok(frame)
    }

    fn wait_for_level(&mut self, high: bool) -> Result<(), SensorReadError> {
        for _ in 0..EDGE_TIMEOUT_US {
            if self.pin.is_high().map_err(|_| SensorReadError::Timeout)? == high {
                return Ok(());
            }
            self.delay.delay_us(1);
        }
        Err(SensorReadError::Timeout)
    }
}

impl<P, D> TemperatureDriver for Dht<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    fn measure(&mut self) -> Result<f32, SensorReadError> {
        let frame = self.read_frame()?;
        let celsius = decode_celsius(self.kind, &frame)?;
        debug!("DHT: {:?} frame {:02x?} -> {:.1}C", self.kind, frame, celsius);
        Ok(celsius)
    }
}
