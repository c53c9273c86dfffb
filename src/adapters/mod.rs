//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements         | Connects to              |
//! |------------|--------------------|--------------------------|
//! | `hardware` | SensorPort         | ESP32 ADC, GPIO, DHT     |
//! |            | ActuatorPort       | ESP32 GPIO outputs       |
//! |            | StatusIndicator    |                          |
//! | `log_sink` | EventSink          | Serial log output        |
//! | `net`      | NetStack           | lwIP / host TCP + DNS    |
//! | `time`     | ClockPort, DelayNs | ESP32 system timer       |
//! | `wifi`     | LinkPort           | ESP-IDF WiFi STA         |

pub mod hardware;
pub mod log_sink;
pub mod net;
pub mod time;
pub mod wifi;
