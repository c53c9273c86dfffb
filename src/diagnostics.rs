//! Runtime diagnostics.
//!
//! [`LoopStats`] counts what the control loop did since boot; the upload
//! latency high-water mark is the number to watch, since every upload
//! blocks hazard response for its whole duration.
//!
//! [`heap_checkpoint`] is the memory probe run right before each upload
//! opens a socket.

use serde::{Deserialize, Serialize};

/// Control-loop counters since boot.  Lost on reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopStats {
    pub cycles: u64,
    /// Cycles whose body returned an error.
    pub faulted_cycles: u32,
    /// Cycles that ended in danger.
    pub danger_cycles: u32,
    pub uploads_ok: u32,
    pub uploads_failed: u32,
    /// Longest time a single upload blocked the loop.
    pub longest_upload_ms: u32,
}

impl LoopStats {
    pub fn record_upload(&mut self, ok: bool, elapsed_ms: u32) {
        if ok {
            self.uploads_ok = self.uploads_ok.saturating_add(1);
        } else {
            self.uploads_failed = self.uploads_failed.saturating_add(1);
        }
        self.longest_upload_ms = self.longest_upload_ms.max(elapsed_ms);
    }
}

/// Free heap right now, in bytes.
#[cfg(target_os = "espidf")]
pub fn free_heap_bytes() -> Option<u32> {
    Some(unsafe { esp_idf_svc::sys::esp_get_free_heap_size() })
}

/// Free heap right now, in bytes.  Not available on the host.
#[cfg(not(target_os = "espidf"))]
pub fn free_heap_bytes() -> Option<u32> {
    None
}

/// Lowest free heap seen since boot, in bytes.
#[cfg(target_os = "espidf")]
pub fn min_free_heap_bytes() -> Option<u32> {
    Some(unsafe { esp_idf_svc::sys::esp_get_minimum_free_heap_size() })
}

#[cfg(not(target_os = "espidf"))]
pub fn min_free_heap_bytes() -> Option<u32> {
    None
}

/// Log the heap state under `tag`.
pub fn heap_checkpoint(tag: &str) {
    match (free_heap_bytes(), min_free_heap_bytes()) {
        (Some(free), Some(min)) => log::debug!("heap[{}]: free={} min={}", tag, free, min),
        _ => log::debug!("heap[{}]: n/a", tag),
    }
}
