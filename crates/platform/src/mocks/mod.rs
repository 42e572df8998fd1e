//! Mock implementations for testing
//!
//! This module provides mock implementations of the host-boundary traits
//! for use in unit and integration tests.

#![cfg(any(test, feature = "std"))]

use crate::signals::DeviceSignals;

/// One notification observed by [`RecordingSignals`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalEvent {
    /// `on_demand(need_more)`
    Demand(bool),
    /// `on_frame_sync(active)`
    FrameSync(bool),
}

/// Mock host that records every signal it receives.
///
/// The log keeps the first 1024 events; later events still update the
/// counters and current levels.
pub struct RecordingSignals {
    demand: Option<bool>,
    frame_sync: Option<bool>,
    demand_calls: usize,
    frame_syncs: usize,
    events: heapless::Vec<SignalEvent, 1024>,
}

impl RecordingSignals {
    /// Create a recorder that has seen nothing yet.
    pub fn new() -> Self {
        Self {
            demand: None,
            frame_sync: None,
            demand_calls: 0,
            frame_syncs: 0,
            events: heapless::Vec::new(),
        }
    }

    /// Last demand level, `None` if never signalled.
    pub fn demand(&self) -> Option<bool> {
        self.demand
    }

    /// `true` if the last demand signal asked for more data.
    pub fn need_more(&self) -> bool {
        self.demand.unwrap_or(false)
    }

    /// Last frame-sync level, `None` if never signalled.
    pub fn frame_sync(&self) -> Option<bool> {
        self.frame_sync
    }

    /// Number of `on_demand` calls seen.
    pub fn demand_calls(&self) -> usize {
        self.demand_calls
    }

    /// Number of rising frame-sync edges (successful decodes) seen.
    pub fn frame_syncs(&self) -> usize {
        self.frame_syncs
    }

    /// Recorded events, oldest first.
    pub fn events(&self) -> &[SignalEvent] {
        &self.events
    }

    /// Forget everything recorded so far.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    fn record(&mut self, event: SignalEvent) {
        // Store events for verification
        if self.events.len() < self.events.capacity() {
            let _ = self.events.push(event);
        }
    }
}

impl Default for RecordingSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceSignals for RecordingSignals {
    fn on_demand(&mut self, need_more: bool) {
        self.demand = Some(need_more);
        self.demand_calls = self.demand_calls.saturating_add(1);
        self.record(SignalEvent::Demand(need_more));
    }

    fn on_frame_sync(&mut self, active: bool) {
        if active && self.frame_sync != Some(true) {
            self.frame_syncs = self.frame_syncs.saturating_add(1);
        }
        self.frame_sync = Some(active);
        self.record(SignalEvent::FrameSync(active));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_levels_and_counts() {
        let mut s = RecordingSignals::new();
        assert_eq!(s.demand(), None);
        s.on_demand(true);
        s.on_frame_sync(false);
        s.on_frame_sync(true);
        s.on_demand(false);
        assert_eq!(s.demand(), Some(false));
        assert_eq!(s.frame_syncs(), 1);
        assert_eq!(s.demand_calls(), 2);
        assert_eq!(
            s.events(),
            [
                SignalEvent::Demand(true),
                SignalEvent::FrameSync(false),
                SignalEvent::FrameSync(true),
                SignalEvent::Demand(false),
            ]
        );
    }

    #[test]
    fn repeated_high_frame_sync_counts_once() {
        let mut s = RecordingSignals::new();
        s.on_frame_sync(true);
        s.on_frame_sync(true);
        assert_eq!(s.frame_syncs(), 1);
    }
}
