//! Out-of-band device notifications.
//!
//! The device never blocks. Instead it tells the host, synchronously and from
//! inside whichever entry point the host called, when it wants more compressed
//! data and when a frame has just been decoded.

/// Callbacks from the device back into the host.
///
/// Both signals are level updates, not edges: the device may repeat the same
/// value many times in a row and the host should treat each call as "the line
/// is now at this level".
pub trait DeviceSignals {
    /// Demand line. `true` asks the compressed-data source for more bytes.
    ///
    /// Raised after every ingested byte and after every fill attempt.
    fn on_demand(&mut self, need_more: bool);

    /// Frame-sync line. Pulsed low, then high around each successful decode.
    fn on_frame_sync(&mut self, active: bool);
}

/// A host that ignores both signals.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSignals;

impl DeviceSignals for NoSignals {
    fn on_demand(&mut self, _need_more: bool) {}

    fn on_frame_sync(&mut self, _active: bool) {}
}

impl<T: DeviceSignals + ?Sized> DeviceSignals for &mut T {
    fn on_demand(&mut self, need_more: bool) {
        (**self).on_demand(need_more);
    }

    fn on_frame_sync(&mut self, active: bool) {
        (**self).on_frame_sync(active);
    }
}
