//! USB device-state driven lifecycle of the two pipelines.
//!
//! The bridge only cares about three of the USB device states: everything
//! runs while the device is configured, and nothing runs otherwise.
//! Resuming from suspend re-runs the full start sequence.

/// USB device state as reported by the device stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceState {
    /// Not configured by the host (includes attached/addressed).
    Unconfigured,
    /// Configured; the data interface is live.
    Configured,
    /// Bus suspended.
    Suspended,
}

/// What a state change means for the pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transition {
    /// Initialize both directions and arm reception.
    Start,
    /// Stop the idle timer and both DMA channels.
    Stop,
    /// No effect on the pipelines.
    Ignore,
}

pub(crate) fn transition(old: DeviceState, new: DeviceState) -> Transition {
    if new == DeviceState::Configured {
        Transition::Start
    } else if old == DeviceState::Configured {
        Transition::Stop
    } else {
        Transition::Ignore
    }
}
