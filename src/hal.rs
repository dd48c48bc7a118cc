//! Capability traits implemented by the firmware.
//!
//! The bridge core never touches peripheral registers or buffer memory.
//! The firmware owns the two ping-pong buffer pairs next to the
//! peripherals and exposes them to the core through these traits; the
//! core refers to buffers only by index (0 or 1) within a direction.
//!
//! # Completion contract
//!
//! Every `start_*` operation is asynchronous: the implementation kicks the
//! hardware and returns immediately. Completion is reported later by
//! routing the corresponding interrupt into the matching
//! [`Bridge`](crate::Bridge) entry point. Implementations must never
//! invoke a completion callback synchronously from within a `start_*`
//! call; the bridge holds its state lock across these calls.
//!
//! # `no_std` Compatibility
//!
//! All implementations must be `no_std` compatible with no heap
//! allocation.

use crate::line_coding::FrameFormat;

/// Outcome of a completed USB transfer, as reported by the USB stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferStatus {
    /// The transfer completed successfully.
    Completed,
    /// The transfer ended with an error. The bridge treats this as "no
    /// data": the affected pipeline simply does not advance.
    Failed,
}

/// The two UART DMA channels.
///
/// The TX channel drains host-direction buffers into the UART data
/// register; the RX channel fills device-direction buffers from it.
pub trait DmaEngine {
    /// Start a TX transfer draining `len` bytes from host-direction
    /// buffer `index` into the UART.
    fn start_tx(&mut self, index: usize, len: usize);

    /// Start an RX transfer filling up to `len` bytes of device-direction
    /// buffer `index` from the UART.
    fn start_rx(&mut self, index: usize, len: usize);

    /// Halt the TX channel without a completion callback.
    fn stop_tx(&mut self);

    /// Halt the RX channel without a completion callback.
    ///
    /// [`rx_remaining`](Self::rx_remaining) must keep reporting the halted
    /// transfer's remaining count until the next
    /// [`start_rx`](Self::start_rx).
    fn stop_rx(&mut self);

    /// Bytes the current (or most recently halted) RX transfer has not
    /// yet written.
    fn rx_remaining(&self) -> usize;
}

/// The bulk endpoint pair of the CDC data interface.
///
/// Each endpoint supports one outstanding transfer at a time; the bridge
/// never requests a second transfer before the first one's completion has
/// been delivered.
pub trait UsbEndpoints {
    /// Arm the bulk OUT endpoint to receive up to `len` bytes into
    /// host-direction buffer `index`.
    fn start_read(&mut self, index: usize, len: usize);

    /// Start a bulk IN transfer of `len` bytes from device-direction
    /// buffer `index`. A `len` of zero sends a zero-length packet.
    fn start_write(&mut self, index: usize, len: usize);
}

/// The single-shot timer driving the idle-flush monitor.
pub trait IdleTimer {
    /// Arm the timer to fire once after `timeout_ms` milliseconds.
    /// Re-arming a running timer restarts it.
    fn start(&mut self, timeout_ms: u32);

    /// Cancel the timer. A callback already queued for delivery may still
    /// fire once afterwards.
    fn stop(&mut self);
}

/// The UART peripheral's configuration surface.
///
/// Data movement goes exclusively through the [`DmaEngine`]; this trait
/// only reprograms framing and baud rate, and is called with validated
/// values only.
pub trait UartPort {
    /// Reprogram the UART frame format and baud rate.
    fn configure(&mut self, frame: FrameFormat, baud_rate: u32);
}
