//! Platform-agnostic core of a USB CDC to UART bridge.
//!
//! This crate implements the coordination logic of a USB-to-serial adapter:
//! bytes received on a bulk OUT endpoint are forwarded to a UART through a
//! TX DMA channel, and bytes received from the UART through an RX DMA
//! channel are forwarded to the host on a bulk IN endpoint. Each direction
//! is double buffered, so one buffer fills while the other drains, and the
//! CPU never copies payload bytes.
//!
//! # Overview
//!
//! The crate is organized into several modules:
//!
//! - [`hal`]: Capability traits implemented by the firmware
//!   ([`DmaEngine`], [`UsbEndpoints`], [`IdleTimer`], [`UartPort`])
//! - [`line_coding`]: The 7-byte CDC line-coding encoding and its
//!   validation into a typed [`FrameFormat`]
//! - [`control`]: CDC class control requests ([`ControlRequest`])
//! - [`host_to_device`]: Bulk OUT to UART TX pipeline
//! - [`device_to_host`]: UART RX to bulk IN pipeline
//! - [`monitor`]: Idle-flush monitoring of the UART RX channel
//! - [`lifecycle`]: USB device-state driven start/stop ([`DeviceState`])
//! - [`bridge`]: Ties everything together ([`Bridge`])
//!
//! # Execution model
//!
//! There is no executor and no threads: the device runs a bare interrupt
//! model. Every [`Bridge`] entry point is a completion callback invoked
//! from interrupt context, runs to completion, and returns. Callbacks may
//! nest (a DMA completion can preempt a USB completion), so the bridge
//! keeps all shared state behind a [`critical_section::Mutex`].
//!
//! # Example
//!
//! ```ignore
//! // Firmware side: implement the hal traits over the real peripherals,
//! // then route interrupt handlers into the bridge.
//! static BRIDGE: Bridge<Dma, Usb, Timer, Uart> = /* ... */;
//!
//! fn on_bulk_out_irq(status: TransferStatus, len: usize) {
//!     BRIDGE.on_usb_receive_complete(status, len);
//! }
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt logging (for embedded targets)
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.
//! Buffer memory is owned by the firmware alongside the peripherals; the
//! core tracks only logical buffer ownership, by index.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod log;

pub mod bridge;
pub mod control;
pub mod device_to_host;
pub mod hal;
pub mod host_to_device;
pub mod lifecycle;
pub mod line_coding;
pub mod monitor;

#[cfg(test)]
pub(crate) mod testing;

pub use bridge::Bridge;
pub use control::{ControlLineState, ControlReply, ControlRequest, RequestError};
pub use hal::{DmaEngine, IdleTimer, TransferStatus, UartPort, UsbEndpoints};
pub use lifecycle::DeviceState;
pub use line_coding::{CodingError, DataBits, FrameFormat, LineCoding, Parity, StopBits};

/// Maximum packet size of the full-speed bulk endpoints, in bytes.
pub const BULK_MAX_PACKET_SIZE: usize = 64;

/// Size of each host-direction buffer (filled by bulk OUT, drained by the
/// UART TX DMA channel). One bulk packet fits exactly.
pub const HOST_BUF_LEN: usize = BULK_MAX_PACKET_SIZE;

/// Size of each device-direction buffer (filled by the UART RX DMA
/// channel, drained by bulk IN). This is the packet size used when
/// transmitting toward the host.
pub const DEVICE_BUF_LEN: usize = 127;
