//! The host-to-device pipeline: bulk OUT to UART TX.
//!
//! Two 64-byte buffers ping-pong between the bulk OUT endpoint (filling)
//! and the UART TX DMA channel (draining). At most one transfer is
//! outstanding on each side. When a packet arrives while the DMA channel
//! is still draining the previous one, the packet is parked and the OUT
//! endpoint is deliberately left unarmed. That bounds outstanding work to
//! one buffer per side and lets USB flow control push back on the host.

use crate::hal::{DmaEngine, TransferStatus, UsbEndpoints};
use crate::HOST_BUF_LEN;

/// Per-direction state record for host-to-device traffic.
#[derive(Debug)]
pub(crate) struct HostToDevice {
    /// A UART TX DMA transfer is outstanding.
    dma_busy: bool,
    /// Index of the buffer the outstanding (or next) read fills.
    active: usize,
    /// Byte count of a completed packet in `buffers[active ^ 1]` waiting
    /// for the DMA channel to free up. `Some` also means the OUT endpoint
    /// is unarmed: the read is only re-issued once the packet drains.
    waiting: Option<usize>,
}

impl HostToDevice {
    pub(crate) const fn idle() -> Self {
        Self {
            dma_busy: false,
            active: 0,
            waiting: None,
        }
    }

    /// Arm the first bulk OUT read. The UART TX DMA channel is *not*
    /// started here: the host's enumeration traffic must not leak onto
    /// the serial line, so the first TX starts lazily with the first
    /// received data packet.
    pub(crate) fn start<U: UsbEndpoints>(&mut self, usb: &mut U) {
        *self = Self::idle();
        usb.start_read(self.active, HOST_BUF_LEN);
    }

    /// A bulk OUT transfer finished with `len` bytes in the active buffer.
    pub(crate) fn on_receive_complete<D: DmaEngine, U: UsbEndpoints>(
        &mut self,
        dma: &mut D,
        usb: &mut U,
        status: TransferStatus,
        len: usize,
    ) {
        if status != TransferStatus::Completed || len == 0 {
            return;
        }
        self.active ^= 1;

        if !self.dma_busy {
            self.dma_busy = true;
            dma.start_tx(self.active ^ 1, len);
            // Receive the next packet into the other buffer right away.
            usb.start_read(self.active, HOST_BUF_LEN);
        } else {
            // The TX DMA completion handler picks this up.
            self.waiting = Some(len);
        }
    }

    /// The UART TX DMA channel drained a buffer.
    pub(crate) fn on_tx_dma_complete<D: DmaEngine, U: UsbEndpoints>(
        &mut self,
        dma: &mut D,
        usb: &mut U,
    ) {
        if let Some(len) = self.waiting.take() {
            dma.start_tx(self.active ^ 1, len);
            usb.start_read(self.active, HOST_BUF_LEN);
        } else {
            // The receive completion handler starts the next TX.
            self.dma_busy = false;
        }
    }
}
