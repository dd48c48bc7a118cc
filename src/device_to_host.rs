//! The device-to-host pipeline: UART RX to bulk IN.
//!
//! Two 127-byte buffers ping-pong between the UART RX DMA channel
//! (filling) and the bulk IN endpoint (draining). A buffer normally hands
//! over when the DMA transfer runs to its end; the idle-flush monitor can
//! also force an early handover by stopping the channel mid-transfer, in
//! which case the valid byte count is recovered from the channel's
//! remaining count.
//!
//! While a bulk IN transfer is in flight and a second buffer has already
//! filled, the RX channel stays parked: the UART side has nowhere to put
//! more data until the host catches up.

use crate::hal::{DmaEngine, IdleTimer, TransferStatus, UsbEndpoints};
use crate::{BULK_MAX_PACKET_SIZE, DEVICE_BUF_LEN};

/// Per-direction state record for device-to-host traffic.
#[derive(Debug)]
pub(crate) struct DeviceToHost {
    /// A bulk IN transfer is outstanding.
    write_busy: bool,
    /// A UART RX DMA transfer is outstanding.
    pub(crate) dma_armed: bool,
    /// Whether the most recent RX handover was a natural full-buffer
    /// completion. Cleared by the monitor before a forced handover so the
    /// byte count is recomputed from the channel's remaining count.
    pub(crate) ran_to_end: bool,
    /// Index of the buffer the RX channel fills.
    active: usize,
    /// Bytes observed in the filling buffer at the last checkpoint, or
    /// the valid byte count of a filled buffer parked while the IN
    /// endpoint is busy.
    pub(crate) count: usize,
    /// Length of the most recent bulk IN submission, for the
    /// zero-length-packet rule.
    pub(crate) last_write: usize,
}

impl DeviceToHost {
    pub(crate) const fn idle() -> Self {
        Self {
            write_busy: false,
            dma_armed: false,
            ran_to_end: false,
            active: 0,
            count: 0,
            last_write: 0,
        }
    }

    /// Start the first UART RX transfer and the idle timer.
    pub(crate) fn start<D: DmaEngine, T: IdleTimer>(
        &mut self,
        dma: &mut D,
        timer: &mut T,
        timeout_ms: u32,
    ) {
        *self = Self::idle();
        self.dma_armed = true;
        self.ran_to_end = true;
        dma.start_rx(self.active, DEVICE_BUF_LEN);
        timer.start(timeout_ms);
    }

    /// The RX channel handed over a buffer, either by running to its end
    /// or because the monitor force-stopped it.
    pub(crate) fn on_rx_dma_complete<D: DmaEngine, U: UsbEndpoints, T: IdleTimer>(
        &mut self,
        dma: &mut D,
        usb: &mut U,
        timer: &mut T,
        timeout_ms: u32,
    ) {
        self.active ^= 1;
        self.count = if self.ran_to_end {
            DEVICE_BUF_LEN
        } else {
            DEVICE_BUF_LEN - dma.rx_remaining()
        };

        if !self.write_busy {
            self.write_busy = true;
            self.submit_and_rearm(dma, usb, timer, timeout_ms);
        } else {
            // The IN completion handler restarts reception; until then
            // the UART side is paused. Timer off per invariant: it runs
            // only while an RX transfer is outstanding.
            self.dma_armed = false;
            timer.stop();
        }
    }

    /// A bulk IN transfer reached the host.
    pub(crate) fn on_transmit_complete<D: DmaEngine, U: UsbEndpoints, T: IdleTimer>(
        &mut self,
        dma: &mut D,
        usb: &mut U,
        timer: &mut T,
        status: TransferStatus,
        timeout_ms: u32,
    ) {
        if status != TransferStatus::Completed {
            return;
        }
        if !self.dma_armed {
            // A filled buffer is parked; send it and resume reception.
            self.dma_armed = true;
            self.submit_and_rearm(dma, usb, timer, timeout_ms);
        } else {
            self.write_busy = false;
        }
    }

    /// Submit `buffers[active ^ 1]` (`count` valid bytes) on the IN
    /// endpoint and restart reception into the freed buffer.
    fn submit_and_rearm<D: DmaEngine, U: UsbEndpoints, T: IdleTimer>(
        &mut self,
        dma: &mut D,
        usb: &mut U,
        timer: &mut T,
        timeout_ms: u32,
    ) {
        usb.start_write(self.active ^ 1, self.count);
        self.last_write = self.count;

        self.ran_to_end = true;
        dma.start_rx(self.active, DEVICE_BUF_LEN);
        self.count = 0;
        timer.start(timeout_ms);
    }

    /// Whether the previous IN packet was exactly the bulk maximum, which
    /// obliges a zero-length packet once the line goes idle.
    pub(crate) fn needs_zlp(&self) -> bool {
        self.last_write == BULK_MAX_PACKET_SIZE
    }
}
