//! Idle-flush monitoring of the UART RX channel.
//!
//! A buffer only hands over naturally once all 127 bytes have arrived,
//! which with intermittent traffic (someone typing into a terminal) could
//! take forever. The monitor samples the RX channel on a timer tick sized
//! to roughly five character times at the current baud rate and forces an
//! early handover when the line has gone quiet, so partial buffers reach
//! the host with bounded latency. It is also responsible for closing out
//! a host transfer with a zero-length packet when the last packet sent
//! was exactly the bulk maximum.

use crate::device_to_host::DeviceToHost;
use crate::hal::{DmaEngine, IdleTimer, UsbEndpoints};
use crate::DEVICE_BUF_LEN;

/// Idle timeout in milliseconds for a given baud rate: five 10-bit
/// character times, floored at 10 ms so flushing always eventually
/// triggers regardless of the configured rate.
pub(crate) fn flush_timeout_ms(baud_rate: u32) -> u32 {
    (50_000 / baud_rate).max(10)
}

/// One monitor tick.
///
/// Stopping the channel marks the handover as forced so that
/// [`DeviceToHost::on_rx_dma_complete`] recovers the byte count from the
/// channel's remaining count instead of assuming a full buffer.
pub(crate) fn on_tick<D: DmaEngine, U: UsbEndpoints, T: IdleTimer>(
    d2h: &mut DeviceToHost,
    dma: &mut D,
    usb: &mut U,
    timer: &mut T,
    timeout_ms: u32,
) {
    // A tick queued before timer.stop() may still be delivered; the
    // channel is parked then and there is nothing to sample.
    if !d2h.dma_armed {
        return;
    }

    let received = DEVICE_BUF_LEN - dma.rx_remaining();

    if received == 0 && d2h.needs_zlp() {
        // Quiet line after a max-size packet: the host's transfer is
        // still open and needs a zero-length packet to terminate.
        debug!("uart idle, closing host transfer with ZLP");
        force_handover(d2h, dma, usb, timer, timeout_ms);
        return;
    }

    if received > 0 && received == d2h.count {
        // Bytes arrived but none since the previous tick: flush the
        // partial buffer.
        debug!("uart idle, flushing {} bytes", received);
        force_handover(d2h, dma, usb, timer, timeout_ms);
        return;
    }

    // Data is still trickling in; checkpoint and keep watching.
    d2h.count = received;
    timer.start(timeout_ms);
}

fn force_handover<D: DmaEngine, U: UsbEndpoints, T: IdleTimer>(
    d2h: &mut DeviceToHost,
    dma: &mut D,
    usb: &mut U,
    timer: &mut T,
    timeout_ms: u32,
) {
    dma.stop_rx();
    d2h.ran_to_end = false;
    d2h.on_rx_dma_complete(dma, usb, timer, timeout_ms);
}
