//! The bridge itself: shared state plus the ISR-callable entry points.
//!
//! Completion interrupts for USB transfers, the two DMA channels, and the
//! idle timer can nest and preempt each other, and every handler
//! read-modify-writes the per-direction flags. All state therefore lives
//! in a single [`critical_section::Mutex`], and every entry point runs
//! its whole transition, including the hardware start calls, inside one
//! interrupt-free region.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::control::{self, ControlReply, ControlRequest, RequestError};
use crate::device_to_host::DeviceToHost;
use crate::hal::{DmaEngine, IdleTimer, TransferStatus, UartPort, UsbEndpoints};
use crate::host_to_device::HostToDevice;
use crate::lifecycle::{transition, DeviceState, Transition};
use crate::line_coding::LineCoding;
use crate::monitor;

pub(crate) struct Inner<D, U, T, P> {
    pub(crate) dma: D,
    pub(crate) usb: U,
    pub(crate) timer: T,
    pub(crate) uart: P,
    pub(crate) host_to_device: HostToDevice,
    pub(crate) device_to_host: DeviceToHost,
    pub(crate) coding: LineCoding,
}

/// A USB CDC to UART bridge over injected hardware.
///
/// `Bridge` is `Sync` and designed to live in a `static`; every method
/// takes `&self` and may be called from interrupt context. The firmware
/// routes each completion interrupt to the matching `on_*` method and the
/// USB stack's class-request and state-change hooks to
/// [`handle_control_request`](Self::handle_control_request) and
/// [`on_device_state_change`](Self::on_device_state_change).
pub struct Bridge<D, U, T, P> {
    inner: Mutex<RefCell<Inner<D, U, T, P>>>,
}

impl<D, U, T, P> Bridge<D, U, T, P>
where
    D: DmaEngine,
    U: UsbEndpoints,
    T: IdleTimer,
    P: UartPort,
{
    /// Wrap the four hardware capabilities. Nothing is started until the
    /// device reaches [`DeviceState::Configured`].
    pub const fn new(dma: D, usb: U, timer: T, uart: P) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Inner {
                dma,
                usb,
                timer,
                uart,
                host_to_device: HostToDevice::idle(),
                device_to_host: DeviceToHost::idle(),
                coding: LineCoding::DEFAULT,
            })),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut Inner<D, U, T, P>) -> R) -> R {
        critical_section::with(|cs| f(&mut self.inner.borrow_ref_mut(cs)))
    }

    #[cfg(test)]
    pub(crate) fn inspect<R>(&self, f: impl FnOnce(&mut Inner<D, U, T, P>) -> R) -> R {
        self.with(f)
    }

    /// The USB device stack reported a state change.
    pub fn on_device_state_change(&self, old: DeviceState, new: DeviceState) {
        self.with(|inner| match transition(old, new) {
            Transition::Start => {
                info!("configured, starting bridge");
                let timeout_ms = monitor::flush_timeout_ms(inner.coding.baud_rate());
                inner.host_to_device.start(&mut inner.usb);
                inner
                    .device_to_host
                    .start(&mut inner.dma, &mut inner.timer, timeout_ms);
            }
            Transition::Stop => {
                info!("leaving configured, stopping bridge");
                inner.timer.stop();
                inner.dma.stop_rx();
                inner.dma.stop_tx();
                // Disarm the direction records too: a timer callback
                // queued before the stop may still be delivered, and it
                // must find nothing outstanding to act on.
                inner.host_to_device = HostToDevice::idle();
                inner.device_to_host = DeviceToHost::idle();
            }
            Transition::Ignore => {}
        });
    }

    /// A CDC class request arrived on the control endpoint.
    pub fn handle_control_request(
        &self,
        request: ControlRequest<'_>,
    ) -> Result<ControlReply, RequestError> {
        self.with(|inner| {
            let result = control::handle(&mut inner.coding, &mut inner.uart, request);
            if result.is_err() {
                warn!("control request rejected");
            }
            result
        })
    }

    /// The bulk OUT endpoint finished a transfer of `len` bytes.
    pub fn on_usb_receive_complete(&self, status: TransferStatus, len: usize) {
        self.with(|inner| {
            inner
                .host_to_device
                .on_receive_complete(&mut inner.dma, &mut inner.usb, status, len);
        });
    }

    /// The UART TX DMA channel finished draining a buffer.
    pub fn on_tx_dma_complete(&self) {
        self.with(|inner| {
            inner
                .host_to_device
                .on_tx_dma_complete(&mut inner.dma, &mut inner.usb);
        });
    }

    /// The UART RX DMA channel filled a buffer to the end.
    pub fn on_rx_dma_complete(&self) {
        self.with(|inner| {
            let timeout_ms = monitor::flush_timeout_ms(inner.coding.baud_rate());
            inner.device_to_host.on_rx_dma_complete(
                &mut inner.dma,
                &mut inner.usb,
                &mut inner.timer,
                timeout_ms,
            );
        });
    }

    /// The bulk IN endpoint finished a transfer.
    pub fn on_usb_transmit_complete(&self, status: TransferStatus) {
        self.with(|inner| {
            let timeout_ms = monitor::flush_timeout_ms(inner.coding.baud_rate());
            inner.device_to_host.on_transmit_complete(
                &mut inner.dma,
                &mut inner.usb,
                &mut inner.timer,
                status,
                timeout_ms,
            );
        });
    }

    /// The idle timer elapsed.
    pub fn on_idle_timeout(&self) {
        self.with(|inner| {
            let timeout_ms = monitor::flush_timeout_ms(inner.coding.baud_rate());
            monitor::on_tick(
                &mut inner.device_to_host,
                &mut inner.dma,
                &mut inner.usb,
                &mut inner.timer,
                timeout_ms,
            );
        });
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::testing::{DmaOp, MockDma, MockTimer, MockUart, MockUsb, UsbOp};
    use crate::{ControlLineState, DEVICE_BUF_LEN};

    type TestBridge = Bridge<MockDma, MockUsb, MockTimer, MockUart>;

    fn configured() -> TestBridge {
        let bridge = Bridge::new(
            MockDma::new(),
            MockUsb::new(),
            MockTimer::new(),
            MockUart::new(),
        );
        bridge.on_device_state_change(DeviceState::Unconfigured, DeviceState::Configured);
        bridge
    }

    #[test]
    fn configuration_arms_reception_but_no_uart_tx() {
        let bridge = configured();
        bridge.inspect(|inner| {
            assert_eq!(inner.usb.ops, [UsbOp::StartRead { index: 0, len: 64 }]);
            // Only the RX channel runs; TX waits for the first data
            // packet so enumeration traffic never hits the serial line.
            assert_eq!(inner.dma.ops, [DmaOp::StartRx { index: 0, len: 127 }]);
            assert!(inner.timer.running);
            assert_eq!(inner.timer.last_timeout_ms, 10); // 115200 baud
        });
    }

    #[test]
    fn out_packet_starts_uart_tx_and_rearms_out() {
        let bridge = configured();
        bridge.inspect(|inner| inner.usb.ops.clear());

        bridge.on_usb_receive_complete(TransferStatus::Completed, 64);
        bridge.inspect(|inner| {
            assert_eq!(inner.dma.ops.last(), Some(&DmaOp::StartTx { index: 0, len: 64 }));
            assert_eq!(inner.usb.ops, [UsbOp::StartRead { index: 1, len: 64 }]);
        });
    }

    #[test]
    fn suspend_stops_timer_and_both_channels() {
        let bridge = configured();
        bridge.inspect(|inner| inner.dma.ops.clear());

        bridge.on_device_state_change(DeviceState::Configured, DeviceState::Suspended);
        bridge.inspect(|inner| {
            assert!(!inner.timer.running);
            assert_eq!(inner.dma.ops, [DmaOp::StopRx, DmaOp::StopTx]);
        });
    }

    #[test]
    fn tick_after_suspend_leaves_everything_stopped() {
        let bridge = configured();

        // Bytes are mid-buffer and checkpointed when the bus suspends;
        // one more timer callback was already queued at that point.
        bridge.inspect(|inner| inner.dma.remaining = DEVICE_BUF_LEN - 10);
        bridge.on_idle_timeout();
        bridge.on_device_state_change(DeviceState::Configured, DeviceState::Suspended);
        bridge.inspect(|inner| {
            inner.dma.ops.clear();
            inner.usb.ops.clear();
        });

        bridge.on_idle_timeout();
        bridge.inspect(|inner| {
            assert!(inner.dma.ops.is_empty(), "RX DMA must stay stopped");
            assert!(inner.usb.ops.is_empty(), "no IN transfer while suspended");
            assert!(!inner.timer.running);
        });
    }

    #[test]
    fn resume_restarts_the_pipelines() {
        let bridge = configured();
        bridge.on_device_state_change(DeviceState::Configured, DeviceState::Suspended);
        bridge.inspect(|inner| {
            inner.dma.ops.clear();
            inner.usb.ops.clear();
        });

        bridge.on_device_state_change(DeviceState::Suspended, DeviceState::Configured);
        bridge.inspect(|inner| {
            assert_eq!(inner.usb.ops, [UsbOp::StartRead { index: 0, len: 64 }]);
            assert_eq!(inner.dma.ops, [DmaOp::StartRx { index: 0, len: 127 }]);
            assert!(inner.timer.running);
        });
    }

    #[test]
    fn ten_bytes_then_silence_reach_host_as_one_packet() {
        let bridge = configured();

        // 10 bytes trickle in, then the line goes quiet.
        bridge.inspect(|inner| inner.dma.remaining = DEVICE_BUF_LEN - 10);
        bridge.on_idle_timeout(); // checkpoint
        bridge.on_idle_timeout(); // unchanged: flush

        bridge.inspect(|inner| {
            let writes: std::vec::Vec<_> = inner
                .usb
                .ops
                .iter()
                .filter(|op| matches!(op, UsbOp::StartWrite { .. }))
                .collect();
            assert_eq!(writes, [&UsbOp::StartWrite { index: 0, len: 10 }]);
        });
    }

    #[test]
    fn accepted_line_coding_drives_the_idle_window() {
        let bridge = configured();

        // 300 baud, one stop bit, no parity, 8 data bits
        let reply = bridge
            .handle_control_request(ControlRequest::SetLineCoding(&[0x2C, 0x01, 0, 0, 0, 0, 8]));
        assert_eq!(reply, Ok(ControlReply::Accepted));
        bridge.inspect(|inner| {
            assert_eq!(inner.uart.configured.len(), 1);
            assert_eq!(inner.uart.configured[0].1, 300);
        });

        // The next timer arm uses the new rate: 50000 / 300 ms.
        bridge.on_rx_dma_complete();
        bridge.inspect(|inner| assert_eq!(inner.timer.last_timeout_ms, 166));
    }

    #[test]
    fn rejected_line_coding_changes_nothing() {
        let bridge = configured();

        // 9600 baud but stop-bits code 3.
        let reply = bridge
            .handle_control_request(ControlRequest::SetLineCoding(&[0x80, 0x25, 0, 0, 3, 0, 8]));
        assert!(reply.is_err());
        bridge.inspect(|inner| {
            assert!(inner.uart.configured.is_empty());
            assert_eq!(inner.coding, LineCoding::DEFAULT);
        });

        let reply = bridge.handle_control_request(ControlRequest::GetLineCoding);
        assert_eq!(
            reply,
            Ok(ControlReply::LineCoding([0x00, 0xC2, 0x01, 0x00, 0, 0, 8]))
        );
    }

    #[test]
    fn control_line_state_is_accepted() {
        let bridge = configured();
        let reply =
            bridge.handle_control_request(ControlRequest::SetControlLineState(
                ControlLineState::DTR,
            ));
        assert_eq!(reply, Ok(ControlReply::Accepted));
    }

    #[test]
    fn full_duplex_traffic_keeps_one_transfer_per_side() {
        let bridge = configured();

        // Host sends two packets back to back while the UART fills a
        // buffer; everything interleaves without a second outstanding
        // transfer on any side.
        bridge.on_usb_receive_complete(TransferStatus::Completed, 64);
        bridge.on_rx_dma_complete();
        bridge.on_usb_receive_complete(TransferStatus::Completed, 32);
        bridge.on_tx_dma_complete();
        bridge.on_usb_transmit_complete(TransferStatus::Completed);
        bridge.on_tx_dma_complete();

        bridge.inspect(|inner| {
            let tx: std::vec::Vec<_> = inner
                .dma
                .ops
                .iter()
                .filter_map(|op| match op {
                    DmaOp::StartTx { len, .. } => Some(*len),
                    _ => None,
                })
                .collect();
            assert_eq!(tx, [64, 32]);

            let writes: std::vec::Vec<_> = inner
                .usb
                .ops
                .iter()
                .filter_map(|op| match op {
                    UsbOp::StartWrite { len, .. } => Some(*len),
                    _ => None,
                })
                .collect();
            assert_eq!(writes, [127]);
        });
    }
}
