//! Mock hardware shared by the unit tests.

extern crate std;

use std::vec::Vec;

use crate::hal::{DmaEngine, IdleTimer, UartPort, UsbEndpoints};
use crate::line_coding::FrameFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DmaOp {
    StartTx { index: usize, len: usize },
    StartRx { index: usize, len: usize },
    StopTx,
    StopRx,
}

/// Records channel operations; `remaining` is what the RX channel reports.
pub(crate) struct MockDma {
    pub(crate) ops: Vec<DmaOp>,
    pub(crate) remaining: usize,
}

impl MockDma {
    pub(crate) fn new() -> Self {
        Self {
            ops: Vec::new(),
            remaining: 0,
        }
    }
}

impl DmaEngine for MockDma {
    fn start_tx(&mut self, index: usize, len: usize) {
        self.ops.push(DmaOp::StartTx { index, len });
    }

    fn start_rx(&mut self, index: usize, len: usize) {
        self.ops.push(DmaOp::StartRx { index, len });
    }

    fn stop_tx(&mut self) {
        self.ops.push(DmaOp::StopTx);
    }

    fn stop_rx(&mut self) {
        self.ops.push(DmaOp::StopRx);
    }

    fn rx_remaining(&self) -> usize {
        self.remaining
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UsbOp {
    StartRead { index: usize, len: usize },
    StartWrite { index: usize, len: usize },
}

pub(crate) struct MockUsb {
    pub(crate) ops: Vec<UsbOp>,
}

impl MockUsb {
    pub(crate) fn new() -> Self {
        Self { ops: Vec::new() }
    }
}

impl UsbEndpoints for MockUsb {
    fn start_read(&mut self, index: usize, len: usize) {
        self.ops.push(UsbOp::StartRead { index, len });
    }

    fn start_write(&mut self, index: usize, len: usize) {
        self.ops.push(UsbOp::StartWrite { index, len });
    }
}

pub(crate) struct MockTimer {
    pub(crate) running: bool,
    pub(crate) starts: u32,
    pub(crate) last_timeout_ms: u32,
}

impl MockTimer {
    pub(crate) fn new() -> Self {
        Self {
            running: false,
            starts: 0,
            last_timeout_ms: 0,
        }
    }
}

impl IdleTimer for MockTimer {
    fn start(&mut self, timeout_ms: u32) {
        self.running = true;
        self.starts += 1;
        self.last_timeout_ms = timeout_ms;
    }

    fn stop(&mut self) {
        self.running = false;
    }
}

pub(crate) struct MockUart {
    pub(crate) configured: Vec<(FrameFormat, u32)>,
}

impl MockUart {
    pub(crate) fn new() -> Self {
        Self {
            configured: Vec::new(),
        }
    }
}

impl UartPort for MockUart {
    fn configure(&mut self, frame: FrameFormat, baud_rate: u32) {
        self.configured.push((frame, baud_rate));
    }
}
