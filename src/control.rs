//! CDC class control requests.
//!
//! Three class requests are recognized on the control interface: *get
//! line coding*, *set line coding*, and *set control line state*. Anything
//! else is the USB stack's problem and never reaches this module.

use bitflags::bitflags;

use crate::hal::UartPort;
use crate::line_coding::{CodingError, LineCoding, LINE_CODING_LEN};

/// A recognized class request, already stripped of its setup-packet
/// framing by the USB stack glue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlRequest<'a> {
    /// Host asks for the current line coding (7-byte data stage, IN).
    GetLineCoding,
    /// Host sets a new line coding; carries the 7-byte data stage as
    /// received.
    SetLineCoding(&'a [u8]),
    /// Host asserts or deasserts the virtual DTR/RTS lines.
    SetControlLineState(ControlLineState),
}

bitflags! {
    /// Payload of *set control line state*.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ControlLineState: u16 {
        /// Data Terminal Ready.
        const DTR = 1 << 0;
        /// Request To Send.
        const RTS = 1 << 1;
    }
}

/// Successful outcome of a control request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlReply {
    /// Request accepted, nothing to return.
    Accepted,
    /// Current line coding to send back to the host.
    LineCoding([u8; LINE_CODING_LEN]),
}

/// A rejected control request. Surfaced to the host as a request failure;
/// the UART keeps its last accepted configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestError {
    /// The data stage did not have the expected shape.
    Malformed,
    /// A line-coding field carried an unsupported value.
    Coding(CodingError),
}

impl From<CodingError> for RequestError {
    fn from(err: CodingError) -> Self {
        RequestError::Coding(err)
    }
}

/// Dispatch a control request against the stored line coding.
///
/// The UART is reprogrammed only after every field of a new coding has
/// validated; a rejected request leaves both the stored coding and the
/// UART untouched.
pub(crate) fn handle<P: UartPort>(
    current: &mut LineCoding,
    uart: &mut P,
    request: ControlRequest<'_>,
) -> Result<ControlReply, RequestError> {
    match request {
        ControlRequest::GetLineCoding => Ok(ControlReply::LineCoding(current.to_bytes())),
        ControlRequest::SetLineCoding(bytes) => {
            let coding = LineCoding::from_bytes(bytes).ok_or(RequestError::Malformed)?;
            let frame = coding.frame()?;
            uart.configure(frame, coding.baud_rate());
            *current = coding;
            info!("line coding set: {} baud", coding.baud_rate());
            Ok(ControlReply::Accepted)
        }
        // Nothing to drive: the bridge has no physical DTR/RTS outputs.
        ControlRequest::SetControlLineState(_) => Ok(ControlReply::Accepted),
    }
}
