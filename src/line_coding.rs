//! The CDC line-coding structure and its validation.
//!
//! Line coding travels between host and device as a packed 7-byte
//! structure: a 4-byte little-endian baud rate followed by one byte each
//! for stop bits, parity, and data bits. The raw encoding is kept as
//! received ([`LineCoding`]); [`LineCoding::frame`] validates it into a
//! typed [`FrameFormat`] that the UART can be programmed from.

/// Wire size of the line-coding structure.
pub const LINE_CODING_LEN: usize = 7;

/// Serial port settings as exchanged with the host.
///
/// Field encodings follow the CDC specification: stop bits `0`=1, `1`=1.5,
/// `2`=2; parity `0`=none, `1`=odd, `2`=even, `3`=mark, `4`=space; data
/// bits one of 5, 6, 7, 8 or 16.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineCoding {
    baud_rate: u32,
    stop_bits: u8,
    parity: u8,
    data_bits: u8,
}

impl LineCoding {
    /// The power-on configuration: 115200 baud, 8 data bits, no parity,
    /// one stop bit.
    pub const DEFAULT: Self = Self {
        baud_rate: 115_200,
        stop_bits: 0,
        parity: 0,
        data_bits: 8,
    };

    /// Decode the 7-byte wire representation. Returns `None` when `bytes`
    /// is not exactly [`LINE_CODING_LEN`] long.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != LINE_CODING_LEN {
            return None;
        }
        Some(Self {
            baud_rate: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            stop_bits: bytes[4],
            parity: bytes[5],
            data_bits: bytes[6],
        })
    }

    /// Encode into the 7-byte wire representation.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; LINE_CODING_LEN] {
        let baud = self.baud_rate.to_le_bytes();
        [
            baud[0],
            baud[1],
            baud[2],
            baud[3],
            self.stop_bits,
            self.parity,
            self.data_bits,
        ]
    }

    /// Configured baud rate in bits per second.
    #[must_use]
    pub const fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    /// Validate every field, producing the frame format to program into
    /// the UART. Mark and space parity are not supported by the port and
    /// are rejected along with out-of-range values.
    pub fn frame(&self) -> Result<FrameFormat, CodingError> {
        if self.baud_rate == 0 {
            return Err(CodingError::BaudRate);
        }
        let data_bits = match self.data_bits {
            5 => DataBits::Five,
            6 => DataBits::Six,
            7 => DataBits::Seven,
            8 => DataBits::Eight,
            16 => DataBits::Sixteen,
            _ => return Err(CodingError::DataBits),
        };
        let parity = match self.parity {
            0 => Parity::None,
            1 => Parity::Odd,
            2 => Parity::Even,
            _ => return Err(CodingError::Parity),
        };
        let stop_bits = match self.stop_bits {
            0 => StopBits::One,
            1 => StopBits::OneAndHalf,
            2 => StopBits::Two,
            _ => return Err(CodingError::StopBits),
        };
        Ok(FrameFormat {
            data_bits,
            parity,
            stop_bits,
        })
    }
}

impl Default for LineCoding {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A fully validated UART frame format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameFormat {
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
}

/// Data bits per UART character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
    Sixteen,
}

/// UART parity mode. Mark and space are rejected before reaching here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Odd,
    Even,
}

/// UART stop-bit length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    OneAndHalf,
    Two,
}

/// The line-coding field an unsupported value was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodingError {
    BaudRate,
    DataBits,
    Parity,
    StopBits,
}
