use std::fmt;

use crate::constants::{IO_BANKS, MAX_SLOT, SLOTS_PER_BANK};
use crate::error::{Result, SessionError};

/// An IO slot coordinate: `device.io_bank` and `device.assign`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    pub bank: u8,
    pub index: u8,
}

impl Slot {
    /// Map a 1-based slot number (1..=16) to its bank/index coordinate.
    ///
    /// Slots 1-8 live in bank 0 and slots 9-16 in bank 1.
    pub fn from_number(number: u8) -> Result<Self> {
        if !(1..=MAX_SLOT).contains(&number) {
            return Err(SessionError::InvalidSlot(number));
        }
        let zero_based = number - 1;
        Ok(Self {
            bank: zero_based / SLOTS_PER_BANK,
            index: zero_based % SLOTS_PER_BANK,
        })
    }

    /// Build a slot from raw column values, if they name a valid position.
    pub fn from_columns(bank: i64, index: i64) -> Option<Self> {
        let bank = u8::try_from(bank).ok().filter(|b| *b < IO_BANKS)?;
        let index = u8::try_from(index).ok().filter(|i| *i < SLOTS_PER_BANK)?;
        Some(Self { bank, index })
    }

    /// The 1-based slot number shown to users.
    pub fn number(self) -> u8 {
        self.bank * SLOTS_PER_BANK + self.index + 1
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "slot {} (bank {}, io {})",
            self.number(),
            self.bank,
            self.index
        )
    }
}
