//! Offline patching of Waves eMotion LV1 session files.
//!
//! A session (`.emo`) is a SQLite database describing the console's device inventory. This crate
//! registers an SG Connect virtual IO device in such a session at a chosen IO slot, using a host
//! network interface's MAC address as the device address.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use emo_session::{register_device, resolve_address, Conflict, Decision, DeviceRegistration, Slot};
//!
//! # fn main() -> emo_session::Result<()> {
//! let registration = DeviceRegistration {
//!     address: resolve_address("Intel(R) Ethernet (00:1A:2B:3C:4D:5E)")?,
//!     slot: Slot::from_number(9)?,
//! };
//! let mut replace_all = |_: &Conflict| Decision::Proceed;
//! register_device(Path::new("show.emo"), registration, &mut replace_all)?;
//! # Ok(())
//! # }
//! ```

pub mod constants;

mod address;
mod error;
mod file;
mod mutate;
mod slot;
mod store;

pub use address::{interface_descriptor, resolve_address, MacAddress, MAC_ADDRESS_MAX};
pub use error::{Result, SessionError};
pub use file::{backup_session, copy_session, BACKUP_EXTENSION};
pub use mutate::{
    apply_device_registration, is_host_owner, register_device, Conflict, ConflictDecider, Decision,
    DeviceRegistration, RegistrationOutcome,
};
pub use slot::Slot;
pub use store::{DeviceEntry, SessionStore};
