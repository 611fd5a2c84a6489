//! Conflict-checked registration of an SG Connect device in a session.
//!
//! A registration runs as one SQLite transaction:
//! 1. every host-owned SG Connect device is offered for removal,
//! 2. any device occupying the target slot is offered for removal,
//! 3. a new device/io-box pair is inserted with `id = MAX(device.id) + 1`.
//!
//! Every conflict is put to a [`ConflictDecider`]. Declining any of them drops the transaction,
//! which rolls back removals already made for earlier conflicts.

use std::fmt;
use std::path::Path;

use rusqlite::{params, Connection, TransactionBehavior};

use crate::address::MacAddress;
use crate::constants::{
    DEVICE_GENDER_IO, EMULATION_MODE_NONE, OWNERSHIP_LEVEL_HOST, OWNER_UUID_NONE,
    OWNER_UUID_SEPARATORS, SG_CONNECT_DESCRIPTION, SG_CONNECT_DEVICE_CLASS, SG_CONNECT_VENDOR_ID,
    SG_CONNECT_VERSION,
};
use crate::error::{Result, SessionError};
use crate::slot::Slot;
use crate::store::{owner_text, SessionStore};

/// A situation that needs the caller's permission before the session is modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    /// The session already holds an SG Connect device owned by the session host.
    HostDevicePresent { device_id: i64 },
    /// The target slot is occupied.
    SlotOccupied { slot: Slot, device_ids: Vec<i64> },
}

impl Conflict {
    /// Yes/no question to put to a user.
    pub fn prompt(&self) -> &'static str {
        match self {
            Conflict::HostDevicePresent { .. } => {
                "Session already contains host Local Device. Remove it and continue?"
            }
            Conflict::SlotOccupied { .. } => {
                "Session already contains device in the selected slot. Replace it and continue?"
            }
        }
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conflict::HostDevicePresent { device_id } => {
                write!(f, "host-owned SG Connect device present (id {device_id})")
            }
            Conflict::SlotOccupied { slot, device_ids } => {
                write!(f, "{slot} occupied by device id(s) {device_ids:?}")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    Abort,
}

/// Source of conflict decisions, typically a user prompt.
pub trait ConflictDecider {
    fn decide(&mut self, conflict: &Conflict) -> Decision;
}

impl<F> ConflictDecider for F
where
    F: FnMut(&Conflict) -> Decision,
{
    fn decide(&mut self, conflict: &Conflict) -> Decision {
        self(conflict)
    }
}

/// The device to register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceRegistration {
    pub address: MacAddress,
    pub slot: Slot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// The new pair was committed. `removed` lists device ids deleted to resolve conflicts.
    Registered { id: i64, removed: Vec<i64> },
    /// A conflict was declined; the session is unchanged.
    Aborted(Conflict),
}

/// Whether an `owner_uuid` is the all-zero "owned by the session host" sentinel.
///
/// Colons, commas and spaces are ignored, so `"00:00:..."`, `"0000..."` and `"00, 00, ..."` all
/// qualify.
pub fn is_host_owner(owner_uuid: &str) -> bool {
    owner_uuid
        .chars()
        .filter(|c| !OWNER_UUID_SEPARATORS.contains(c))
        .all(|c| c == '0')
}

/// Register an SG Connect device at `registration.slot`, resolving conflicts through `decider`.
///
/// Either the whole registration (removals included) is committed or nothing is.
pub fn apply_device_registration<D>(
    store: &mut SessionStore,
    registration: DeviceRegistration,
    decider: &mut D,
) -> Result<RegistrationOutcome>
where
    D: ConflictDecider + ?Sized,
{
    let tx = store
        .conn
        .transaction_with_behavior(TransactionBehavior::Immediate)?;
    let mut removed = Vec::new();

    for device_id in host_owned_devices(&tx)? {
        let conflict = Conflict::HostDevicePresent { device_id };
        if decider.decide(&conflict) == Decision::Abort {
            tracing::warn!(%conflict, "registration declined; rolling back");
            return Ok(RegistrationOutcome::Aborted(conflict));
        }
        remove_host_device(&tx, device_id)?;
        tracing::info!(device_id, "removed host-owned SG Connect device");
        removed.push(device_id);
    }

    let slot = registration.slot;
    let occupants = slot_occupants(&tx, slot)?;
    if !occupants.is_empty() {
        let conflict = Conflict::SlotOccupied {
            slot,
            device_ids: occupants.clone(),
        };
        if decider.decide(&conflict) == Decision::Abort {
            tracing::warn!(%conflict, "registration declined; rolling back");
            return Ok(RegistrationOutcome::Aborted(conflict));
        }
        for device_id in occupants {
            remove_device(&tx, device_id)?;
            tracing::info!(device_id, %slot, "removed device occupying target slot");
            removed.push(device_id);
        }
    }

    let id = next_device_id(&tx)?;
    insert_device_pair(&tx, id, registration)?;
    tx.commit()?;

    tracing::info!(
        id,
        mac = %registration.address,
        %slot,
        "registered SG Connect device"
    );
    Ok(RegistrationOutcome::Registered { id, removed })
}

/// Open the session at `path`, apply the registration and close the session again.
pub fn register_device<D>(
    path: &Path,
    registration: DeviceRegistration,
    decider: &mut D,
) -> Result<RegistrationOutcome>
where
    D: ConflictDecider + ?Sized,
{
    let mut store = SessionStore::open(path)?;
    let outcome = apply_device_registration(&mut store, registration, decider)?;
    store.close()?;
    Ok(outcome)
}

/// Ids of SG Connect devices whose owner is the session host.
fn host_owned_devices(conn: &Connection) -> Result<Vec<i64>> {
    let family_ids = {
        let mut stmt = conn.prepare(
            "SELECT device.id
             FROM device
             JOIN device_iobox ON device.id = device_iobox.id
             WHERE device_iobox.device_id = ?1 AND device_iobox.vendor_id = ?2
             ORDER BY device.id",
        )?;
        let rows = stmt.query_map(params![SG_CONNECT_DEVICE_CLASS, SG_CONNECT_VENDOR_ID], |row| {
            row.get::<_, i64>(0)
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>()?
    };
    tracing::debug!(count = family_ids.len(), "found SG Connect devices");

    let mut host_owned = Vec::new();
    for device_id in family_ids {
        let owner = conn.query_row(
            "SELECT owner_uuid FROM device WHERE id = ?1",
            [device_id],
            |row| Ok(owner_text(row.get_ref(0)?)),
        )?;
        match owner {
            Some(owner) if is_host_owner(&owner) => host_owned.push(device_id),
            owner => tracing::debug!(device_id, ?owner, "SG Connect device has a remote owner"),
        }
    }
    Ok(host_owned)
}

fn slot_occupants(conn: &Connection, slot: Slot) -> Result<Vec<i64>> {
    let mut stmt =
        conn.prepare("SELECT id FROM device WHERE io_bank = ?1 AND assign = ?2 ORDER BY id")?;
    let rows = stmt.query_map(params![slot.bank, slot.index], |row| row.get::<_, i64>(0))?;
    let ids = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    tracing::debug!(%slot, occupants = ?ids, "checked target slot");
    Ok(ids)
}

fn remove_host_device(conn: &Connection, device_id: i64) -> Result<()> {
    conn.execute(
        "DELETE FROM device_iobox WHERE id = ?1 AND device_id = ?2 AND vendor_id = ?3",
        params![device_id, SG_CONNECT_DEVICE_CLASS, SG_CONNECT_VENDOR_ID],
    )?;
    conn.execute("DELETE FROM device WHERE id = ?1", [device_id])?;
    Ok(())
}

fn remove_device(conn: &Connection, device_id: i64) -> Result<()> {
    conn.execute("DELETE FROM device_iobox WHERE id = ?1", [device_id])?;
    conn.execute("DELETE FROM device WHERE id = ?1", [device_id])?;
    Ok(())
}

fn next_device_id(conn: &Connection) -> Result<i64> {
    let max: Option<i64> = conn.query_row("SELECT MAX(id) FROM device", [], |row| row.get(0))?;
    let max = max.unwrap_or(0);
    max.checked_add(1).ok_or(SessionError::IdSpaceExhausted(max))
}

fn insert_device_pair(conn: &Connection, id: i64, registration: DeviceRegistration) -> Result<()> {
    conn.execute(
        "INSERT INTO device(
            id, device_gender, mac, io_bank, assign, version, description,
            in_channel_count, out_channel_count, max_in_channel_count, max_out_channel_count,
            owner_uuid, ownership_level, is_share_preamp, is_golden_box, golden_box_id
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, 0, 0, 0, ?8, ?9, 0, 0, 0)",
        params![
            id,
            DEVICE_GENDER_IO,
            registration.address.as_sql(),
            registration.slot.bank,
            registration.slot.index,
            SG_CONNECT_VERSION,
            SG_CONNECT_DESCRIPTION,
            OWNER_UUID_NONE,
            OWNERSHIP_LEVEL_HOST,
        ],
    )?;
    conn.execute(
        "INSERT INTO device_iobox(
            id, boot_version, device_id, vendor_id, emulation_mode, midi_capable, assigned_to_midi
        ) VALUES (?1, ?2, ?3, ?4, ?5, 0, 0)",
        params![
            id,
            SG_CONNECT_VERSION,
            SG_CONNECT_DEVICE_CLASS,
            SG_CONNECT_VENDOR_ID,
            EMULATION_MODE_NONE,
        ],
    )?;
    Ok(())
}
