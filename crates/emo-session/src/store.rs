//! Access to the SQLite database inside an eMotion session file.

use std::path::{Path, PathBuf};

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, OptionalExtension};

use crate::constants::{TABLE_DEVICE, TABLE_DEVICE_IOBOX};
use crate::error::{Result, SessionError};
use crate::slot::Slot;

/// An open session file.
///
/// The connection is exclusively owned; dropping the store closes it.
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    pub(crate) conn: Connection,
}

/// A device row joined with its io-box row, as listed by [`SessionStore::devices`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEntry {
    pub id: i64,
    pub io_bank: i64,
    pub assign: i64,
    pub mac: Option<i64>,
    pub description: Option<String>,
    pub owner_uuid: Option<String>,
    /// `device_iobox.device_id` (device-class tag), `None` if the io-box row is missing.
    pub device_class: Option<i64>,
    pub vendor_id: Option<i64>,
}

impl DeviceEntry {
    pub fn slot(&self) -> Option<Slot> {
        Slot::from_columns(self.io_bank, self.assign)
    }
}

impl SessionStore {
    /// Open an existing session file for modification.
    ///
    /// Never creates a file: a missing path is reported as [`SessionError::StoreUnavailable`]
    /// rather than silently producing an empty database.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| SessionError::StoreUnavailable {
            path: path.to_path_buf(),
            source,
        })?;

        let store = Self {
            path: path.to_path_buf(),
            conn,
        };
        store.verify_schema()?;
        tracing::debug!(path = %path.display(), "opened session store");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn verify_schema(&self) -> Result<()> {
        for table in [TABLE_DEVICE, TABLE_DEVICE_IOBOX] {
            let found = self
                .conn
                .query_row(
                    "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [table],
                    |_| Ok(()),
                )
                .optional()?;
            if found.is_none() {
                return Err(SessionError::MissingTable(table));
            }
        }
        Ok(())
    }

    /// All device rows, ordered by id.
    pub fn devices(&self) -> Result<Vec<DeviceEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT device.id, device.io_bank, device.assign, device.mac, device.description,
                    device.owner_uuid, device_iobox.device_id, device_iobox.vendor_id
             FROM device
             LEFT JOIN device_iobox ON device.id = device_iobox.id
             ORDER BY device.id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(DeviceEntry {
                id: row.get(0)?,
                io_bank: row.get(1)?,
                assign: row.get(2)?,
                mac: row.get(3)?,
                description: row.get(4)?,
                owner_uuid: owner_text(row.get_ref(5)?),
                device_class: row.get(6)?,
                vendor_id: row.get(7)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Close the connection, reporting any error SQLite raises while doing so.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, err)| SessionError::from(err))
    }
}

/// Render an `owner_uuid` cell as text.
///
/// Sessions normally store text, but integer/real cells are accepted and rendered as their
/// decimal form. NULL and BLOB cells have no textual owner.
pub(crate) fn owner_text(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null | ValueRef::Blob(_) => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(r) => Some(format!("{r:?}")),
        ValueRef::Text(t) => Some(String::from_utf8_lossy(t).into_owned()),
    }
}
