#![allow(dead_code)]

use std::path::Path;

use rusqlite::types::Value;
use rusqlite::{params, Connection};

pub const HOST_OWNER: &str = "00:00:00:00:00:00:00:00:00:00:00:00:00:00:00:00:";
pub const REMOTE_OWNER: &str = "3f:9a:11:02:00:00:00:00:00:00:00:00:00:00:00:01:";

/// Device class tag of a physical SoundGrid IO (anything other than 97).
pub const PHYSICAL_IO_CLASS: i64 = 12;

const SCHEMA: &str = "
CREATE TABLE device (
    id INTEGER PRIMARY KEY,
    device_gender INTEGER,
    mac INTEGER,
    io_bank INTEGER,
    assign INTEGER,
    version TEXT,
    description TEXT,
    in_channel_count INTEGER,
    out_channel_count INTEGER,
    max_in_channel_count INTEGER,
    max_out_channel_count INTEGER,
    owner_uuid TEXT,
    ownership_level INTEGER,
    is_share_preamp INTEGER,
    is_golden_box INTEGER,
    golden_box_id INTEGER
);
CREATE TABLE device_iobox (
    id INTEGER PRIMARY KEY,
    boot_version TEXT,
    device_id INTEGER,
    vendor_id INTEGER,
    emulation_mode INTEGER,
    midi_capable INTEGER,
    assigned_to_midi INTEGER
);
CREATE TABLE session_info (key TEXT PRIMARY KEY, value TEXT);
INSERT INTO session_info VALUES ('name', 'fixture');
";

#[derive(Debug, Clone)]
pub struct FixtureDevice {
    pub id: i64,
    pub bank: i64,
    pub assign: i64,
    pub owner_uuid: &'static str,
    pub device_class: i64,
    pub vendor_id: i64,
}

impl FixtureDevice {
    /// A physical IO rack owned by a remote console.
    pub fn physical(id: i64, bank: i64, assign: i64) -> Self {
        Self {
            id,
            bank,
            assign,
            owner_uuid: REMOTE_OWNER,
            device_class: PHYSICAL_IO_CLASS,
            vendor_id: 0,
        }
    }

    /// An SG Connect device owned by the session host.
    pub fn host_sg_connect(id: i64, bank: i64, assign: i64, owner_uuid: &'static str) -> Self {
        Self {
            id,
            bank,
            assign,
            owner_uuid,
            device_class: 97,
            vendor_id: 0,
        }
    }
}

pub fn create_session(path: &Path, devices: &[FixtureDevice]) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(SCHEMA).unwrap();
    for device in devices {
        insert_device(&conn, device);
    }
}

pub fn insert_device(conn: &Connection, device: &FixtureDevice) {
    conn.execute(
        "INSERT INTO device VALUES (?1, 0, ?2, ?3, ?4, '2.0.4', 'Fixture IO', 32, 32, 64, 64, ?5, 1, 0, 0, 0)",
        params![
            device.id,
            0x0090_0000_0000_i64.wrapping_add(device.id),
            device.bank,
            device.assign,
            device.owner_uuid
        ],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO device_iobox VALUES (?1, '2.0.4', ?2, ?3, 0, 1, 0)",
        params![device.id, device.device_class, device.vendor_id],
    )
    .unwrap();
}

pub type TableRows = Vec<Vec<Value>>;

fn dump_table(conn: &Connection, table: &str) -> TableRows {
    let mut stmt = conn
        .prepare(&format!("SELECT * FROM {table} ORDER BY id"))
        .unwrap();
    let columns = stmt.column_count();
    stmt.query_map([], |row| {
        (0..columns)
            .map(|i| row.get::<_, Value>(i))
            .collect::<rusqlite::Result<Vec<_>>>()
    })
    .unwrap()
    .collect::<rusqlite::Result<Vec<_>>>()
    .unwrap()
}

/// Full contents of the `device` and `device_iobox` tables.
pub fn snapshot(path: &Path) -> (TableRows, TableRows) {
    let conn = Connection::open(path).unwrap();
    (dump_table(&conn, "device"), dump_table(&conn, "device_iobox"))
}

pub fn device_ids(path: &Path) -> Vec<i64> {
    let conn = Connection::open(path).unwrap();
    let mut stmt = conn.prepare("SELECT id FROM device ORDER BY id").unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<rusqlite::Result<Vec<_>>>()
        .unwrap()
}

pub fn iobox_ids(path: &Path) -> Vec<i64> {
    let conn = Connection::open(path).unwrap();
    let mut stmt = conn
        .prepare("SELECT id FROM device_iobox ORDER BY id")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<rusqlite::Result<Vec<_>>>()
        .unwrap()
}
