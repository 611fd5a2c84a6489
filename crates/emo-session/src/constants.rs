//! Sentinel values and fixed field contents used by eMotion session files.
//!
//! The session format is undocumented. These values were observed in sessions produced by the
//! console software and must be written back verbatim for the device to be recognised.

// --- Tables ---

/// Device inventory table (one row per hardware or virtual device).
pub const TABLE_DEVICE: &str = "device";

/// IO-box table, paired 1:1 with `device` by `id`.
pub const TABLE_DEVICE_IOBOX: &str = "device_iobox";

// --- Device family tagging ---
//
// `device_iobox.device_id` is not a foreign key into `device.id`. It is a device-class tag, and
// together with `vendor_id` it identifies the SoundGrid Connect virtual IO family.

/// `device_iobox.device_id` value identifying an SG Connect virtual IO device.
pub const SG_CONNECT_DEVICE_CLASS: i64 = 97;

/// `device_iobox.vendor_id` value for the SG Connect family.
pub const SG_CONNECT_VENDOR_ID: i64 = 0;

// --- Ownership ---

/// `device.owner_uuid` written for new devices: "no remote owner", i.e. owned by the session host.
///
/// Sixteen zero bytes, each followed by a colon (including the last one).
pub const OWNER_UUID_NONE: &str = "00:00:00:00:00:00:00:00:00:00:00:00:00:00:00:00:";

/// Separators ignored when deciding whether an `owner_uuid` is the all-zero host sentinel.
pub const OWNER_UUID_SEPARATORS: [char; 3] = [':', ',', ' '];

/// `device.ownership_level` for a host-resident SG Connect device.
pub const OWNERSHIP_LEVEL_HOST: i64 = 3;

// --- Fixed device fields ---

/// Firmware version reported for the virtual device (`device.version`, `device_iobox.boot_version`).
pub const SG_CONNECT_VERSION: &str = "1.1.1";

/// `device.description` shown by the console for the virtual device.
pub const SG_CONNECT_DESCRIPTION: &str = "SG Connect";

/// `device.device_gender` for a plain IO device.
pub const DEVICE_GENDER_IO: i64 = 0;

/// `device_iobox.emulation_mode` meaning "not emulated".
pub const EMULATION_MODE_NONE: i64 = -1;

// --- Slots ---

/// Number of IO banks in a session.
pub const IO_BANKS: u8 = 2;

/// Number of device positions (`device.assign`) in one bank.
pub const SLOTS_PER_BANK: u8 = 8;

/// Highest 1-based slot number (`IO_BANKS * SLOTS_PER_BANK`).
pub const MAX_SLOT: u8 = IO_BANKS * SLOTS_PER_BANK;
