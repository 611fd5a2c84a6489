use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use sysinfo::Networks;

use emo_session::{
    backup_session, copy_session, interface_descriptor, register_device, resolve_address,
    Conflict, Decision, DeviceEntry, DeviceRegistration, MacAddress, RegistrationOutcome,
    SessionStore, Slot,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OnConflict {
    /// Ask on the terminal for every conflict.
    Prompt,
    /// Remove conflicting devices without asking.
    Replace,
    /// Leave the session untouched if anything conflicts.
    Abort,
}

#[derive(Debug, Clone, Args)]
struct RegisterArgs {
    /// Session file (.emo) to patch.
    #[arg(long, env = "SGC_SESSION")]
    session: PathBuf,

    /// Network interface as printed by `interfaces`, e.g. "Intel(R) I210 (00:1A:2B:3C:4D:5E)".
    ///
    /// Only the last bracketed group is used, so a bare "(00:1A:2B:3C:4D:5E)" works too.
    #[arg(long)]
    interface: String,

    /// IO slot (1-16). Slots 1-8 are bank 0, 9-16 are bank 1.
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=16))]
    slot: u8,

    /// Write the patched session here instead of modifying --session in place.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Copy the file being patched to "<file>.bak" first.
    #[arg(long)]
    backup: bool,

    /// How to resolve conflicts with devices already in the session.
    #[arg(long, value_enum, env = "SGC_ON_CONFLICT", default_value_t = OnConflict::Prompt)]
    on_conflict: OnConflict,
}

#[derive(Debug, Parser)]
#[command(name = "sgc_patch")]
#[command(about = "Register an SG Connect virtual IO device in an eMotion LV1 session file")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List host network interfaces that can back an SG Connect device.
    Interfaces,

    /// List the devices registered in a session.
    Devices {
        /// Session file (.emo) to inspect.
        #[arg(long, env = "SGC_SESSION")]
        session: PathBuf,
    },

    /// Add an SG Connect device to a session at the given IO slot.
    Register(RegisterArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Interfaces => list_interfaces(),
        Commands::Devices { session } => list_devices(session),
        Commands::Register(args) => register(args),
    }
}

fn list_interfaces() -> Result<()> {
    let networks = Networks::new_with_refreshed_list();

    let mut descriptors: Vec<String> = networks
        .list()
        .iter()
        .filter(|(_, data)| !data.mac_address().is_unspecified())
        .map(|(name, data)| interface_descriptor(name, MacAddress::from_bytes(data.mac_address().0)))
        .collect();
    descriptors.sort();

    if descriptors.is_empty() {
        eprintln!("warning: no network interfaces with a hardware address found");
    }
    for descriptor in &descriptors {
        println!("{descriptor}");
    }
    Ok(())
}

fn list_devices(session: PathBuf) -> Result<()> {
    let store = SessionStore::open(&session)
        .with_context(|| format!("open session {}", session.display()))?;
    let devices = store
        .devices()
        .with_context(|| format!("read device table of {}", store.path().display()))?;
    store.close()?;

    if devices.is_empty() {
        println!("no devices in {}", session.display());
        return Ok(());
    }
    for device in &devices {
        println!("{}", format_device(device));
    }
    Ok(())
}

fn format_device(device: &DeviceEntry) -> String {
    let slot = device
        .slot()
        .map(|s| format!("slot {:>2}", s.number()))
        .unwrap_or_else(|| format!("bank {} io {}", device.io_bank, device.assign));
    let mac = device
        .mac
        .and_then(|m| u64::try_from(m).ok())
        .and_then(MacAddress::new)
        .map(|m| m.to_string())
        .unwrap_or_else(|| "-".to_string());
    let tag = match (device.device_class, device.vendor_id) {
        (Some(class), Some(vendor)) => format!("class {class} vendor {vendor}"),
        _ => "no iobox".to_string(),
    };
    format!(
        "id {:>3}  {slot}  {mac}  {tag}  owner {}  {}",
        device.id,
        device.owner_uuid.as_deref().unwrap_or("-"),
        device.description.as_deref().unwrap_or("")
    )
}

fn register(args: RegisterArgs) -> Result<()> {
    let registration = DeviceRegistration {
        address: resolve_address(&args.interface)?,
        slot: Slot::from_number(args.slot)?,
    };

    let target = match &args.output {
        Some(output) => {
            copy_session(&args.session, output).with_context(|| {
                format!(
                    "copy session {} to {}",
                    args.session.display(),
                    output.display()
                )
            })?;
            output.clone()
        }
        None => args.session.clone(),
    };

    if args.backup {
        let backup = backup_session(&target)
            .with_context(|| format!("back up session {}", target.display()))?;
        println!("backup: {}", backup.display());
    }

    tracing::debug!(?registration, target = %target.display(), "applying registration");
    let policy = args.on_conflict;
    let mut decider = |conflict: &Conflict| decide(policy, conflict);
    let outcome = register_device(&target, registration, &mut decider)
        .with_context(|| format!("update session {}", target.display()))?;

    match outcome {
        RegistrationOutcome::Registered { id, removed } => {
            for removed_id in removed {
                println!("removed: device id {removed_id}");
            }
            println!(
                "registered: SG Connect {} at {} as device id {id} in {}",
                registration.address,
                registration.slot,
                target.display()
            );
        }
        RegistrationOutcome::Aborted(conflict) => {
            println!("aborted: {conflict}; no changes made");
        }
    }
    Ok(())
}

fn decide(policy: OnConflict, conflict: &Conflict) -> Decision {
    match policy {
        OnConflict::Replace => Decision::Proceed,
        OnConflict::Abort => Decision::Abort,
        OnConflict::Prompt => prompt(conflict),
    }
}

/// Ask a yes/no question on the terminal. Anything but "y"/"yes" (including EOF) declines.
fn prompt(conflict: &Conflict) -> Decision {
    eprintln!("warning: {conflict}");
    eprint!("{} [y/N] ", conflict.prompt());
    let _ = io::stderr().flush();

    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(0) | Err(_) => Decision::Abort,
        Ok(_) => match answer.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Decision::Proceed,
            _ => Decision::Abort,
        },
    }
}
