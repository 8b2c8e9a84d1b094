//! RingStore CLI
//!
//! Manipulates a RingStore region inside an EEPROM image file. Every
//! mutating command loads the freshest generation, applies the change and
//! saves one new generation.

use std::fmt;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ringstore::{Config, Device, FileDevice, Record, Result, Store, StoreError};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt as tracing_fmt, EnvFilter};

/// Width of a text entry in bytes
const ENTRY_LEN: usize = 16;

/// RingStore CLI
#[derive(Parser, Debug)]
#[command(name = "ringstore-cli")]
#[command(about = "Wear-leveled text entries in an EEPROM image")]
#[command(version)]
struct Args {
    /// EEPROM image file
    #[arg(short, long, default_value = "./eeprom.bin")]
    image: PathBuf,

    /// Device size in bytes
    #[arg(long, default_value = "1024")]
    device_size: usize,

    /// Region start address
    #[arg(short, long, default_value = "0")]
    start: usize,

    /// Ring capacity (1..=255)
    #[arg(short, long, default_value = "8")]
    capacity: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Format the region (keeps data if the header already matches)
    Format {
        /// Wipe even when the header matches
        #[arg(long)]
        force: bool,
    },

    /// Add an entry
    Add {
        /// Entry text (truncated to 16 bytes)
        text: String,
    },

    /// List entries in storage order
    List,

    /// Replace the entry at a position
    Set {
        /// Position as shown by `list`
        index: usize,

        /// New entry text
        text: String,
    },

    /// Delete the entry at a position
    Delete {
        /// Position as shown by `list`
        index: usize,
    },

    /// Remove all entries
    Clear,

    /// Show the region header, status ring and top generation
    Inspect,
}

/// Fixed-width text entry
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry([u8; ENTRY_LEN]);

impl Record for Entry {
    const ENCODED_SIZE: usize = ENTRY_LEN;
}

impl From<&str> for Entry {
    fn from(text: &str) -> Self {
        let mut bytes = [0u8; ENTRY_LEN];
        let len = text.len().min(ENTRY_LEN);
        bytes[..len].copy_from_slice(&text.as_bytes()[..len]);
        Self(bytes)
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(ENTRY_LEN);
        write!(f, "{}", String::from_utf8_lossy(&self.0[..end]))
    }
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ringstore=debug"));

    tracing_fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let args = Args::parse();

    tracing::info!("RingStore CLI v{}", ringstore::VERSION);
    tracing::info!("Image: {}", args.image.display());

    if let Err(e) = run(args) {
        tracing::error!("Command failed: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut device = FileDevice::open(&args.image, args.device_size)?;

    if let Commands::Format { force: true } = args.command {
        // Break the begin marker so the header no longer matches
        device.write_byte(args.start, 0x00)?;
        device.flush()?;
    }

    let config = Config::builder()
        .region_start(args.start)
        .ring_capacity(args.capacity)
        .build();

    let mut store: Store<Entry, FileDevice> = Store::open(config, device)?;

    match args.command {
        Commands::Format { .. } => {
            println!(
                "region 0x{:04x}..0x{:04x} ready, {} entries",
                args.start,
                store.next_free_address().unwrap_or_default(),
                store.counter()
            );
        }
        Commands::Add { text } => {
            store.insert(Entry::from(text.as_str()))?;
            store.save_storage()?;
            println!("added, {} entries", store.counter());
        }
        Commands::List => {
            for (index, entry) in store.records().enumerate() {
                println!("{:3}  {}", index, entry);
            }
        }
        Commands::Set { index, text } => {
            seek(&mut store, index)?;
            store.update(Entry::from(text.as_str()))?;
            store.save_storage()?;
            println!("updated entry {}", index);
        }
        Commands::Delete { index } => {
            seek(&mut store, index)?;
            store.delete()?;
            store.save_storage()?;
            println!("deleted entry {}, {} left", index, store.counter());
        }
        Commands::Clear => {
            store.clean();
            store.save_storage()?;
            println!("cleared");
        }
        Commands::Inspect => {
            let info = store.inspect()?;
            println!("start        0x{:04x}", info.start);
            println!("capacity     {}", info.capacity);
            println!("slot size    {}", info.slot_size);
            println!("ring         {:?}", info.ring);
            println!("top index    {}", info.top_index);
            println!("top address  0x{:04x}", info.top_address);
            println!("count        {}", info.persisted_count);
            println!("region end   0x{:04x}", info.region_end);
            println!("crc32        0x{:08x}", store.region_checksum()?);
        }
    }

    Ok(())
}

/// Put the cursor on the `index`-th enabled entry
fn seek(store: &mut Store<Entry, FileDevice>, index: usize) -> Result<()> {
    let mut found = store.top();
    for _ in 0..index {
        if !found {
            break;
        }
        found = store.next();
    }

    if found {
        Ok(())
    } else {
        Err(StoreError::OutOfRange(format!("no entry at position {}", index)))
    }
}
