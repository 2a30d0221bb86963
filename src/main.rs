use std::process::ExitCode;

use clap::Parser;

use mifare_classic::demo::{self, DemoOpts};
use mifare_classic::{Error, KeyType};

/// Enumerate nearby MIFARE Classic tags and demonstrate block access.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// MIFARE sector key as 12 hex digits; enables authentication.
    #[arg(long)]
    key: Option<String>,

    /// Reader key slot to load the key into.
    #[arg(long, default_value_t = 0)]
    key_slot: u8,

    /// Authenticate with key B instead of key A.
    #[arg(long, requires = "key")]
    key_b: bool,

    /// First block touched by the demonstration.
    #[arg(long, default_value_t = 4)]
    block: u8,

    /// Write demonstration data to four consecutive blocks (destructive).
    #[arg(long)]
    write: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let opts = match demo_opts(&args) {
        Ok(opts) => opts,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };

    match run_demo(&opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            let mut source = std::error::Error::source(&err);
            while let Some(inner) = source {
                eprintln!("  caused by: {inner}");
                source = inner.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn demo_opts(args: &Args) -> Result<DemoOpts, String> {
    let key = args
        .key
        .as_deref()
        .map(|digits| hex::decode(digits).map_err(|err| format!("invalid --key: {err}")))
        .transpose()?;
    if let Some(key) = &key {
        if key.len() != 6 {
            return Err(format!(
                "--key must be 6 bytes (12 hex digits), got {}",
                key.len()
            ));
        }
    }

    Ok(DemoOpts {
        key,
        key_slot: args.key_slot,
        key_type: if args.key_b { KeyType::B } else { KeyType::A },
        block: args.block,
        write: args.write,
    })
}

fn run_demo(opts: &DemoOpts) -> mifare_classic::Result<()> {
    let mut context = nfc1::Context::new().map_err(Error::ConnectionFailed)?;
    let mut device = context.open().map_err(Error::ConnectionFailed)?;
    device.initiator_init().map_err(Error::ConnectionFailed)?;
    device
        .set_property_bool(nfc1::Property::InfiniteSelect, true)
        .map_err(Error::ConnectionFailed)?;
    println!("Connected to NFC reader: {}", device.name());

    demo::run(device, opts)
}
