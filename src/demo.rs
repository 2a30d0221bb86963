//! The per-tag read → write → read demonstration.

use log::warn;

use crate::cmd::KeyType;
use crate::error::{Error, Result};
use crate::mem;
use crate::reader::{hex_pairs, Reader, TagInfo};
use crate::tag::MifareClassic;

/// Most tags handled in one discovery pass.
pub const MAX_TARGETS: usize = 10;

/// Number of consecutive blocks covered by the write demonstration.
pub const WRITE_BLOCKS: usize = 4;

/// Source payload for the write demonstration. Write i takes the 16-byte
/// window starting at offset 4 × i, so the last window ends at byte 28.
pub const WRITE_PAYLOAD: [u8; 28] = *b"hello, mifare classic world.";

/// What the demonstration should do to each discovered tag.
#[derive(Debug, Clone)]
pub struct DemoOpts {
    /// Key material loaded into the reader before any data access; when
    /// absent, authentication is skipped entirely.
    pub key: Option<Vec<u8>>,
    /// Reader key slot used for the loaded key.
    pub key_slot: u8,
    pub key_type: KeyType,
    /// First block touched by the demonstration.
    pub block: u8,
    /// Run the destructive write pass.
    pub write: bool,
}

impl Default for DemoOpts {
    fn default() -> Self {
        Self {
            key: None,
            key_slot: 0,
            key_type: KeyType::A,
            block: mem::DATA.start as u8,
            write: false,
        }
    }
}

/// Discover nearby tags and run the demonstration against each of them.
///
/// A failure while handling one tag is reported on stdout and processing
/// moves on to the next tag; only the operator output distinguishes a
/// clean pass from a partial one.
pub fn run<R: Reader>(reader: R, opts: &DemoOpts) -> Result<()> {
    let mut mifare = MifareClassic::new(reader);

    let tags = match mifare.list_tags(MAX_TARGETS) {
        Ok(tags) => tags,
        Err(err) => {
            warn!("target listing failed: {}", err);
            Vec::new()
        }
    };
    println!("[Found {} target(s).]", tags.len());

    for tag in &tags {
        if let Err(err) = demo_tag(&mut mifare, tag, opts) {
            println!("Tag with UID {}: {}", hex_pairs(&tag.uid), err);
        }
    }
    Ok(())
}

fn demo_tag<R: Reader>(
    mifare: &mut MifareClassic<R>,
    tag: &TagInfo,
    opts: &DemoOpts,
) -> Result<()> {
    mifare.select(tag)?;
    println!("{}\n", tag);

    let authenticated = if let Some(key) = &opts.key {
        mifare.load_key(opts.key_slot, key)?;
        mifare.authenticate(opts.key_slot, opts.block, opts.key_type)?;
        true
    } else {
        false
    };

    let data = mifare
        .read_block(opts.block, mem::BLOCK_SIZE)
        .map_err(|err| auth_hint(err, authenticated, opts.block))?;
    println!("Block {:02x}: {}", opts.block, hex_pairs(&data));

    if opts.write {
        for i in 0..WRITE_BLOCKS {
            let Some(block) = opts.block.checked_add(i as u8) else {
                warn!("write demonstration past block 0xff, stopping");
                break;
            };
            let window = &WRITE_PAYLOAD[4 * i..4 * i + mem::BLOCK_SIZE];
            mifare
                .write_block(block, window)
                .map_err(|err| auth_hint(err, authenticated, block))?;
        }

        // No automated comparison here; the operator checks the dumps.
        let data = mifare
            .read_block(opts.block, mem::BLOCK_SIZE)
            .map_err(|err| auth_hint(err, authenticated, opts.block))?;
        println!("Block {:02x} after write: {}", opts.block, hex_pairs(&data));
    }

    Ok(())
}

/// A rejected data access on an unauthenticated session usually means the
/// sector wants a key, which is more actionable than a bare transport
/// failure.
fn auth_hint(err: Error, authenticated: bool, block: u8) -> Error {
    match err {
        Error::TransportRejected(_) if !authenticated => Error::AuthenticationRequired(block),
        err => err,
    }
}
