//! Framing for the reader's vendor command set.
//!
//! The byte layouts here are the wire contract with the reader chip and
//! must be reproduced exactly for the hardware to act on them.

use crate::error::{Error, Result};

/// Largest frame the reader accepts.
pub const MAX_FRAME_LEN: usize = 1024;

/// `LoadKey(slot, key)` prefix, followed by slot, key length and key bytes.
pub const LOAD_KEY_PREFIX: [u8; 3] = [0xFF, 0x82, 0x00];
/// `Authenticate` prefix, followed by block, key type and slot.
pub const AUTHENTICATE_PREFIX: [u8; 7] = [0xFF, 0x86, 0x00, 0x00, 0x05, 0x01, 0x00];
/// `ReadBlock` opcode, followed by the block number.
pub const READ_BLOCK: u8 = 0x30;
/// `WriteBlock` opcode, followed by the block number and block data.
pub const WRITE_BLOCK: u8 = 0xA0;

/// Which of the two sector keys to authenticate with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    A = 0x60,
    B = 0x61,
}

/// Commands that can be issued to the reader while a tag is selected.
#[derive(Debug, Clone, Copy)]
pub enum Command<'a> {
    /// `LoadKey(slot, key)`: store key material in one of the reader's
    /// volatile key slots.
    LoadKey { slot: u8, key: &'a [u8] },
    /// `Authenticate(slot, block, key_type)`: unlock the sector containing
    /// `block` using the key previously loaded into `slot`.
    Authenticate {
        slot: u8,
        block: u8,
        key_type: KeyType,
    },
    /// `ReadBlock(block)`: fetch one 16-byte block. The amount of data
    /// returned is the tag's choice; no count is sent on the wire.
    ReadBlock(u8),
    /// `WriteBlock(block, data)`: store `data` into `block`.
    WriteBlock(u8, &'a [u8]),
}

impl Command<'_> {
    /// Length of the assembled frame, without assembling it.
    pub fn frame_len(&self) -> usize {
        match self {
            Command::LoadKey { key, .. } => LOAD_KEY_PREFIX.len() + 2 + key.len(),
            Command::Authenticate { .. } => AUTHENTICATE_PREFIX.len() + 3,
            Command::ReadBlock(_) => 2,
            Command::WriteBlock(_, data) => 2 + data.len(),
        }
    }

    /// Assemble the frame that will be sent to the reader.
    ///
    /// Rejects any assembly longer than [`MAX_FRAME_LEN`] before a single
    /// byte is written, so callers never hand an oversized frame to the
    /// transport.
    pub fn frame(&self) -> Result<Vec<u8>> {
        let len = self.frame_len();
        if len > MAX_FRAME_LEN {
            return Err(Error::CommandTooLarge(len));
        }

        let mut frame = Vec::with_capacity(len);
        match *self {
            Command::LoadKey { slot, key } => {
                frame.extend_from_slice(&LOAD_KEY_PREFIX);
                frame.push(slot);
                frame.push(key.len() as u8);
                frame.extend_from_slice(key);
            }
            Command::Authenticate {
                slot,
                block,
                key_type,
            } => {
                frame.extend_from_slice(&AUTHENTICATE_PREFIX);
                frame.push(block);
                frame.push(key_type as u8);
                frame.push(slot);
            }
            Command::ReadBlock(block) => {
                frame.push(READ_BLOCK);
                frame.push(block);
            }
            Command::WriteBlock(block, data) => {
                frame.push(WRITE_BLOCK);
                frame.push(block);
                frame.extend_from_slice(data);
            }
        }
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    #[test]
    fn load_key_frame_layout() {
        let frame = Command::LoadKey {
            slot: 0x01,
            key: &hex!("FF FF FF FF FF FF"),
        }
        .frame()
        .unwrap();
        assert_eq!(frame, hex!("FF 82 00 01 06 FF FF FF FF FF FF"));
        assert_eq!(frame.len(), LOAD_KEY_PREFIX.len() + 2 + 6);
    }

    #[test]
    fn load_key_rejects_oversized_key() {
        // Prefix + slot + length byte leave room for 1019 key bytes.
        let key = vec![0xAA; MAX_FRAME_LEN - LOAD_KEY_PREFIX.len() - 2];
        assert!(Command::LoadKey { slot: 0, key: &key }.frame().is_ok());

        let key = vec![0xAA; MAX_FRAME_LEN - LOAD_KEY_PREFIX.len() - 1];
        match (Command::LoadKey { slot: 0, key: &key }).frame() {
            Err(Error::CommandTooLarge(len)) => assert_eq!(len, MAX_FRAME_LEN + 1),
            other => panic!("expected CommandTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn authenticate_frame_layout() {
        let frame = Command::Authenticate {
            slot: 0x02,
            block: 0x04,
            key_type: KeyType::A,
        }
        .frame()
        .unwrap();
        assert_eq!(frame, hex!("FF 86 00 00 05 01 00 04 60 02"));

        let frame = Command::Authenticate {
            slot: 0x00,
            block: 0x07,
            key_type: KeyType::B,
        }
        .frame()
        .unwrap();
        assert_eq!(frame, hex!("FF 86 00 00 05 01 00 07 61 00"));
    }

    #[test]
    fn read_block_frame_is_always_two_bytes() {
        for block in [0x00, 0x04, 0x3F, 0xFF] {
            assert_eq!(Command::ReadBlock(block).frame().unwrap(), [0x30, block]);
        }
    }

    #[test]
    fn write_block_frame_layout() {
        let data = hex!("00 11 22 33 44 55 66 77 88 99 AA BB CC DD EE FF");
        let frame = Command::WriteBlock(0x05, &data).frame().unwrap();
        assert_eq!(frame[0], 0xA0);
        assert_eq!(frame[1], 0x05);
        assert_eq!(&frame[2..], data);
        assert_eq!(frame.len(), 2 + data.len());
    }

    #[test]
    fn write_block_rejects_oversized_data() {
        let data = vec![0x00; MAX_FRAME_LEN - 1];
        match Command::WriteBlock(0x04, &data).frame() {
            Err(Error::CommandTooLarge(len)) => assert_eq!(len, MAX_FRAME_LEN + 1),
            other => panic!("expected CommandTooLarge, got {other:?}"),
        }
    }
}
