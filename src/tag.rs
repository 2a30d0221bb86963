//! Logical MIFARE Classic operations over any [`Reader`].

use log::{debug, trace};

use crate::cmd::{Command, KeyType};
use crate::error::Result;
use crate::mem;
use crate::reader::{hex_pairs, Reader, TagInfo};

/// Wrapper structure for a reader with MIFARE Classic tags in its field.
/// Used to send commands.
pub struct MifareClassic<R> {
    reader: R,
}

impl<R: Reader> MifareClassic<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Name of the underlying reader device.
    pub fn reader_name(&mut self) -> String {
        self.reader.name()
    }

    /// Discover up to `max` tags near the reader.
    pub fn list_tags(&mut self, max: usize) -> Result<Vec<TagInfo>> {
        self.reader.list_tags(max)
    }

    /// Reacquire one previously discovered tag.
    pub fn select(&mut self, tag: &TagInfo) -> Result<()> {
        self.reader.select(tag)
    }

    /// Store key material in one of the reader's volatile key slots.
    ///
    /// The response carries no payload worth interpreting; reaching the
    /// reader and being acknowledged is the whole result.
    pub fn load_key(&mut self, slot: u8, key: &[u8]) -> Result<()> {
        debug!("loading {} key bytes into reader slot {}", key.len(), slot);
        let frame = Command::LoadKey { slot, key }.frame()?;
        self.reader.transceive(&frame, mem::BLOCK_SIZE)?;
        Ok(())
    }

    /// Unlock the sector containing `block` with the key in `slot`.
    pub fn authenticate(&mut self, slot: u8, block: u8, key_type: KeyType) -> Result<()> {
        debug!(
            "authenticating block {:#04x} with key {:?} from slot {}",
            block, key_type, slot
        );
        let frame = Command::Authenticate {
            slot,
            block,
            key_type,
        }
        .frame()?;
        self.reader.transceive(&frame, mem::BLOCK_SIZE)?;
        Ok(())
    }

    /// Read one block, collecting at most `len` bytes.
    ///
    /// `len` sizes the receive buffer only; the wire command carries just
    /// the opcode and block number, and the tag decides how much comes
    /// back.
    pub fn read_block(&mut self, block: u8, len: usize) -> Result<Vec<u8>> {
        trace!("reading block {:#04x}", block);
        let frame = Command::ReadBlock(block).frame()?;
        self.reader.transceive(&frame, len)
    }

    /// Write `data` into one block.
    pub fn write_block(&mut self, block: u8, data: &[u8]) -> Result<()> {
        trace!("writing {} bytes to block {:#04x}", data.len(), block);
        let frame = Command::WriteBlock(block, data).frame()?;
        let response = self.reader.transceive(&frame, mem::BLOCK_SIZE)?;
        trace!("write response: {}", hex_pairs(&response));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;
    use crate::cmd::MAX_FRAME_LEN;
    use crate::error::Error;
    use crate::reader::testing::StubReader;

    #[test]
    fn read_block_returns_the_transport_payload() {
        let mut stub = StubReader::default();
        stub.read_payload = (0x00..0x10).collect();
        let mut mifare = MifareClassic::new(stub);

        let data = mifare.read_block(0x04, mem::BLOCK_SIZE).unwrap();
        assert_eq!(data, (0x00..0x10).collect::<Vec<u8>>());
    }

    #[test]
    fn read_block_len_caps_the_received_bytes() {
        let mut stub = StubReader::default();
        stub.read_payload = vec![0xAB; 32];
        let mut mifare = MifareClassic::new(stub);

        let data = mifare.read_block(0x04, 4).unwrap();
        assert_eq!(data, vec![0xAB; 4]);
    }

    #[test]
    fn write_block_failure_propagates_without_a_response() {
        let mut stub = StubReader::default();
        stub.fail_transceive = true;
        let mut mifare = MifareClassic::new(stub);

        let err = mifare
            .write_block(0x04, &hex!("00 11 22 33 44 55 66 77 88 99 AA BB CC DD EE FF"))
            .unwrap_err();
        assert!(matches!(err, Error::TransportRejected(_)));
    }

    #[test]
    fn oversized_load_key_never_reaches_the_transport() {
        let key = vec![0xFF; MAX_FRAME_LEN];
        let mut mifare = MifareClassic::new(StubReader::default());

        let err = mifare.load_key(0, &key).unwrap_err();
        assert!(matches!(err, Error::CommandTooLarge(_)));
        assert!(mifare.reader.sent.is_empty());
    }

    #[test]
    fn authenticate_sends_the_expected_frame() {
        let mut mifare = MifareClassic::new(StubReader::default());
        mifare.authenticate(1, 0x04, KeyType::A).unwrap();
        assert_eq!(
            mifare.reader.sent,
            vec![hex!("FF 86 00 00 05 01 00 04 60 01").to_vec()]
        );
    }
}
