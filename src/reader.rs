//! The transport seam between the logical operations and the hardware.

use std::fmt;

use log::{debug, trace};
use nfc1::target_info::TargetInfo;
use nfc1::{BaudRate, Modulation, ModulationType, Timeout};

use crate::error::{Error, Result};

/// Everything known about one discovered ISO14443A tag.
///
/// Produced during discovery and read-only afterwards; dropped when the
/// session ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagInfo {
    /// Answer to request, as sent by the tag (SENS_RES).
    pub atqa: [u8; 2],
    /// Unique identifier, 4 to 10 bytes.
    pub uid: Vec<u8>,
    /// Select acknowledge (SEL_RES).
    pub sak: u8,
    /// Answer to select; empty for tags that do not send one.
    pub ats: Vec<u8>,
}

impl TagInfo {
    /// Extract the ISO14443A descriptor from an `nfc1` target, if it is one.
    pub fn from_target(target: &nfc1::Target) -> Option<Self> {
        match &target.target_info {
            TargetInfo::Iso14443a(info) => Some(Self {
                atqa: info.atqa,
                uid: info.uid[..info.uid_len].to_vec(),
                sak: info.sak,
                ats: info.ats[..info.ats_len].to_vec(),
            }),
            _ => None,
        }
    }
}

impl fmt::Display for TagInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "The following (NFC) ISO14443A tag was found:")?;
        writeln!(f, "    ATQA (SENS_RES): {}", hex_pairs(&self.atqa))?;
        // A first UID byte of 0x08 marks a randomly generated NFCID3.
        let nfcid = if self.uid.first() == Some(&0x08) { '3' } else { '1' };
        writeln!(f, "       UID (NFCID{}): {}", nfcid, hex_pairs(&self.uid))?;
        write!(f, "      SAK (SEL_RES): {}", hex_pairs(&[self.sak]))?;
        if !self.ats.is_empty() {
            write!(f, "\n          ATS (ATR): {}", hex_pairs(&self.ats))?;
        }
        Ok(())
    }
}

/// Render bytes as space-separated lowercase hex pairs, e.g. `de ad be ef`.
pub fn hex_pairs(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Byte-level access to a reader with a tag in its field.
///
/// Implemented for [`nfc1::Device`]; tests substitute a scripted stand-in.
pub trait Reader {
    /// Human-readable name of the underlying device.
    fn name(&mut self) -> String;

    /// Discover up to `max` ISO14443A tags near the reader.
    fn list_tags(&mut self, max: usize) -> Result<Vec<TagInfo>>;

    /// Reacquire one previously listed tag for the exchanges that follow.
    fn select(&mut self, tag: &TagInfo) -> Result<()>;

    /// Send `frame` and collect up to `rx_len` response bytes, blocking
    /// until the reader answers.
    fn transceive(&mut self, frame: &[u8], rx_len: usize) -> Result<Vec<u8>>;
}

impl<R: Reader + ?Sized> Reader for &mut R {
    fn name(&mut self) -> String {
        (**self).name()
    }

    fn list_tags(&mut self, max: usize) -> Result<Vec<TagInfo>> {
        (**self).list_tags(max)
    }

    fn select(&mut self, tag: &TagInfo) -> Result<()> {
        (**self).select(tag)
    }

    fn transceive(&mut self, frame: &[u8], rx_len: usize) -> Result<Vec<u8>> {
        (**self).transceive(frame, rx_len)
    }
}

fn mifare_modulation() -> Modulation {
    Modulation {
        modulation_type: ModulationType::Iso14443a,
        baud_rate: BaudRate::Baud106,
    }
}

impl Reader for nfc1::Device<'_> {
    fn name(&mut self) -> String {
        nfc1::Device::name(self).to_string()
    }

    fn list_tags(&mut self, max: usize) -> Result<Vec<TagInfo>> {
        debug!("listing up to {} passive targets", max);
        let targets = self
            .initiator_list_passive_targets(&mifare_modulation(), max)
            .map_err(Error::TransportRejected)?;
        Ok(targets.iter().filter_map(TagInfo::from_target).collect())
    }

    fn select(&mut self, tag: &TagInfo) -> Result<()> {
        let target = self
            .initiator_select_passive_target(&mifare_modulation())
            .map_err(|err| {
                debug!("selection rejected: {}", err);
                Error::SelectionFailed {
                    uid: tag.uid.clone(),
                }
            })?;
        // The reader hands back whichever tag answered first; make sure it
        // is the one the caller asked for.
        match TagInfo::from_target(&target) {
            Some(selected) if selected.uid == tag.uid => Ok(()),
            _ => Err(Error::SelectionFailed {
                uid: tag.uid.clone(),
            }),
        }
    }

    fn transceive(&mut self, frame: &[u8], rx_len: usize) -> Result<Vec<u8>> {
        trace!("> {}", hex_pairs(frame));
        let response = self
            .initiator_transceive_bytes(frame, rx_len, Timeout::None)
            .map_err(Error::TransportRejected)?;
        trace!("< {}", hex_pairs(&response));
        Ok(response)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_pairs_renders_lowercase_two_digit_bytes() {
        let payload: Vec<u8> = (0x00..0x10).collect();
        assert_eq!(
            hex_pairs(&payload),
            "00 01 02 03 04 05 06 07 08 09 0a 0b 0c 0d 0e 0f"
        );
        assert_eq!(hex_pairs(&[0xDE, 0xAD]), "de ad");
        assert_eq!(hex_pairs(&[]), "");
    }

    #[test]
    fn tag_info_display_names_every_field() {
        let tag = TagInfo {
            atqa: [0x00, 0x04],
            uid: vec![0xDE, 0xAD, 0xBE, 0xEF],
            sak: 0x08,
            ats: Vec::new(),
        };
        let rendered = tag.to_string();
        assert!(rendered.contains("ATQA (SENS_RES): 00 04"));
        assert!(rendered.contains("UID (NFCID1): de ad be ef"));
        assert!(rendered.contains("SAK (SEL_RES): 08"));
        assert!(!rendered.contains("ATS"));
    }

    #[test]
    fn tag_info_display_marks_random_uids_and_ats() {
        let tag = TagInfo {
            atqa: [0x03, 0x44],
            uid: vec![0x08, 0x01, 0x02, 0x03],
            sak: 0x20,
            ats: vec![0x75, 0x77, 0x81, 0x02],
        };
        let rendered = tag.to_string();
        assert!(rendered.contains("UID (NFCID3): 08 01 02 03"));
        assert!(rendered.contains("ATS (ATR): 75 77 81 02"));
    }
}
