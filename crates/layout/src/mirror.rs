use std::fmt;

use byteorder::{ByteOrder, LittleEndian};

use crate::checksum::crc32;
use crate::format::{FieldReader, FieldWriter, Footer};
use crate::segments::Segment;
use crate::table::{SegmentId, DESCRIPTORS, MIRROR_LEN};

/// In-memory working copy of the whole persisted image.
///
/// The bytes are laid out exactly as on the medium: every segment in table
/// order, each ending in its footer. All checksum bookkeeping goes through
/// the descriptor table, so a caller never computes offsets by hand.
#[derive(Clone, PartialEq, Eq)]
pub struct Mirror {
    bytes: [u8; MIRROR_LEN],
}

impl Mirror {
    /// Size of the image in bytes.
    pub const LEN: usize = MIRROR_LEN;

    /// An all-zero image. No segment is consistent.
    #[must_use]
    pub fn zeroed() -> Self {
        Self {
            bytes: [0u8; MIRROR_LEN],
        }
    }

    /// An image holding every ROM default with valid checksums.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut mirror = Self::zeroed();
        for id in SegmentId::ALL {
            mirror.restore_default(id);
            mirror.refresh_checksum(id);
        }
        mirror
    }

    /// Wraps an image read from the medium.
    #[must_use]
    pub fn from_bytes(bytes: [u8; MIRROR_LEN]) -> Self {
        Self { bytes }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; MIRROR_LEN] {
        &self.bytes
    }

    /// Whole image, writable. Checksums are not maintained.
    #[cfg(test)]
    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8; MIRROR_LEN] {
        &mut self.bytes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        MIRROR_LEN
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// All bytes of one segment, footer included.
    #[must_use]
    pub fn segment(&self, id: SegmentId) -> &[u8] {
        &self.bytes[id.descriptor().range()]
    }

    /// Field bytes of one segment, footer excluded.
    #[must_use]
    pub fn fields(&self, id: SegmentId) -> &[u8] {
        &self.bytes[id.descriptor().fields_range()]
    }

    /// Field bytes of one segment, writable. Checksums are not maintained.
    pub fn fields_mut(&mut self, id: SegmentId) -> &mut [u8] {
        &mut self.bytes[id.descriptor().fields_range()]
    }

    /// Footer of one segment as currently stored.
    #[must_use]
    pub fn footer(&self, id: SegmentId) -> Footer {
        let d = id.descriptor();
        Footer::read(&self.bytes[d.fields_range().end..d.range().end])
    }

    /// CRC-32 over the segment's fields and sentinel.
    #[must_use]
    pub fn compute_checksum(&self, id: SegmentId) -> u32 {
        crc32(&self.bytes[id.descriptor().data_range()])
    }

    /// Checksum stored in the segment footer.
    #[must_use]
    pub fn stored_checksum(&self, id: SegmentId) -> u32 {
        LittleEndian::read_u32(&self.bytes[id.descriptor().checksum_range()])
    }

    /// Recomputes the checksum and stores it. Only the four checksum bytes
    /// change.
    pub fn refresh_checksum(&mut self, id: SegmentId) {
        let crc = self.compute_checksum(id);
        LittleEndian::write_u32(&mut self.bytes[id.descriptor().checksum_range()], crc);
    }

    /// Whether the stored checksum matches the segment contents.
    #[must_use]
    pub fn is_consistent(&self, id: SegmentId) -> bool {
        self.compute_checksum(id) == self.stored_checksum(id)
    }

    /// Copies the ROM default image over the segment. The checksum is left
    /// at its default (zero) until [`refresh_checksum`](Self::refresh_checksum).
    pub fn restore_default(&mut self, id: SegmentId) {
        let d = id.descriptor();
        (d.rom_default)(&mut self.bytes[d.range()]);
    }

    /// Decodes a typed copy of segment `S`.
    #[must_use]
    pub fn read<S: Segment>(&self) -> S {
        let d = S::ID.descriptor();
        S::decode_fields(&mut FieldReader::new(&self.bytes[d.fields_range()]))
    }

    /// Encodes `value` into segment `S`, writes the default sentinel and
    /// refreshes the checksum.
    pub fn write<S: Segment>(&mut self, value: &S) {
        let d = S::ID.descriptor();
        let mut writer = FieldWriter::new(&mut self.bytes[d.fields_range()]);
        value.encode_fields(&mut writer);
        debug_assert_eq!(writer.position(), S::FIELDS_LEN);
        Footer::DEFAULT.write(&mut self.bytes[d.fields_range().end..d.range().end]);
        self.refresh_checksum(S::ID);
    }
}

impl Default for Mirror {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl fmt::Debug for Mirror {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for (id, d) in SegmentId::ALL.iter().zip(DESCRIPTORS.iter()) {
            list.entry(&format_args!(
                "{}@{}: stored=0x{:08X} computed=0x{:08X}",
                id,
                d.offset,
                self.stored_checksum(*id),
                self.compute_checksum(*id)
            ));
        }
        list.finish()
    }
}
