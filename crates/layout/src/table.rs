//! Segment identifiers and the descriptor table.
//!
//! The table is sized by [`SEGMENT_COUNT`], the same constant that sizes
//! [`SegmentId::ALL`], and is checked at compile time: entry `i` must describe
//! segment `i`, segments must be contiguous, and the last one must end exactly
//! at [`MIRROR_LEN`].

use static_assertions::{const_assert, const_assert_eq};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use thiserror::Error;

use crate::format::{CHECKSUM_LEN, SENTINEL_LEN};
use crate::segments::{write_rom_default, Alarm, Extension, Io, Messaging, Meta, Network, Segment};

/// Number of segments in the store.
pub const SEGMENT_COUNT: usize = 6;

/// Symbolic name of every segment, in mirror order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum SegmentId {
    Meta = 0,
    Network = 1,
    Messaging = 2,
    Io = 3,
    Alarm = 4,
    Extension = 5,
}

impl SegmentId {
    /// Every segment in table order.
    pub const ALL: [SegmentId; SEGMENT_COUNT] = [
        SegmentId::Meta,
        SegmentId::Network,
        SegmentId::Messaging,
        SegmentId::Io,
        SegmentId::Alarm,
        SegmentId::Extension,
    ];

    /// Position in the descriptor table.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            SegmentId::Meta => "meta",
            SegmentId::Network => "network",
            SegmentId::Messaging => "messaging",
            SegmentId::Io => "io",
            SegmentId::Alarm => "alarm",
            SegmentId::Extension => "extension",
        }
    }

    /// Descriptor of this segment.
    #[must_use]
    pub fn descriptor(self) -> &'static SegmentDescriptor {
        &DESCRIPTORS[self.index()]
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A name that does not match any segment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown segment {0:?}")]
pub struct UnknownSegment(pub String);

impl FromStr for SegmentId {
    type Err = UnknownSegment;

    /// Accepts a segment name (case-insensitive) or its table index.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(index) = s.parse::<usize>() {
            return SegmentId::ALL
                .get(index)
                .copied()
                .ok_or_else(|| UnknownSegment(s.to_string()));
        }
        SegmentId::ALL
            .iter()
            .copied()
            .find(|id| id.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownSegment(s.to_string()))
    }
}

/// Location, default image and recovery policy of one segment.
#[derive(Clone, Copy)]
pub struct SegmentDescriptor {
    pub id: SegmentId,
    /// First byte of the segment in the mirror (and on the medium, relative
    /// to the base address).
    pub offset: usize,
    /// Bytes covered by the checksum: fields + sentinel.
    pub data_len: usize,
    /// Whether recovery may overwrite this segment with its default.
    pub rewrite_when_corrupt: bool,
    /// Writes the compiled-in default image (fields, default sentinel,
    /// zero checksum) into a buffer of [`size`](Self::size) bytes.
    pub rom_default: fn(&mut [u8]),
}

impl SegmentDescriptor {
    /// Total segment size including the checksum.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.data_len + CHECKSUM_LEN
    }

    /// Size of the fields alone.
    #[must_use]
    pub const fn fields_len(&self) -> usize {
        self.data_len - SENTINEL_LEN
    }

    /// Offset of the stored checksum in the mirror.
    #[must_use]
    pub const fn checksum_offset(&self) -> usize {
        self.offset + self.data_len
    }

    /// Mirror range of the whole segment.
    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.size()
    }

    /// Mirror range covered by the checksum.
    #[must_use]
    pub const fn data_range(&self) -> Range<usize> {
        self.offset..self.offset + self.data_len
    }

    /// Mirror range of the fields.
    #[must_use]
    pub const fn fields_range(&self) -> Range<usize> {
        self.offset..self.offset + self.fields_len()
    }

    /// Mirror range of the stored checksum.
    #[must_use]
    pub const fn checksum_range(&self) -> Range<usize> {
        self.checksum_offset()..self.checksum_offset() + CHECKSUM_LEN
    }
}

impl fmt::Debug for SegmentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SegmentDescriptor")
            .field("id", &self.id)
            .field("offset", &self.offset)
            .field("data_len", &self.data_len)
            .field("rewrite_when_corrupt", &self.rewrite_when_corrupt)
            .finish_non_exhaustive()
    }
}

const fn descriptor<S: Segment>(offset: usize, rewrite_when_corrupt: bool) -> SegmentDescriptor {
    SegmentDescriptor {
        id: S::ID,
        offset,
        data_len: S::DATA_LEN,
        rewrite_when_corrupt,
        rom_default: write_rom_default::<S>,
    }
}

const META_OFFSET: usize = 0;
const NETWORK_OFFSET: usize = META_OFFSET + Meta::SIZE;
const MESSAGING_OFFSET: usize = NETWORK_OFFSET + Network::SIZE;
const IO_OFFSET: usize = MESSAGING_OFFSET + Messaging::SIZE;
const ALARM_OFFSET: usize = IO_OFFSET + Io::SIZE;
const EXTENSION_OFFSET: usize = ALARM_OFFSET + Alarm::SIZE;

/// Total size of the mirror image in bytes.
pub const MIRROR_LEN: usize = EXTENSION_OFFSET + Extension::SIZE;

const TABLE: [SegmentDescriptor; SEGMENT_COUNT] = [
    descriptor::<Meta>(META_OFFSET, true),
    descriptor::<Network>(NETWORK_OFFSET, true),
    descriptor::<Messaging>(MESSAGING_OFFSET, true),
    descriptor::<Io>(IO_OFFSET, true),
    descriptor::<Alarm>(ALARM_OFFSET, true),
    descriptor::<Extension>(EXTENSION_OFFSET, false),
];

/// The descriptor table, indexed by [`SegmentId::index`].
pub static DESCRIPTORS: [SegmentDescriptor; SEGMENT_COUNT] = TABLE;

const fn table_is_consistent(table: &[SegmentDescriptor; SEGMENT_COUNT]) -> bool {
    let mut next_offset = 0;
    let mut i = 0;
    while i < SEGMENT_COUNT {
        let d = &table[i];
        if d.id as usize != i || SegmentId::ALL[i] as usize != i {
            return false;
        }
        if d.offset != next_offset || d.data_len <= SENTINEL_LEN {
            return false;
        }
        next_offset = d.offset + d.data_len + CHECKSUM_LEN;
        i += 1;
    }
    next_offset == MIRROR_LEN
}

const_assert!(table_is_consistent(&TABLE));
const_assert_eq!(MIRROR_LEN, 283);

/// The descriptor table and its element count.
#[must_use]
pub fn config_table() -> (&'static [SegmentDescriptor; SEGMENT_COUNT], usize) {
    (&DESCRIPTORS, DESCRIPTORS.len())
}
