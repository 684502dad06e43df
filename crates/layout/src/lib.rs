//! # Layout - persisted configuration image
//!
//! Describes the fixed-layout, segmented image the configuration store keeps
//! on its non-volatile medium and mirrors into RAM.
//!
//! ## Image layout
//!
//! ```text
//! offset  segment     size  fields                                     footer
//! ------  ----------  ----  -----------------------------------------  -------------------
//!      0  meta          12  error_counter u16 | version u16            sentinel | checksum
//!     12  network       72  ota_password [32] | ap_password [32]       sentinel | checksum
//!     84  messaging    136  server [32] | user [32] | pass [32] | topic sentinel | checksum
//!    220  io            13  led_run u16 | led_config u16 | reset u8    sentinel | checksum
//!    233  alarm         40  home_address [32]                          sentinel | checksum
//!    273  extension     10  char1 u8 | char2 u8                        sentinel | checksum
//!    283  (end)
//! ```
//!
//! All integers are little-endian and nothing is padded. Text fields are
//! NUL-padded and not length-prefixed. Each checksum is a CRC-32 over the
//! segment's fields and sentinel.
//!
//! ## Module Responsibilities
//!
//! | Module       | Purpose                                                |
//! |--------------|--------------------------------------------------------|
//! | [`table`]    | `SegmentId`, descriptor table, compile-time checks     |
//! | [`segments`] | typed segment views and their ROM defaults             |
//! | [`format`]   | footer codec and little-endian field cursors           |
//! | [`checksum`] | the CRC-32 used everywhere                             |
//! | [`mirror`]   | the RAM mirror and per-segment checksum operations     |
//! | [`fixed`]    | fixed-length NUL-padded text                           |
//!
//! ## Example
//!
//! ```rust
//! use layout::{Mirror, Network, SegmentId, Text};
//!
//! let mut mirror = Mirror::with_defaults();
//! let mut net: Network = mirror.read();
//! net.ap_password = Text::new("s3cret").unwrap();
//! mirror.write(&net);
//!
//! assert!(mirror.is_consistent(SegmentId::Network));
//! assert_eq!(mirror.read::<Network>().ap_password.as_str(), "s3cret");
//! ```

pub mod checksum;
pub mod fixed;
pub mod format;
pub mod mirror;
pub mod segments;
pub mod table;

pub use checksum::crc32;
pub use fixed::{FixedStr, FixedStrError};
pub use format::{
    Footer, CHECKSUM_DEFAULT, CHECKSUM_LEN, FOOTER_LEN, SENTINEL_DEFAULT, SENTINEL_LEN,
};
pub use mirror::Mirror;
pub use segments::{
    Alarm, Extension, Io, Messaging, Meta, Network, Segment, Text, DEFAULT_VERSION,
    ERROR_COUNTER_CEILING, MAX_VERSION, PWM_RANGE, TEXT_LEN,
};
pub use table::{
    config_table, SegmentDescriptor, SegmentId, UnknownSegment, DESCRIPTORS, MIRROR_LEN,
    SEGMENT_COUNT,
};
