//! Typed views of every segment.
//!
//! Each segment type knows its packed field layout and its compiled-in
//! default. The footer is handled generically by [`Mirror`](crate::Mirror).
//!
//! | Segment     | Fields                                               | Fields bytes |
//! |-------------|------------------------------------------------------|--------------|
//! | `Meta`      | error_counter u16, version u16                       | 4            |
//! | `Network`   | ota_password [32], ap_password [32]                  | 64           |
//! | `Messaging` | server_address [32], user [32], password [32], topic_root [32] | 128 |
//! | `Io`        | led_brightness_run u16, led_brightness_config u16, reset_switch_enabled u8 | 5 |
//! | `Alarm`     | home_address [32]                                    | 32           |
//! | `Extension` | char1 u8, char2 u8                                   | 2            |

use std::fmt::Debug;

use crate::fixed::FixedStr;
use crate::format::{FieldReader, FieldWriter, Footer, FOOTER_LEN, SENTINEL_LEN};
use crate::table::SegmentId;

/// Length of every text field.
pub const TEXT_LEN: usize = 32;

/// A NUL-padded text field of [`TEXT_LEN`] bytes.
pub type Text = FixedStr<TEXT_LEN>;

/// Ceiling of the corruption-recovery counter.
pub const ERROR_COUNTER_CEILING: u16 = 9999;

/// Highest version number tooling may store in the meta segment.
pub const MAX_VERSION: u16 = 9999;

/// Version stored by the meta segment default.
pub const DEFAULT_VERSION: u16 = 1;

/// Full-scale PWM value for LED brightness.
pub const PWM_RANGE: u16 = 1023;

/// A fixed-size group of configuration fields stored as one checksummed unit.
pub trait Segment: Sized + Clone + PartialEq + Debug {
    /// Identifier of the segment in the descriptor table.
    const ID: SegmentId;

    /// Packed size of the fields, excluding the footer.
    const FIELDS_LEN: usize;

    /// Bytes covered by the checksum: fields + sentinel.
    const DATA_LEN: usize = Self::FIELDS_LEN + SENTINEL_LEN;

    /// Total packed size: fields + footer.
    const SIZE: usize = Self::FIELDS_LEN + FOOTER_LEN;

    /// Writes exactly [`FIELDS_LEN`](Self::FIELDS_LEN) bytes.
    fn encode_fields(&self, out: &mut FieldWriter<'_>);

    /// Reads exactly [`FIELDS_LEN`](Self::FIELDS_LEN) bytes.
    fn decode_fields(input: &mut FieldReader<'_>) -> Self;

    /// The compiled-in default value.
    fn rom_default() -> Self;

    /// Puts back fields of `original` that callers may not change. Write
    /// guards call this before storing an edited value.
    fn keep_protected(&mut self, _original: &Self) {}
}

/// Writes the ROM default image of `S` (fields, default sentinel, zero
/// checksum) into `out`, which must be exactly `S::SIZE` bytes long.
pub fn write_rom_default<S: Segment>(out: &mut [u8]) {
    debug_assert_eq!(out.len(), S::SIZE);
    let mut writer = FieldWriter::new(&mut out[..S::FIELDS_LEN]);
    S::rom_default().encode_fields(&mut writer);
    debug_assert_eq!(writer.position(), S::FIELDS_LEN);
    Footer::DEFAULT.write(&mut out[S::FIELDS_LEN..S::SIZE]);
}

// -------------------- Meta --------------------

/// Store-wide bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Meta {
    /// Corruption-recovery events over the device lifetime, saturating at
    /// [`ERROR_COUNTER_CEILING`].
    pub error_counter: u16,
    /// Opaque data version owned by migration tooling.
    pub version: u16,
}

impl Meta {
    /// Adds one recovery event without passing the ceiling.
    pub fn record_recovery(&mut self) {
        self.error_counter = self
            .error_counter
            .saturating_add(1)
            .min(ERROR_COUNTER_CEILING);
    }
}

impl Segment for Meta {
    const ID: SegmentId = SegmentId::Meta;
    const FIELDS_LEN: usize = 2 + 2;

    fn encode_fields(&self, out: &mut FieldWriter<'_>) {
        out.put_u16(self.error_counter);
        out.put_u16(self.version);
    }

    fn decode_fields(input: &mut FieldReader<'_>) -> Self {
        Self {
            error_counter: input.u16(),
            version: input.u16(),
        }
    }

    fn rom_default() -> Self {
        Self {
            error_counter: 0,
            version: DEFAULT_VERSION,
        }
    }

    /// The counter only moves through recovery.
    fn keep_protected(&mut self, original: &Self) {
        self.error_counter = original.error_counter;
    }
}

// -------------------- Network --------------------

/// Network credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    /// Password required for over-the-air updates.
    pub ota_password: Text,
    /// Password of the configuration-mode access point.
    pub ap_password: Text,
}

impl Segment for Network {
    const ID: SegmentId = SegmentId::Network;
    const FIELDS_LEN: usize = TEXT_LEN * 2;

    fn encode_fields(&self, out: &mut FieldWriter<'_>) {
        out.put_bytes(self.ota_password.as_raw());
        out.put_bytes(self.ap_password.as_raw());
    }

    fn decode_fields(input: &mut FieldReader<'_>) -> Self {
        Self {
            ota_password: Text::from_raw(input.array()),
            ap_password: Text::from_raw(input.array()),
        }
    }

    fn rom_default() -> Self {
        const PASSWORD: Text = Text::literal("password");
        Self {
            ota_password: PASSWORD,
            ap_password: PASSWORD,
        }
    }
}

// -------------------- Messaging --------------------

/// Message broker connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Messaging {
    pub server_address: Text,
    pub user: Text,
    pub password: Text,
    /// Root under which every published topic is placed.
    pub topic_root: Text,
}

impl Segment for Messaging {
    const ID: SegmentId = SegmentId::Messaging;
    const FIELDS_LEN: usize = TEXT_LEN * 4;

    fn encode_fields(&self, out: &mut FieldWriter<'_>) {
        out.put_bytes(self.server_address.as_raw());
        out.put_bytes(self.user.as_raw());
        out.put_bytes(self.password.as_raw());
        out.put_bytes(self.topic_root.as_raw());
    }

    fn decode_fields(input: &mut FieldReader<'_>) -> Self {
        Self {
            server_address: Text::from_raw(input.array()),
            user: Text::from_raw(input.array()),
            password: Text::from_raw(input.array()),
            topic_root: Text::from_raw(input.array()),
        }
    }

    fn rom_default() -> Self {
        Self {
            server_address: Text::literal("localhost"),
            user: Text::literal("testuser"),
            password: Text::literal("password"),
            topic_root: Text::literal("publisher"),
        }
    }
}

// -------------------- Io --------------------

/// I/O calibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Io {
    /// Status LED brightness in run mode, `0..=PWM_RANGE`.
    pub led_brightness_run: u16,
    /// Status LED brightness in configuration mode, `0..=PWM_RANGE`.
    pub led_brightness_config: u16,
    pub reset_switch_enabled: bool,
}

impl Segment for Io {
    const ID: SegmentId = SegmentId::Io;
    const FIELDS_LEN: usize = 2 + 2 + 1;

    fn encode_fields(&self, out: &mut FieldWriter<'_>) {
        out.put_u16(self.led_brightness_run);
        out.put_u16(self.led_brightness_config);
        out.put_u8(u8::from(self.reset_switch_enabled));
    }

    fn decode_fields(input: &mut FieldReader<'_>) -> Self {
        Self {
            led_brightness_run: input.u16(),
            led_brightness_config: input.u16(),
            reset_switch_enabled: input.u8() != 0,
        }
    }

    fn rom_default() -> Self {
        Self {
            led_brightness_run: PWM_RANGE,
            led_brightness_config: PWM_RANGE,
            reset_switch_enabled: true,
        }
    }
}

// -------------------- Alarm --------------------

/// Site address reported with alarm messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alarm {
    pub home_address: Text,
}

impl Segment for Alarm {
    const ID: SegmentId = SegmentId::Alarm;
    const FIELDS_LEN: usize = TEXT_LEN;

    fn encode_fields(&self, out: &mut FieldWriter<'_>) {
        out.put_bytes(self.home_address.as_raw());
    }

    fn decode_fields(input: &mut FieldReader<'_>) -> Self {
        Self {
            home_address: Text::from_raw(input.array()),
        }
    }

    fn rom_default() -> Self {
        Self {
            home_address: Text::literal("Home Address"),
        }
    }
}

// -------------------- Extension --------------------

/// Forward-compatibility area. Never rewritten by recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extension {
    pub char1: u8,
    pub char2: u8,
}

impl Segment for Extension {
    const ID: SegmentId = SegmentId::Extension;
    const FIELDS_LEN: usize = 1 + 1;

    fn encode_fields(&self, out: &mut FieldWriter<'_>) {
        out.put_u8(self.char1);
        out.put_u8(self.char2);
    }

    fn decode_fields(input: &mut FieldReader<'_>) -> Self {
        Self {
            char1: input.u8(),
            char2: input.u8(),
        }
    }

    fn rom_default() -> Self {
        Self {
            char1: b'G',
            char2: b'R',
        }
    }
}
