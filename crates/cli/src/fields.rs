//! Field-level view and edit of store segments for the shell.
//!
//! Paths are `<segment>.<field>`, e.g. `alarm.home_address`. Every edit goes
//! through a write guard so the segment checksum is current before the next
//! `COMMIT`.

use anyhow::{anyhow, bail, Context, Result};
use layout::{
    Alarm, Extension, Io, Messaging, Meta, Network, SegmentId, Text, MAX_VERSION, PWM_RANGE,
};
use medium::Medium;
use store::Store;

/// Current field values of segment `id`, in layout order.
pub fn describe<M: Medium>(store: &Store<M>, id: SegmentId) -> Vec<(&'static str, String)> {
    match id {
        SegmentId::Meta => {
            let m: Meta = store.read();
            vec![
                ("error_counter", m.error_counter.to_string()),
                ("version", m.version.to_string()),
            ]
        }
        SegmentId::Network => {
            let n: Network = store.read();
            vec![
                ("ota_password", n.ota_password.to_string()),
                ("ap_password", n.ap_password.to_string()),
            ]
        }
        SegmentId::Messaging => {
            let m: Messaging = store.read();
            vec![
                ("server_address", m.server_address.to_string()),
                ("user", m.user.to_string()),
                ("password", m.password.to_string()),
                ("topic_root", m.topic_root.to_string()),
            ]
        }
        SegmentId::Io => {
            let io: Io = store.read();
            vec![
                ("led_brightness_run", io.led_brightness_run.to_string()),
                ("led_brightness_config", io.led_brightness_config.to_string()),
                ("reset_switch_enabled", io.reset_switch_enabled.to_string()),
            ]
        }
        SegmentId::Alarm => {
            let a: Alarm = store.read();
            vec![("home_address", a.home_address.to_string())]
        }
        SegmentId::Extension => {
            let e: Extension = store.read();
            vec![
                ("char1", describe_byte(e.char1)),
                ("char2", describe_byte(e.char2)),
            ]
        }
    }
}

fn describe_byte(b: u8) -> String {
    if b.is_ascii_graphic() {
        (b as char).to_string()
    } else {
        format!("0x{:02X}", b)
    }
}

/// Parses `value` for the field at `path` and stores it in the mirror.
///
/// Nothing is written to the medium.
pub fn set_field<M: Medium>(store: &mut Store<M>, path: &str, value: &str) -> Result<()> {
    let (segment, field) = path
        .split_once('.')
        .ok_or_else(|| anyhow!("expected <segment>.<field>, got {:?}", path))?;
    let id: SegmentId = segment.parse()?;

    match (id, field) {
        (SegmentId::Meta, "version") => {
            let version = parse_bounded(value, MAX_VERSION)?;
            store.update(|m: &mut Meta| m.version = version);
        }
        (SegmentId::Meta, "error_counter") => {
            bail!("meta.error_counter is maintained by recovery and cannot be set")
        }

        (SegmentId::Network, "ota_password") => {
            let text = parse_text(value)?;
            store.update(|n: &mut Network| n.ota_password = text);
        }
        (SegmentId::Network, "ap_password") => {
            let text = parse_text(value)?;
            store.update(|n: &mut Network| n.ap_password = text);
        }

        (SegmentId::Messaging, "server_address") => {
            let text = parse_text(value)?;
            store.update(|m: &mut Messaging| m.server_address = text);
        }
        (SegmentId::Messaging, "user") => {
            let text = parse_text(value)?;
            store.update(|m: &mut Messaging| m.user = text);
        }
        (SegmentId::Messaging, "password") => {
            let text = parse_text(value)?;
            store.update(|m: &mut Messaging| m.password = text);
        }
        (SegmentId::Messaging, "topic_root") => {
            let text = parse_text(value)?;
            store.update(|m: &mut Messaging| m.topic_root = text);
        }

        (SegmentId::Io, "led_brightness_run") => {
            let level = parse_bounded(value, PWM_RANGE)?;
            store.update(|io: &mut Io| io.led_brightness_run = level);
        }
        (SegmentId::Io, "led_brightness_config") => {
            let level = parse_bounded(value, PWM_RANGE)?;
            store.update(|io: &mut Io| io.led_brightness_config = level);
        }
        (SegmentId::Io, "reset_switch_enabled") => {
            let enabled = parse_switch(value)?;
            store.update(|io: &mut Io| io.reset_switch_enabled = enabled);
        }

        (SegmentId::Alarm, "home_address") => {
            let text = parse_text(value)?;
            store.update(|a: &mut Alarm| a.home_address = text);
        }

        (SegmentId::Extension, "char1") => {
            let b = parse_byte(value)?;
            store.update(|e: &mut Extension| e.char1 = b);
        }
        (SegmentId::Extension, "char2") => {
            let b = parse_byte(value)?;
            store.update(|e: &mut Extension| e.char2 = b);
        }

        (id, field) => bail!("segment {} has no field {:?}", id, field),
    }
    Ok(())
}

fn parse_text(value: &str) -> Result<Text> {
    Text::new(value).with_context(|| format!("invalid text {:?}", value))
}

fn parse_bounded(value: &str, max: u16) -> Result<u16> {
    let n: u16 = value
        .parse()
        .with_context(|| format!("invalid number {:?}", value))?;
    if n > max {
        bail!("{} is out of range (max {})", n, max);
    }
    Ok(n)
}

fn parse_switch(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "1" | "yes" => Ok(true),
        "false" | "off" | "0" | "no" => Ok(false),
        _ => bail!("invalid switch value {:?} (expected on/off)", value),
    }
}

fn parse_byte(value: &str) -> Result<u8> {
    match value.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ => bail!("expected a single ASCII character, got {:?}", value),
    }
}
