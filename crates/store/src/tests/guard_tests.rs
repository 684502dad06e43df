use anyhow::Result;
use layout::*;
use medium::RamMedium;

use super::helpers::*;
use crate::*;

#[test]
fn edit_refreshes_checksum_on_drop() -> Result<()> {
    let mut store = Store::open(healthy_medium(), &config())?;
    let old = store.mirror().stored_checksum(SegmentId::Io);

    {
        let mut io = store.edit::<Io>();
        io.led_brightness_config = 5;
    }

    assert_eq!(store.read::<Io>().led_brightness_config, 5);
    assert!(store.mirror().is_consistent(SegmentId::Io));
    assert_ne!(store.mirror().stored_checksum(SegmentId::Io), old);
    Ok(())
}

#[test]
fn edit_leaves_other_segments_alone() -> Result<()> {
    let mut store = Store::open(healthy_medium(), &config())?;
    let before = store.mirror().clone();

    store.edit::<Alarm>().home_address = Text::new("Elsewhere").unwrap();

    for id in SegmentId::ALL {
        if id != SegmentId::Alarm {
            assert_eq!(store.mirror().segment(id), before.segment(id), "{} changed", id);
        }
    }
    Ok(())
}

#[test]
fn unchanged_guard_does_not_heal_corruption() -> Result<()> {
    let mut medium = healthy_medium();
    corrupt_fields(&mut medium, SegmentId::Extension);
    let mut store = Store::open(medium, &config())?;

    {
        let ext = store.edit::<Extension>();
        assert_eq!(ext.char1, b'G' ^ 0x01);
    }
    assert!(!store.mirror().is_consistent(SegmentId::Extension));
    Ok(())
}

#[test]
fn update_returns_closure_result() -> Result<()> {
    let mut store = Store::open(healthy_medium(), &config())?;
    let previous = store.update(|io: &mut Io| {
        let previous = io.led_brightness_run;
        io.led_brightness_run = previous / 2;
        previous
    });

    assert_eq!(previous, PWM_RANGE);
    assert_eq!(store.read::<Io>().led_brightness_run, PWM_RANGE / 2);
    Ok(())
}

#[test]
fn raw_guard_exposes_fields_only() -> Result<()> {
    let mut store = Store::open(healthy_medium(), &config())?;
    let raw = store.edit_raw(SegmentId::Extension);
    assert_eq!(raw.id(), SegmentId::Extension);
    assert_eq!(&raw[..], b"GR");
    Ok(())
}

#[test]
fn raw_guard_refreshes_checksum_on_drop() -> Result<()> {
    let mut store = Store::open(healthy_medium(), &config())?;
    {
        let mut raw = store.edit_raw(SegmentId::Extension);
        raw.copy_from_slice(b"ok");
    }

    assert!(store.mirror().is_consistent(SegmentId::Extension));
    assert_eq!(store.read::<Extension>(), Extension { char1: b'o', char2: b'k' });
    Ok(())
}

#[test]
fn mark_dirty_accepts_current_contents() -> Result<()> {
    let mut medium = healthy_medium();
    corrupt_fields(&mut medium, SegmentId::Extension);
    let mut store = Store::open(medium, &config())?;
    let fields = store.mirror().fields(SegmentId::Extension).to_vec();

    store.mark_dirty(SegmentId::Extension);
    assert!(store.mirror().is_consistent(SegmentId::Extension));
    assert_eq!(store.mirror().fields(SegmentId::Extension), &fields[..]);

    store.commit()?;
    let store = Store::open(store.into_medium(), &config())?;
    assert!(store.boot_report().recovery.restored.is_empty());
    Ok(())
}

#[test]
fn mark_dirty_touches_only_checksum_bytes() -> Result<()> {
    let mut store = Store::open(healthy_medium(), &config())?;
    let before = *store.mirror().as_bytes();

    store.mark_dirty(SegmentId::Messaging);

    assert_eq!(store.mirror().as_bytes(), &before);
    Ok(())
}

#[test]
fn guard_cannot_lower_or_overflow_error_counter() -> Result<()> {
    let mut store = Store::open(RamMedium::new(CAPACITY), &config())?;
    assert_eq!(store.read::<Meta>().error_counter, 1);

    store.update(|m: &mut Meta| m.error_counter = 0);
    assert_eq!(store.read::<Meta>().error_counter, 1);

    store.update(|m: &mut Meta| {
        m.error_counter = 60000;
        m.version = 7;
    });
    let meta = store.read::<Meta>();
    assert_eq!(meta.error_counter, 1);
    assert_eq!(meta.version, 7);
    assert!(store.mirror().is_consistent(SegmentId::Meta));
    store.commit()?;

    let store = Store::open(store.into_medium(), &config())?;
    assert!(store.boot_report().recovery.is_clean());
    assert_eq!(store.read::<Meta>().error_counter, 1);
    Ok(())
}

#[test]
fn counter_only_edit_leaves_meta_untouched() -> Result<()> {
    let mut store = Store::open(medium_with_counter(5), &config())?;
    let before = store.mirror().segment(SegmentId::Meta).to_vec();

    store.edit::<Meta>().error_counter = 9999;

    assert_eq!(store.mirror().segment(SegmentId::Meta), &before[..]);
    Ok(())
}

#[test]
fn raw_guard_cannot_rewrite_error_counter() -> Result<()> {
    let mut store = Store::open(medium_with_counter(5), &config())?;

    {
        let mut raw = store.edit_raw(SegmentId::Meta);
        raw[..2].copy_from_slice(&0u16.to_le_bytes());
        raw[2..4].copy_from_slice(&8u16.to_le_bytes());
    }

    let meta = store.read::<Meta>();
    assert_eq!(meta.error_counter, 5);
    assert_eq!(meta.version, 8);
    assert!(store.mirror().is_consistent(SegmentId::Meta));
    Ok(())
}
