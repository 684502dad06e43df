use std::ops::{Deref, DerefMut};

use layout::{Meta, Mirror, Segment, SegmentId};
use medium::Medium;

use crate::Store;

/// Typed, scoped write access to one segment.
///
/// Derefs to a decoded copy of the segment. When the guard is dropped the
/// copy is encoded back into the mirror and the segment checksum refreshed,
/// so mutated data can never reach the medium without a matching checksum.
/// If the value was not changed the mirror is left untouched. Fields the
/// store maintains itself, such as the meta error counter, are put back
/// before the compare.
pub struct SegmentGuard<'a, S: Segment> {
    mirror: &'a mut Mirror,
    original: S,
    value: S,
}

impl<'a, S: Segment> SegmentGuard<'a, S> {
    fn new(mirror: &'a mut Mirror) -> Self {
        let original: S = mirror.read();
        Self {
            mirror,
            value: original.clone(),
            original,
        }
    }
}

impl<S: Segment> Deref for SegmentGuard<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.value
    }
}

impl<S: Segment> DerefMut for SegmentGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.value
    }
}

impl<S: Segment> Drop for SegmentGuard<'_, S> {
    fn drop(&mut self) {
        self.value.keep_protected(&self.original);
        if self.value != self.original {
            self.mirror.write(&self.value);
        }
    }
}

/// Byte-level, scoped write access to the fields of one segment.
///
/// The footer is out of reach; the checksum is refreshed when the guard is
/// dropped. Byte edits to the meta error counter are undone.
pub struct RawSegmentGuard<'a> {
    mirror: &'a mut Mirror,
    id: SegmentId,
    meta_before: Option<Meta>,
}

impl RawSegmentGuard<'_> {
    #[must_use]
    pub fn id(&self) -> SegmentId {
        self.id
    }
}

impl Deref for RawSegmentGuard<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.mirror.fields(self.id)
    }
}

impl DerefMut for RawSegmentGuard<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.mirror.fields_mut(self.id)
    }
}

impl Drop for RawSegmentGuard<'_> {
    fn drop(&mut self) {
        if let Some(before) = &self.meta_before {
            let mut meta: Meta = self.mirror.read();
            if meta.error_counter != before.error_counter {
                meta.keep_protected(before);
                self.mirror.write(&meta);
            }
        }
        self.mirror.refresh_checksum(self.id);
    }
}

impl<M: Medium> Store<M> {
    /// Opens segment `S` for editing. Changes land in the mirror, with a
    /// fresh checksum, when the guard goes out of scope.
    pub fn edit<S: Segment>(&mut self) -> SegmentGuard<'_, S> {
        SegmentGuard::new(&mut self.mirror)
    }

    /// Applies `f` to segment `S` and stores the result.
    pub fn update<S: Segment, R>(&mut self, f: impl FnOnce(&mut S) -> R) -> R {
        let mut guard = self.edit::<S>();
        f(&mut guard)
    }

    /// Opens the raw field bytes of segment `id` for editing.
    pub fn edit_raw(&mut self, id: SegmentId) -> RawSegmentGuard<'_> {
        let meta_before = (id == SegmentId::Meta).then(|| self.mirror.read::<Meta>());
        RawSegmentGuard {
            mirror: &mut self.mirror,
            id,
            meta_before,
        }
    }

    /// Accepts the current contents of segment `id` by recomputing its
    /// checksum. Touches only the four checksum bytes.
    pub fn mark_dirty(&mut self, id: SegmentId) {
        self.mirror.refresh_checksum(id);
    }
}
