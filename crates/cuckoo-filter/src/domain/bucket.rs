//! Fixed-capacity bucket of fingerprint slots.
//!
//! A slot holding `0` is empty. Slot position carries no meaning; every
//! operation is a linear scan over at most `capacity` slots.

use rand::Rng;

use super::hash_functions::Fingerprint;

/// Empty-slot sentinel.
pub const EMPTY_SLOT: Fingerprint = 0;

/// A bucket containing up to `capacity` fingerprints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bucket {
    slots: Vec<Fingerprint>,
}

impl Bucket {
    /// Create an empty bucket with `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![EMPTY_SLOT; capacity],
        }
    }

    /// Store `fp` in the first empty slot.
    ///
    /// Returns `false` without mutating if `fp` is zero or the bucket is full.
    pub fn insert(&mut self, fp: Fingerprint) -> bool {
        if fp == EMPTY_SLOT {
            return false;
        }
        match self.slots.iter_mut().find(|slot| **slot == EMPTY_SLOT) {
            Some(slot) => {
                *slot = fp;
                true
            }
            None => false,
        }
    }

    /// Clear the first slot holding `fp`.
    ///
    /// Only one copy is removed per call when duplicates are present.
    pub fn remove(&mut self, fp: Fingerprint) -> bool {
        if fp == EMPTY_SLOT {
            return false;
        }
        match self.slots.iter_mut().find(|slot| **slot == fp) {
            Some(slot) => {
                *slot = EMPTY_SLOT;
                true
            }
            None => false,
        }
    }

    /// Check if fingerprint exists.
    pub fn contains(&self, fp: Fingerprint) -> bool {
        fp != EMPTY_SLOT && self.slots.contains(&fp)
    }

    /// Number of slots holding `fp`.
    pub fn count(&self, fp: Fingerprint) -> usize {
        if fp == EMPTY_SLOT {
            return 0;
        }
        self.slots.iter().filter(|&&slot| slot == fp).count()
    }

    /// Clear a uniformly chosen occupied slot and return its fingerprint.
    ///
    /// Returns `0` if the bucket is empty.
    pub fn evict_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Fingerprint {
        match self.random_occupied_slot(rng) {
            Some(slot) => self.replace(slot, EMPTY_SLOT),
            None => EMPTY_SLOT,
        }
    }

    /// True iff no slot is empty.
    pub fn is_full(&self) -> bool {
        !self.slots.contains(&EMPTY_SLOT)
    }

    /// True iff every slot is empty.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|&slot| slot == EMPTY_SLOT)
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|&&slot| slot != EMPTY_SLOT).count()
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Occupied fingerprints in slot order.
    pub fn iter(&self) -> impl Iterator<Item = Fingerprint> + '_ {
        self.slots.iter().copied().filter(|&slot| slot != EMPTY_SLOT)
    }

    /// Overwrite a uniformly chosen occupied slot with `fp`.
    ///
    /// Returns the slot index and the fingerprint it held, or `None` if the
    /// bucket is empty.
    pub(crate) fn swap_random<R: Rng + ?Sized>(
        &mut self,
        fp: Fingerprint,
        rng: &mut R,
    ) -> Option<(usize, Fingerprint)> {
        let slot = self.random_occupied_slot(rng)?;
        Some((slot, self.replace(slot, fp)))
    }

    /// Overwrite `slot` and return its previous content.
    pub(crate) fn replace(&mut self, slot: usize, fp: Fingerprint) -> Fingerprint {
        std::mem::replace(&mut self.slots[slot], fp)
    }

    fn random_occupied_slot<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        let occupied = self.len();
        if occupied == 0 {
            return None;
        }
        let nth = rng.gen_range(0..occupied);
        self.slots
            .iter()
            .enumerate()
            .filter(|&(_, &slot)| slot != EMPTY_SLOT)
            .nth(nth)
            .map(|(idx, _)| idx)
    }
}
