//! Parameter override store.
//!
//! [`Calibration`] keeps a minimal partition of the targets that have been
//! assigned parameters. Each [`ParameterGroup`] maps a non-empty set of
//! targets to the value they currently share. Overlapping writes resolve
//! last-write-wins per target:
//!
//! ```rust
//! use evo_coord::calibration::{Calibration, ParameterGroup};
//!
//! let mut cal = Calibration::<u8, i32>::new();
//! cal.set(0b10101, 0);
//! cal.set(0b00111, 1);
//!
//! assert_eq!(
//!     cal.get(),
//!     &[
//!         ParameterGroup { targets: 0b10000, params: 0 },
//!         ParameterGroup { targets: 0b00111, params: 1 },
//!     ]
//! );
//! ```
//!
//! Groups are never merged across separate `set` calls, even if they carry
//! equal parameters. The store is not synchronized; concurrent writers must
//! serialize externally.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::target_set::TargetSet;

/// A set of targets sharing one parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterGroup<B, P> {
    /// Targets the parameters apply to. Never empty inside a [`Calibration`].
    pub targets: B,
    /// Parameter value.
    pub params: P,
}

/// Ordered, pairwise-disjoint parameter groups.
///
/// Order is the insertion order of the surviving groups.
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration<B, P> {
    groups: Vec<ParameterGroup<B, P>>,
}

impl<B, P> Default for Calibration<B, P> {
    fn default() -> Self {
        Self { groups: Vec::new() }
    }
}

impl<B: TargetSet, P> Calibration<B, P> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `params` to every target in `targets`.
    ///
    /// Targets are stripped from the groups they previously belonged to and
    /// groups left without targets are dropped. An empty `targets` set is a
    /// no-op.
    pub fn set(&mut self, targets: B, params: P) {
        if targets.is_none() {
            return;
        }

        for group in &mut self.groups {
            group.targets.strip(&targets);
        }

        let before = self.groups.len();
        self.groups.retain(|group| !group.targets.is_none());
        trace!(
            pruned = before - self.groups.len(),
            targets = targets.count(),
            "calibration group added"
        );

        self.groups.push(ParameterGroup { targets, params });
    }

    /// Parameters currently assigned to `target`, if any.
    pub fn lookup(&self, target: usize) -> Option<&P> {
        self.groups
            .iter()
            .find(|group| group.targets.contains(target))
            .map(|group| &group.params)
    }

    /// Union of all assigned targets.
    pub fn assigned(&self) -> B {
        self.groups.iter().fold(B::default(), |mut all, group| {
            all.union_with(&group.targets);
            all
        })
    }
}

impl<B, P> Calibration<B, P> {
    /// Read-only view of the current groups.
    pub fn get(&self) -> &[ParameterGroup<B, P>] {
        &self.groups
    }

    /// Consume the store and take its groups.
    pub fn into_groups(self) -> Vec<ParameterGroup<B, P>> {
        self.groups
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// `true` when no target has been assigned parameters.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterate over the groups in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, ParameterGroup<B, P>> {
        self.groups.iter()
    }
}

impl<B, P> IntoIterator for Calibration<B, P> {
    type Item = ParameterGroup<B, P>;
    type IntoIter = std::vec::IntoIter<ParameterGroup<B, P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

impl<'a, B, P> IntoIterator for &'a Calibration<B, P> {
    type Item = &'a ParameterGroup<B, P>;
    type IntoIter = std::slice::Iter<'a, ParameterGroup<B, P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
