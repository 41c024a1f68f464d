//! Category segmentation for membership metrics.
//!
//! Tier and program type are both exhaustive, non-overlapping keys, so any
//! additive metric summed over a segmentation equals the unsegmented total.

use crate::types::{MembershipRecord, ProgramType, Tier};
use std::collections::BTreeMap;

pub trait SegmentKey: Copy + Ord + std::fmt::Debug + 'static {
    fn all() -> &'static [Self];
    fn of(membership: &MembershipRecord) -> Self;
    fn as_str(&self) -> &'static str;
}

impl SegmentKey for Tier {
    fn all() -> &'static [Self] {
        &Tier::ALL
    }

    fn of(membership: &MembershipRecord) -> Self {
        membership.tier
    }

    fn as_str(&self) -> &'static str {
        Tier::as_str(self)
    }
}

impl SegmentKey for ProgramType {
    fn all() -> &'static [Self] {
        &ProgramType::ALL
    }

    /// Missing program types land in the default track.
    fn of(membership: &MembershipRecord) -> Self {
        membership.program()
    }

    fn as_str(&self) -> &'static str {
        ProgramType::as_str(self)
    }
}

/// Partition `members` by key. Every key is present, possibly empty.
pub fn partition<'a, K: SegmentKey>(
    members: &[&'a MembershipRecord],
) -> BTreeMap<K, Vec<&'a MembershipRecord>> {
    let mut out: BTreeMap<K, Vec<&'a MembershipRecord>> =
        K::all().iter().map(|k| (*k, Vec::new())).collect();
    for m in members {
        out.entry(K::of(m)).or_default().push(*m);
    }
    out
}

/// Owned-slice variant of `partition`, for functions that need `&[MembershipRecord]`.
pub fn partition_owned<K: SegmentKey>(
    memberships: &[MembershipRecord],
) -> BTreeMap<K, Vec<MembershipRecord>> {
    let mut out: BTreeMap<K, Vec<MembershipRecord>> =
        K::all().iter().map(|k| (*k, Vec::new())).collect();
    for m in memberships {
        out.entry(K::of(m)).or_default().push(m.clone());
    }
    out
}
