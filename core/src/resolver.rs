//! Point-in-time membership resolver.
//!
//! Historical reconstruction always works from the date fields, never from
//! `status`. Status is consulted only by `current_members`, which answers
//! "right now" questions.
//!
//! Two bucket predicates exist and must not be swapped:
//!   - `active_through_bucket`: overlapping the bucket at any point.
//!     Used for stock metrics (MRR, member count).
//!   - `active_at_bucket_start`: active at the bucket's first instant.
//!     Used as the churn-rate denominator.

use crate::{
    interval::Bucket,
    types::{MembershipRecord, MembershipStatus, Timestamp},
};

/// `start <= instant` and the membership has not ended before `instant`.
pub fn is_active_at(membership: &MembershipRecord, instant: Timestamp) -> bool {
    membership.starts_at() <= instant
        && membership.ends_at().map_or(true, |end| end >= instant)
}

pub fn active_at(memberships: &[MembershipRecord], instant: Timestamp) -> Vec<&MembershipRecord> {
    memberships.iter().filter(|m| is_active_at(m, instant)).collect()
}

/// Started on or before the bucket's end and not ended before its start.
pub fn is_active_through_bucket(membership: &MembershipRecord, bucket: &Bucket) -> bool {
    membership.starts_at() <= bucket.end
        && membership.ends_at().map_or(true, |end| end >= bucket.start)
}

pub fn active_through_bucket<'a>(
    memberships: &'a [MembershipRecord],
    bucket: &Bucket,
) -> Vec<&'a MembershipRecord> {
    memberships
        .iter()
        .filter(|m| is_active_through_bucket(m, bucket))
        .collect()
}

pub fn active_at_bucket_start<'a>(
    memberships: &'a [MembershipRecord],
    bucket: &Bucket,
) -> Vec<&'a MembershipRecord> {
    active_at(memberships, bucket.start)
}

/// Memberships whose stored status is `active`.
pub fn current_members(memberships: &[MembershipRecord]) -> Vec<&MembershipRecord> {
    memberships
        .iter()
        .filter(|m| m.status == MembershipStatus::Active)
        .collect()
}
