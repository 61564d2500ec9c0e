use std::collections::HashSet;

use crate::domain::{RawRecord, Venue};
use crate::normalize::NormalizedRecord;

/// Anything carrying the venue identity key.
pub trait Identified {
    fn identity(&self) -> i64;
}

impl Identified for RawRecord {
    fn identity(&self) -> i64 {
        self.venue_id
    }
}

impl Identified for NormalizedRecord {
    fn identity(&self) -> i64 {
        self.venue_id()
    }
}

impl Identified for Venue {
    fn identity(&self) -> i64 {
        self.venue_id
    }
}

impl<T: Identified + ?Sized> Identified for &T {
    fn identity(&self) -> i64 {
        (**self).identity()
    }
}

/// Keep the first occurrence of each identity, preserving order.
///
/// Run this after matching: a venue listed once per event must get the
/// chance to match on any of its rows before the extra rows are dropped.
pub fn dedupe<T, I>(records: I) -> Vec<T>
where
    T: Identified,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.identity()))
        .collect()
}
