//! Record selection predicates.
//!
//! Matching is case-insensitive substring containment per segment. The first
//! record that satisfies a predicate wins; there is no ranking.

use crate::label::LabelRecord;

/// True when the record lists exactly one substance and it contains `segment`.
///
/// Counts use every listed entry, so a non-string entry still counts as a
/// substance even though it can never match a segment.
pub(crate) fn is_single_substance_match(record: &LabelRecord, segment: &str) -> bool {
    record.substance_count() == 1
        && record
            .substance_names()
            .first()
            .is_some_and(|only| contains_ignore_case(only, segment))
}

/// True when the record lists exactly `segments.len()` substances and every
/// segment is contained in one of them.
///
/// Two segments may match the same entry; no one-to-one pairing is enforced.
pub(crate) fn is_compound_match(record: &LabelRecord, segments: &[String]) -> bool {
    let names = record.substance_names();
    record.substance_count() == segments.len()
        && segments
            .iter()
            .all(|segment| names.iter().any(|name| contains_ignore_case(name, segment)))
}

/// First record in document order satisfying `predicate`.
pub(crate) fn first_match<'a, F>(records: &'a [LabelRecord], predicate: F) -> Option<&'a LabelRecord>
where
    F: Fn(&LabelRecord) -> bool,
{
    records.iter().find(|record| predicate(record))
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
