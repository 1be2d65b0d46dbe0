//! Rewrites an experiment's TAD records around a confirmed centromere so that
//! no record crosses it.

use log::debug;

use crate::types::{Centromere, Tad, TadSet};

/// How the centromere sat relative to the TAD records before splitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlap {
    /// A record held the whole centromere strictly inside it.
    Straddle,
    /// A record started on the centromere begin and ran past its end.
    StartAligned,
    /// A record ended on the centromere end and started before its begin.
    EndAligned,
    /// Nothing crossed the centromere.
    None,
}

/// Splits or trims the records overlapping `cen`, re-signing every changed
/// record against `max_tad_size`. Shapes are tested in the order of
/// [`Overlap`]'s variants and only the first matching one is applied. An
/// empty interval touches nothing.
pub fn split_tads(tads: &mut TadSet, cen: Centromere, resolution: u64, max_tad_size: Option<u64>) -> Overlap {
    if cen.is_empty() {
        return Overlap::None;
    }
    let (beg, end) = (cen.begin, cen.end);
    let records = tads.records_mut();

    let straddles = |t: &Tad| t.start < beg && beg < end && end < t.end;
    if records.iter().any(straddles) {
        for pos in (0..records.len()).rev() {
            if !straddles(&records[pos]) {
                continue;
            }
            let (lower, upper) = cut(&records[pos], beg, end, resolution, max_tad_size);
            debug!("TAD {} split into {:?} and {:?}", pos + 1, lower, upper);
            records[pos] = lower;
            records.insert(pos + 1, upper);
        }
        return Overlap::Straddle;
    }

    if records.iter().any(|t| t.start == beg && t.end > end) {
        for tad in records.iter_mut().filter(|t| t.start == beg && t.end > end) {
            debug!("TAD start {} pushed past centromere to {}", tad.start, end);
            tad.start = end;
            tad.rescore(resolution, max_tad_size);
        }
        return Overlap::StartAligned;
    }

    let end_aligned = |t: &Tad| t.end == end && t.start < beg;
    if records.iter().any(end_aligned) {
        for pos in (0..records.len()).rev() {
            if !end_aligned(&records[pos]) {
                continue;
            }
            // the upper part covers the centromere itself
            let (lower, upper) = cut(&records[pos], beg, beg, resolution, max_tad_size);
            debug!("TAD {} split at centromere begin into {:?} and {:?}", pos + 1, lower, upper);
            records[pos] = lower;
            records.insert(pos + 1, upper);
        }
        return Overlap::EndAligned;
    }

    Overlap::None
}

/// Cuts `tad` into `[start, lower_end]` and `[upper_start, end]`.
fn cut(tad: &Tad, lower_end: usize, upper_start: usize, resolution: u64, max_tad_size: Option<u64>) -> (Tad, Tad) {
    let mut upper = tad.clone();
    upper.start = upper_start;
    upper.brk = upper.end;
    upper.rescore(resolution, max_tad_size);

    let mut lower = tad.clone();
    lower.set_end(lower_end);
    lower.rescore(resolution, max_tad_size);

    (lower, upper)
}
