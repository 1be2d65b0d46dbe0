//! Centromere detection from empty contact-matrix rows.
//!
//! The centromere is taken to be the longest run of rows whose contacts sum to
//! zero. Successive experiments can only narrow an existing estimate.

use log::{debug, warn};

use crate::types::{Centromere, ContactMatrix, TadSet};

/// Finds the longest run of all-zero rows in `hic`, as `[begin, end)`.
///
/// Equal-length runs keep the first one found. A run still open at the last
/// row is closed at the last row index, so that row is left out of it.
/// Returns `None` when no run of positive length exists.
pub fn largest_empty_run(hic: &ContactMatrix) -> Option<Centromere> {
    let mut best: Option<Centromere> = None;
    let mut open: Option<usize> = None;
    let mut last = 0;

    for (pos, row) in hic.rows().enumerate() {
        last = pos;
        let empty = row.iter().sum::<f64>() == 0.0;
        match (empty, open) {
            (true, None) => open = Some(pos),
            (false, Some(beg)) => {
                close(beg, pos, &mut best);
                open = None;
            }
            _ => {}
        }
    }
    if let Some(beg) = open {
        close(beg, last, &mut best);
    }
    best
}

fn close(beg: usize, end: usize, best: &mut Option<Centromere>) {
    let width = end.saturating_sub(beg);
    if width > best.map_or(0, |b| b.width()) {
        *best = Some(Centromere::new(beg, end));
    }
}

/// Folds a new estimate into the chromosome-wide centromere.
///
/// With no current interval the estimate is taken as is. Otherwise each side
/// can only move inward; TADs of this experiment that bordered the old side
/// follow it and are re-signed. An estimate that does not overlap the current
/// interval is ignored.
pub fn reconcile(
    current: &mut Option<Centromere>,
    found: Centromere,
    tads: &mut TadSet,
    resolution: u64,
    max_tad_size: Option<u64>,
) -> Centromere {
    let Some(cen) = current.as_mut() else {
        *current = Some(found);
        return found;
    };
    if found.end <= cen.begin || found.begin >= cen.end {
        warn!("centromere estimate {} does not overlap current interval {}, ignored", found, cen);
        return *cen;
    }

    if found.begin > cen.begin {
        for tad in tads.iter_mut().filter(|t| t.end == cen.begin) {
            debug!("TAD end {} follows centromere begin to {}", tad.end, found.begin);
            tad.set_end(found.begin);
            tad.rescore(resolution, max_tad_size);
        }
        cen.begin = found.begin;
    }
    if found.end < cen.end {
        for tad in tads.iter_mut().filter(|t| t.start == cen.end) {
            debug!("TAD start {} follows centromere end to {}", tad.start, found.end);
            tad.start = found.end;
            tad.rescore(resolution, max_tad_size);
        }
        cen.end = found.end;
    }
    *cen
}
