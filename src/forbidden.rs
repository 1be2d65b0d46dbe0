use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::types::{Centromere, TadSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForbiddenReason {
    Centromere,
}

impl Display for ForbiddenReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForbiddenReason::Centromere => write!(f, "Centromere"),
        }
    }
}

/// Bins of a chromosome with no reliable information in any experiment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForbiddenRegions {
    bins: BTreeMap<usize, Option<ForbiddenReason>>,
}

impl ForbiddenRegions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn contains(&self, bin: usize) -> bool {
        self.bins.contains_key(&bin)
    }

    pub fn reason(&self, bin: usize) -> Option<ForbiddenReason> {
        self.bins.get(&bin).copied().flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Option<ForbiddenReason>)> + '_ {
        self.bins.iter().map(|(b, r)| (*b, *r))
    }

    pub fn bins(&self) -> impl Iterator<Item = usize> + '_ {
        self.bins.keys().copied()
    }

    /// Folds one experiment's contribution in. The first contribution is taken
    /// as is; later ones are intersected, so a bin survives only while every
    /// experiment seen so far flags it. Reasons of surviving bins are dropped.
    pub fn merge(&mut self, contribution: BTreeSet<usize>) {
        if self.bins.is_empty() {
            self.bins = contribution.into_iter().map(|b| (b, None)).collect();
        } else {
            self.bins = contribution
                .into_iter()
                .filter(|b| self.bins.contains_key(b))
                .map(|b| (b, None))
                .collect();
        }
    }

    /// Adds every centromere bin, regardless of previous intersections.
    pub fn mark_centromere(&mut self, centromere: &Centromere) {
        for bin in centromere.bins() {
            self.bins.insert(bin, Some(ForbiddenReason::Centromere));
        }
    }
}

/// Re-signs every record against `max_tad_size` and collects the bins
/// `[start, end]` of oversized ones.
pub fn contribution(tads: &mut TadSet, resolution: u64, max_tad_size: Option<u64>) -> BTreeSet<usize> {
    let mut forbidden = BTreeSet::new();
    for tad in tads.iter_mut() {
        if tad.rescore(resolution, max_tad_size) {
            forbidden.extend(tad.start..=tad.end);
        }
    }
    forbidden
}
