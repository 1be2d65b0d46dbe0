use std::fmt::{self, Display};
use std::ops::Range;

use serde::{Deserialize, Serialize};

/// One TAD record, in bin units.
///
/// The sign of `score` encodes validity: a negative score marks a TAD longer
/// than the chromosome's `max_tad_size`. `brk` is the last bin before the next
/// inter-TAD gap and follows `end` whenever `end` moves.
///
/// A zero score has no usable sign: an oversized TAD scored `0.0` becomes
/// `-0.0`, which does not compare below zero. Use [`Tad::is_flagged`] to read
/// the flag back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tad {
    pub start: usize,
    pub end: usize,
    pub score: f64,
    pub brk: usize,
}

impl Tad {
    pub fn new(start: usize, end: usize, score: f64) -> Self {
        Self {
            start,
            end,
            score,
            brk: end,
        }
    }

    /// Length in bins.
    pub fn width(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Length in base pairs at the given resolution.
    pub fn length_bp(&self, resolution: u64) -> u64 {
        self.width() as u64 * resolution
    }

    pub fn is_oversized(&self, resolution: u64, max_tad_size: Option<u64>) -> bool {
        max_tad_size.is_some_and(|max| self.length_bp(resolution) > max)
    }

    /// Applies the sign convention to `score`, keeping its magnitude.
    /// Returns `true` when the record is oversized.
    pub fn rescore(&mut self, resolution: u64, max_tad_size: Option<u64>) -> bool {
        let oversized = self.is_oversized(resolution, max_tad_size);
        self.score = if oversized {
            -self.score.abs()
        } else {
            self.score.abs()
        };
        oversized
    }

    /// Whether the score carries the oversized flag, `-0.0` included.
    pub fn is_flagged(&self) -> bool {
        self.score.is_sign_negative()
    }

    /// Moves `end`, keeping `brk` in step.
    pub fn set_end(&mut self, end: usize) {
        self.end = end;
        self.brk = end;
    }
}

/// Ordered TAD records of one experiment.
///
/// Records are addressed by 1-based index, which is the numbering used by TAD
/// files. Splitting inserts at a position and everything after it shifts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TadSet {
    records: Vec<Tad>,
}

impl TadSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record at 1-based `index`.
    pub fn get(&self, index: usize) -> Option<&Tad> {
        index.checked_sub(1).and_then(|i| self.records.get(i))
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Tad> {
        index.checked_sub(1).and_then(move |i| self.records.get_mut(i))
    }

    pub fn push(&mut self, tad: Tad) {
        self.records.push(tad);
    }

    /// Inserts `tad` so that it becomes record `index` (1-based).
    pub fn insert(&mut self, index: usize, tad: Tad) {
        let pos = index.saturating_sub(1).min(self.records.len());
        self.records.insert(pos, tad);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tad> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Tad> {
        self.records.iter_mut()
    }

    /// `(index, record)` pairs with 1-based indices.
    pub fn indexed(&self) -> impl Iterator<Item = (usize, &Tad)> {
        self.records.iter().enumerate().map(|(i, t)| (i + 1, t))
    }

    pub fn max_end(&self) -> Option<usize> {
        self.records.iter().map(|t| t.end).max()
    }

    pub(crate) fn records_mut(&mut self) -> &mut Vec<Tad> {
        &mut self.records
    }
}

impl FromIterator<Tad> for TadSet {
    fn from_iter<I: IntoIterator<Item = Tad>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a TadSet {
    type Item = &'a Tad;
    type IntoIter = std::slice::Iter<'a, Tad>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Square contact matrix stored row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMatrix")]
pub struct ContactMatrix {
    size: usize,
    values: Vec<f64>,
}

#[derive(Deserialize)]
struct RawMatrix {
    size: usize,
    values: Vec<f64>,
}

impl TryFrom<RawMatrix> for ContactMatrix {
    type Error = String;

    fn try_from(raw: RawMatrix) -> Result<Self, Self::Error> {
        let (size, cells) = (raw.size, raw.values.len());
        ContactMatrix::from_flat(raw.values, size)
            .ok_or_else(|| format!("contact matrix of size {} holds {} values", size, cells))
    }
}

impl ContactMatrix {
    /// Returns `None` unless `values` holds exactly `size * size` cells.
    pub fn from_flat(values: Vec<f64>, size: usize) -> Option<Self> {
        (values.len() == size * size).then_some(Self { size, values })
    }

    pub fn from_rows(rows: Vec<Vec<f64>>) -> Option<Self> {
        let size = rows.len();
        if rows.iter().any(|r| r.len() != size) {
            return None;
        }
        Some(Self {
            size,
            values: rows.into_iter().flatten().collect(),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn row(&self, r: usize) -> &[f64] {
        &self.values[r * self.size..(r + 1) * self.size]
    }

    pub fn rows(&self) -> std::slice::Chunks<'_, f64> {
        self.values.chunks(self.size.max(1))
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.size + col]
    }
}

/// Centromere interval `[begin, end)` in bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Centromere {
    pub begin: usize,
    pub end: usize,
}

impl Centromere {
    pub fn new(begin: usize, end: usize) -> Self {
        Self { begin, end }
    }

    pub fn bins(&self) -> Range<usize> {
        self.begin..self.end
    }

    pub fn width(&self) -> usize {
        self.end.saturating_sub(self.begin)
    }

    pub fn is_empty(&self) -> bool {
        self.begin >= self.end
    }
}

impl Display for Centromere {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.begin, self.end)
    }
}

/// Absolute chromosome size in base pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChromosomeSize(u64);

impl ChromosomeSize {
    pub fn new(bp: u64) -> Self {
        Self(bp)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl Display for ChromosomeSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Chromosome size minus its forbidden regions, in base pairs.
///
/// Only meaningful for randomized TAD alignment statistics, never as a genomic
/// coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelativeChromosomeSize(u64);

impl RelativeChromosomeSize {
    pub fn new(bp: u64) -> Self {
        Self(bp)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl Display for RelativeChromosomeSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
