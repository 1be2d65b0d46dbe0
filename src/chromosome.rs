use std::collections::BTreeMap;
use std::fmt::{self, Display};

use log::{debug, info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::centromere::{largest_empty_run, reconcile};
use crate::collections::{Alignment, AlignmentRegistry, ExperimentList};
use crate::error::{Error, Result};
use crate::experiment::{AttachRequest, Experiment};
use crate::forbidden::{self, ForbiddenRegions};
use crate::io;
use crate::split::{split_tads, Overlap};
use crate::types::{Centromere, ChromosomeSize, ContactMatrix, RelativeChromosomeSize, Tad, TadSet};

/// Construction settings for a [`Chromosome`].
#[derive(Debug, Clone, Default)]
pub struct ChromosomeOptions {
    pub species: Option<String>,
    pub assembly: Option<String>,
    /// TADs longer than this (bp) are flagged unreliable. `None` is unlimited.
    pub max_tad_size: Option<u64>,
    /// Fixed chromosome length in bp. `None` or 0 infers it from the TADs.
    pub chr_len: Option<u64>,
    pub centromere_search: bool,
    pub description: BTreeMap<String, String>,
}

impl ChromosomeOptions {
    pub fn max_tad_size(mut self, bp: u64) -> Self {
        self.max_tad_size = Some(bp);
        self
    }

    pub fn chr_len(mut self, bp: u64) -> Self {
        self.chr_len = Some(bp);
        self
    }

    pub fn centromere_search(mut self, on: bool) -> Self {
        self.centromere_search = on;
        self
    }

    pub fn species(mut self, species: impl Into<String>) -> Self {
        self.species = Some(species.into());
        self
    }

    pub fn assembly(mut self, assembly: impl Into<String>) -> Self {
        self.assembly = Some(assembly.into());
        self
    }

    pub fn describe(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.description.insert(key.into(), value.into());
        self
    }
}

/// TAD predictions from several Hi-C experiments on one chromosome.
///
/// Every attached experiment refines the chromosome-wide forbidden regions,
/// the centromere interval and the chromosome size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chromosome {
    pub name: String,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub assembly: Option<String>,
    #[serde(default)]
    pub description: BTreeMap<String, String>,

    size: ChromosomeSize,
    relative_size: RelativeChromosomeSize,
    #[serde(default)]
    given_size: bool,
    max_tad_size: Option<u64>,
    forbidden: ForbiddenRegions,
    centromere: Option<Centromere>,
    #[serde(default)]
    centromere_search: bool,
    experiments: ExperimentList,
    #[serde(default)]
    alignments: AlignmentRegistry,
}

impl Chromosome {
    pub fn new(name: impl Into<String>, options: ChromosomeOptions) -> Self {
        let chr_len = options.chr_len.unwrap_or(0);
        Self {
            name: name.into(),
            species: options.species,
            assembly: options.assembly,
            description: options.description,
            size: ChromosomeSize::new(chr_len),
            relative_size: RelativeChromosomeSize::new(chr_len),
            given_size: chr_len > 0,
            max_tad_size: options.max_tad_size,
            forbidden: ForbiddenRegions::new(),
            centromere: None,
            centromere_search: options.centromere_search,
            experiments: ExperimentList::new(),
            alignments: AlignmentRegistry::new(),
        }
    }

    /// Creates the chromosome and attaches `requests` in order.
    pub fn with_experiments<I>(name: impl Into<String>, options: ChromosomeOptions, requests: I) -> Result<Self>
    where
        I: IntoIterator<Item = AttachRequest>,
    {
        let mut crm = Self::new(name, options);
        for request in requests {
            crm.attach_experiment(request, false)?;
        }
        Ok(crm)
    }

    pub fn size(&self) -> ChromosomeSize {
        self.size
    }

    pub fn relative_size(&self) -> RelativeChromosomeSize {
        self.relative_size
    }

    pub fn is_size_fixed(&self) -> bool {
        self.given_size
    }

    pub fn max_tad_size(&self) -> Option<u64> {
        self.max_tad_size
    }

    pub fn forbidden(&self) -> &ForbiddenRegions {
        &self.forbidden
    }

    pub fn centromere(&self) -> Option<Centromere> {
        self.centromere
    }

    pub fn searches_centromere(&self) -> bool {
        self.centromere_search
    }

    pub fn experiments(&self) -> &ExperimentList {
        &self.experiments
    }

    pub fn alignments(&self) -> &AlignmentRegistry {
        &self.alignments
    }

    pub(crate) fn experiments_mut(&mut self) -> &mut ExperimentList {
        &mut self.experiments
    }

    /// Adds an experiment and folds its TADs into the forbidden regions,
    /// centromere and size. Returns the experiment's position.
    ///
    /// An experiment without a name gets a random one. A name already in use
    /// is replaced when `replace` is set and suffixed with `_` otherwise.
    pub fn attach_experiment(&mut self, request: AttachRequest, replace: bool) -> Result<usize> {
        let xpr = match request {
            AttachRequest::ByReference(mut xpr) => {
                if xpr.name.is_empty() {
                    xpr.name = random_name();
                }
                xpr
            }
            AttachRequest::ByPath {
                name,
                resolution,
                source,
            } => {
                let name = name.filter(|n| !n.is_empty()).unwrap_or_else(random_name);
                let resolution = resolution.ok_or_else(|| Error::MissingResolution(name.clone()))?;
                io::load_experiment(&name, resolution, &source)?
            }
        };

        let pos = self.experiments.insert(xpr, replace);
        self.refresh(pos);
        info!(
            "chromosome {}: attached {} ({} forbidden bins, size {})",
            self.name,
            self.experiments.at(pos).map_or("", |x| x.name.as_str()),
            self.forbidden.len(),
            self.size
        );
        Ok(pos)
    }

    pub fn get_experiment(&self, name: &str) -> Result<&Experiment> {
        self.experiments.get(name)
    }

    /// Mutable access to an experiment. Call [`Chromosome::refresh_experiment`]
    /// after changing its TADs.
    pub fn get_experiment_mut(&mut self, name: &str) -> Result<&mut Experiment> {
        self.experiments.get_mut(name)
    }

    pub fn experiment_at(&self, i: usize) -> Option<&Experiment> {
        self.experiments.at(i)
    }

    pub fn remove_experiment(&mut self, name: &str) -> Result<Experiment> {
        self.experiments.remove(name)
    }

    /// Re-derives forbidden regions, centromere and size from the named
    /// experiment's TADs.
    pub fn refresh_experiment(&mut self, name: &str) -> Result<()> {
        let pos = self
            .experiments
            .position(name)
            .ok_or_else(|| Error::ExperimentNotFound(name.to_string()))?;
        self.refresh(pos);
        Ok(())
    }

    /// Changes the TAD size threshold, re-signs every TAD and rebuilds the
    /// forbidden regions from all attached experiments.
    pub fn set_max_tad_size(&mut self, max_tad_size: Option<u64>) {
        self.max_tad_size = max_tad_size;
        for xpr in self.experiments.iter_mut() {
            let resolution = xpr.resolution;
            for tad in xpr.tads.iter_mut() {
                tad.brk = tad.end;
                tad.rescore(resolution, max_tad_size);
            }
        }
        self.forbidden = ForbiddenRegions::new();
        for pos in 0..self.experiments.len() {
            self.refresh(pos);
        }
    }

    fn refresh(&mut self, pos: usize) {
        let max_tad_size = self.max_tad_size;
        let Some(xpr) = self.experiments.at_mut(pos) else {
            return;
        };
        if xpr.tads.is_empty() {
            return;
        }
        let resolution = xpr.resolution;

        let bins = forbidden::contribution(&mut xpr.tads, resolution, max_tad_size);
        self.forbidden.merge(bins);

        if self.centromere_search {
            if let Some(found) = xpr.hic_data.as_ref().and_then(largest_empty_run) {
                let cen = reconcile(&mut self.centromere, found, &mut xpr.tads, resolution, max_tad_size);
                info!("{}: centromere estimate {}, now {}", xpr.name, found, cen);
            }
            if let Some(cen) = self.centromere {
                let shape = split_tads(&mut xpr.tads, cen, resolution, max_tad_size);
                if shape != Overlap::None {
                    debug!("{}: TADs rewritten around centromere ({:?})", xpr.name, shape);
                }
            }
        }
        if let Some(cen) = &self.centromere {
            self.forbidden.mark_centromere(cen);
        }

        let last_end = xpr.tads.max_end();
        self.update_size(last_end, resolution);
    }

    fn update_size(&mut self, last_end: Option<usize>, resolution: u64) {
        if !self.given_size {
            if let Some(end) = last_end {
                self.size = self.size.max(ChromosomeSize::new(end as u64 * resolution));
            }
        }
        let forbidden_bp = self.forbidden.len() as u64 * resolution;
        self.relative_size = RelativeChromosomeSize::new(self.size.get().saturating_sub(forbidden_bp));
    }

    /// TAD records of an experiment, failing when it has none.
    pub fn tad_borders(&self, name: &str) -> Result<&TadSet> {
        let xpr = self.experiments.get(name)?;
        if xpr.tads.is_empty() {
            return Err(Error::TadBordersNotFound(name.to_string()));
        }
        Ok(&xpr.tads)
    }

    /// Contact sub-matrix over the bins `[start, end)` of `tad`, read from the
    /// normalized data when `normed` is set and from the raw counts otherwise.
    pub fn get_tad_hic(&self, tad: &Tad, name: &str, normed: bool) -> Result<Vec<Vec<f64>>> {
        let matrix = self.contact_data(name, normed)?;
        Ok(sub_matrix(matrix, tad))
    }

    /// Sub-matrices of every TAD of an experiment, with their 1-based index.
    pub fn iter_tads<'a>(
        &'a self,
        name: &str,
        normed: bool,
    ) -> Result<impl Iterator<Item = (usize, Vec<Vec<f64>>)> + 'a> {
        let xpr = self.experiments.get(name)?;
        let matrix = self.contact_data(name, normed)?;
        Ok(xpr.tads.indexed().map(move |(i, tad)| (i, sub_matrix(matrix, tad))))
    }

    fn contact_data(&self, name: &str, normed: bool) -> Result<&ContactMatrix> {
        let xpr = self.experiments.get(name)?;
        let data = if normed { &xpr.norm_data } else { &xpr.hic_data };
        data.as_ref().ok_or_else(|| Error::NoData(name.to_string()))
    }

    pub fn add_alignment(&mut self, alignment: Alignment) {
        self.alignments.insert(alignment);
    }

    pub fn alignment<S: AsRef<str>>(&self, names: &[S]) -> Result<&Alignment> {
        self.alignments.get(names)
    }

    pub fn alignment_at(&self, i: usize) -> Result<&Alignment> {
        self.alignments.at(i)
    }
}

fn sub_matrix(matrix: &ContactMatrix, tad: &Tad) -> Vec<Vec<f64>> {
    let end = tad.end.min(matrix.size());
    let beg = tad.start.min(end);
    (beg..end)
        .map(|i| (beg..end).map(|j| matrix.get(i, j)).collect())
        .collect()
}

fn random_name() -> String {
    let mut rng = rand::rng();
    let name: String = (0..5).map(|_| char::from(rng.random_range(b'a'..=b'z'))).collect();
    warn!("no name provided, random name generated: {}", name);
    name
}

impl Display for Chromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = |n: usize| if n > 0 { "s" } else { "" };
        writeln!(f, "Chromosome {}:", self.name)?;
        writeln!(
            f,
            "   {:<2} experiment{} loaded: {}",
            self.experiments.len(),
            plural(self.experiments.len()),
            self.experiments.names().collect::<Vec<_>>().join(", ")
        )?;
        writeln!(
            f,
            "   {:<2} alignment{} loaded: {}",
            self.alignments.len(),
            plural(self.alignments.len()),
            self.alignments.iter().map(|a| a.name.as_str()).collect::<Vec<_>>().join(", ")
        )?;
        writeln!(f, "   species         : {}", self.species.as_deref().unwrap_or("UNKNOWN"))?;
        writeln!(f, "   assembly version: {}", self.assembly.as_deref().unwrap_or("UNKNOWN"))?;
        for (key, value) in &self.description {
            writeln!(f, "   {:<16}: {}", key, value)?;
        }
        Ok(())
    }
}
