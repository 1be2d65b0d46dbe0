use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::{ContactMatrix, TadSet};

/// A Hi-C experiment attached to a chromosome: its TAD records plus optional
/// contact data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Experiment {
    pub name: String,
    /// Bin size in base pairs.
    pub resolution: u64,
    #[serde(default)]
    pub tads: TadSet,
    #[serde(default)]
    pub hic_data: Option<ContactMatrix>,
    #[serde(default)]
    pub norm_data: Option<ContactMatrix>,
    /// Side of the contact matrix, in bins.
    #[serde(default)]
    pub size: usize,
    #[serde(default)]
    pub conditions: Vec<String>,

    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub cell_type: Option<String>,
    #[serde(default)]
    pub exp_type: Option<String>,
    #[serde(default)]
    pub enzyme: Option<String>,
    #[serde(default)]
    pub description: BTreeMap<String, String>,
}

impl Experiment {
    pub fn new(name: impl Into<String>, resolution: u64) -> Self {
        Self {
            name: name.into(),
            resolution,
            ..Default::default()
        }
    }

    pub fn with_tads(mut self, tads: TadSet) -> Self {
        self.tads = tads;
        self
    }

    pub fn with_hic_data(mut self, hic: ContactMatrix) -> Self {
        self.set_hic_data(hic);
        self
    }

    pub fn with_norm_data(mut self, norm: ContactMatrix) -> Self {
        self.norm_data = Some(norm);
        self
    }

    pub fn set_hic_data(&mut self, hic: ContactMatrix) {
        self.size = hic.size();
        self.hic_data = Some(hic);
    }

    pub fn has_hic_data(&self) -> bool {
        self.hic_data.is_some()
    }
}

/// Files an experiment is read from.
#[derive(Debug, Clone, Default)]
pub struct DataSource {
    pub tads: Option<PathBuf>,
    pub hic: Option<PathBuf>,
    pub norm: Option<PathBuf>,
}

/// How an experiment reaches [`crate::Chromosome::attach_experiment`].
#[derive(Debug, Clone)]
pub enum AttachRequest {
    ByReference(Experiment),
    ByPath {
        name: Option<String>,
        resolution: Option<u64>,
        source: DataSource,
    },
}

impl From<Experiment> for AttachRequest {
    fn from(xpr: Experiment) -> Self {
        AttachRequest::ByReference(xpr)
    }
}
