use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::experiment::Experiment;

/// Experiments of a chromosome, in attachment order and unique by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExperimentList {
    items: Vec<Experiment>,
}

impl ExperimentList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Experiment> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Experiment> {
        self.items.iter_mut()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|x| x.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.items.iter().position(|x| x.name == name)
    }

    pub fn at(&self, i: usize) -> Option<&Experiment> {
        self.items.get(i)
    }

    pub fn at_mut(&mut self, i: usize) -> Option<&mut Experiment> {
        self.items.get_mut(i)
    }

    pub fn get(&self, name: &str) -> Result<&Experiment> {
        self.items
            .iter()
            .find(|x| x.name == name)
            .ok_or_else(|| Error::ExperimentNotFound(name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut Experiment> {
        self.items
            .iter_mut()
            .find(|x| x.name == name)
            .ok_or_else(|| Error::ExperimentNotFound(name.to_string()))
    }

    /// Stores `xpr` and returns its position.
    ///
    /// A name already taken is replaced in place when `replace` is set;
    /// otherwise the newcomer gets `_` appended until its name is free.
    pub fn insert(&mut self, mut xpr: Experiment, replace: bool) -> usize {
        if let Some(pos) = self.position(&xpr.name) {
            if replace {
                self.items[pos] = xpr;
                return pos;
            }
            while self.contains(&xpr.name) {
                xpr.name.push('_');
            }
            log::warn!("experiment name already in use, kept as {}", xpr.name);
        }
        self.items.push(xpr);
        self.items.len() - 1
    }

    pub fn remove(&mut self, name: &str) -> Result<Experiment> {
        let pos = self
            .position(name)
            .ok_or_else(|| Error::ExperimentNotFound(name.to_string()))?;
        Ok(self.items.remove(pos))
    }
}

impl<'a> IntoIterator for &'a ExperimentList {
    type Item = &'a Experiment;
    type IntoIter = std::slice::Iter<'a, Experiment>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// TAD border alignment across several experiments.
///
/// `borders[i]` lists the aligned border bins of `experiments[i]`, with `None`
/// where that experiment has no border in the column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alignment {
    pub name: String,
    pub experiments: Vec<String>,
    #[serde(default)]
    pub borders: Vec<Vec<Option<usize>>>,
}

impl Alignment {
    pub fn new(name: impl Into<String>, experiments: Vec<String>) -> Self {
        Self {
            name: name.into(),
            experiments,
            borders: Vec::new(),
        }
    }

    /// Registry key: the sorted experiment names.
    pub fn key(&self) -> Vec<String> {
        sorted_key(&self.experiments)
    }
}

fn sorted_key<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut key: Vec<String> = names.iter().map(|n| n.as_ref().to_string()).collect();
    key.sort();
    key
}

/// Alignments keyed by the sorted names of the experiments they span.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlignmentRegistry {
    items: Vec<(Vec<String>, Alignment)>,
}

impl AlignmentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Alignment> {
        self.items.iter().map(|(_, a)| a)
    }

    /// Stores `alignment`, replacing any alignment over the same experiments.
    pub fn insert(&mut self, alignment: Alignment) {
        let key = alignment.key();
        match self.items.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = alignment,
            None => self.items.push((key, alignment)),
        }
    }

    /// Looks up by experiment names, in any order.
    pub fn get<S: AsRef<str>>(&self, names: &[S]) -> Result<&Alignment> {
        let key = sorted_key(names);
        self.items
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, a)| a)
            .ok_or_else(|| Error::AlignmentNotFound(key.join(",")))
    }

    /// Positional lookup, in insertion order.
    pub fn at(&self, i: usize) -> Result<&Alignment> {
        self.items
            .get(i)
            .map(|(_, a)| a)
            .ok_or_else(|| Error::AlignmentNotFound(format!("#{}", i)))
    }
}
