use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use flate2::read::GzDecoder;
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use log::info;
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::experiment::{DataSource, Experiment};
use crate::types::{ContactMatrix, Tad, TadSet};

fn open<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::io(e, path))?;
    let reader: Box<dyn BufRead> = if path.extension().is_some_and(|ext| ext == "gz") {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(reader)
}

/// Reads a tab-separated TAD definition: `index start end score [brk]`.
///
/// Lines starting with `#` and a leading non-numeric header are skipped.
/// Records come back ordered by their index column.
pub fn read_tads<P: AsRef<Path>>(path: P) -> Result<TadSet> {
    let path = path.as_ref();
    let parse_err = |line: usize, msg: String| Error::Parse {
        path: path.to_path_buf(),
        line,
        msg,
    };

    let mut records: Vec<(usize, Tad)> = Vec::new();
    for (i, line) in open(path)?.lines().enumerate() {
        let line = line.map_err(|e| Error::io(e, path))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if records.is_empty() && fields[0].parse::<f64>().is_err() {
            continue;
        }
        if fields.len() < 4 {
            return Err(parse_err(i + 1, format!("expected at least 4 columns, found {}", fields.len())));
        }

        let bin = |s: &str| -> Result<usize> {
            match s.parse::<f64>() {
                Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 => Ok(v as usize),
                _ => Err(parse_err(i + 1, format!("invalid bin: {}", s))),
            }
        };
        let index = bin(fields[0])?;
        let mut tad = Tad::new(bin(fields[1])?, bin(fields[2])?, 0.0);
        tad.score = fields[3]
            .parse()
            .map_err(|_| parse_err(i + 1, format!("invalid score: {}", fields[3])))?;
        if let Some(brk) = fields.get(4) {
            tad.brk = bin(*brk)?;
        }
        records.push((index, tad));
    }

    records.sort_by_key(|(index, _)| *index);
    Ok(records.into_iter().map(|(_, tad)| tad).collect())
}

/// Reads a square contact matrix with a header row and a label column:
///
/// ```text
/// chrT_001	chrT_002	chrT_003
/// chrT_001	629	164	88
/// chrT_002	164	612	175
/// chrT_003	88	175	437
/// ```
pub fn read_matrix<P: AsRef<Path>>(path: P) -> Result<ContactMatrix> {
    let path = path.as_ref();
    let shape_err = |msg: String| Error::MatrixShape {
        path: path.to_path_buf(),
        msg,
    };

    let mut lines = open(path)?
        .lines()
        .enumerate()
        .filter(|(_, l)| l.as_ref().map_or(true, |l| !l.trim().is_empty()));

    let size = match lines.next() {
        Some((_, header)) => header.map_err(|e| Error::io(e, path))?.split_whitespace().count(),
        None => return Err(shape_err("empty file".to_string())),
    };

    let mut values = Vec::with_capacity(size * size);
    let mut rows = 0;
    for (i, line) in lines {
        let line = line.map_err(|e| Error::io(e, path))?;
        let mut fields = line.split_whitespace();
        fields.next();
        let before = values.len();
        for field in fields {
            let v = field.parse::<f64>().map_err(|_| Error::Parse {
                path: path.to_path_buf(),
                line: i + 1,
                msg: format!("invalid count: {}", field),
            })?;
            values.push(v);
        }
        if values.len() - before != size {
            return Err(shape_err(format!(
                "row {} has {} values, expected {}",
                rows + 1,
                values.len() - before,
                size
            )));
        }
        rows += 1;
    }

    ContactMatrix::from_flat(values, size)
        .ok_or_else(|| shape_err(format!("{} rows for {} columns", rows, size)))
}

/// Builds an experiment from whichever files `source` names.
pub fn load_experiment(name: &str, resolution: u64, source: &DataSource) -> Result<Experiment> {
    let mut xpr = Experiment::new(name, resolution);
    if let Some(path) = &source.tads {
        xpr.tads = read_tads(path)?;
    }
    if let Some(path) = &source.hic {
        xpr.set_hic_data(read_matrix(path)?);
    }
    if let Some(path) = &source.norm {
        xpr.norm_data = Some(read_matrix(path)?);
    }
    Ok(xpr)
}

/// Loads several experiments in parallel, keeping input order.
pub fn load_experiments(inputs: &[(String, u64, DataSource)]) -> Result<Vec<Experiment>> {
    let style = ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(style);
    pb.set_message("Loading experiments...");

    let experiments = inputs
        .par_iter()
        .progress_with(pb)
        .map(|(name, resolution, source)| {
            let xpr = load_experiment(name, *resolution, source)?;
            info!("{}: {} TADs, matrix size {}", name, xpr.tads.len(), xpr.size);
            Ok(xpr)
        })
        .collect::<Result<Vec<Experiment>>>()?;

    Ok(experiments)
}
