use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use log::info;

use crate::chromosome::Chromosome;
use crate::error::{Error, Result};

/// Writes `crm` as JSON and returns the path actually written.
///
/// Unless `force` is set an existing file is never overwritten: `_` is
/// appended to the name until it is free. Contact matrices are left out
/// unless `with_hic` is set.
pub fn save_chromosome<P: AsRef<Path>>(crm: &Chromosome, path: P, with_hic: bool, force: bool) -> Result<PathBuf> {
    let mut outpath = path.as_ref().to_path_buf();
    while outpath.exists() && !force {
        let mut name = outpath.into_os_string();
        name.push("_");
        outpath = PathBuf::from(name);
    }

    let outfile = File::create(&outpath).map_err(|e| Error::io(e, &outpath))?;
    let mut writer = BufWriter::new(outfile);
    if with_hic {
        serde_json::to_writer(&mut writer, crm)?;
    } else {
        let mut light = crm.clone();
        for xpr in light.experiments_mut().iter_mut() {
            xpr.hic_data = None;
            xpr.norm_data = None;
        }
        serde_json::to_writer(&mut writer, &light)?;
    }
    writer.flush().map_err(|e| Error::io(e, &outpath))?;

    info!("chromosome {} saved to {:?}", crm.name, outpath);
    Ok(outpath)
}

/// Reads a chromosome written by [`save_chromosome`]. Fields missing from
/// older files fall back to empty defaults.
pub fn load_chromosome<P: AsRef<Path>>(path: P) -> Result<Chromosome> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::io(e, path))?;
    let crm = serde_json::from_reader(BufReader::new(file))?;
    Ok(crm)
}
