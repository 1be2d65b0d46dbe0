use std::{
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::{anyhow, Context, Result};

use tadcrm::Chromosome;

fn create<P: AsRef<Path>>(outdir: P, name: &str) -> Result<BufWriter<std::fs::File>> {
    let outpath = outdir.as_ref().join(name);
    let outfile = std::fs::File::create(outpath.clone())
        .with_context(|| anyhow!("Could not create file: {:?}", outpath))?;
    Ok(BufWriter::new(outfile))
}

pub fn write_tads<P: AsRef<Path>>(outdir: P, crm: &Chromosome) -> Result<()> {
    let mut writer = create(outdir, "tads.tsv")?;

    writeln!(writer, "experiment\tindex\tstart\tend\tscore\tbrk")?;

    for xpr in crm.experiments() {
        for (i, tad) in xpr.tads.indexed() {
            writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{}\t{}",
                xpr.name, i, tad.start, tad.end, tad.score, tad.brk
            )?;
        }
    }

    writer.flush()?;
    Ok(())
}

pub fn write_forbidden<P: AsRef<Path>>(outdir: P, crm: &Chromosome) -> Result<()> {
    let mut writer = create(outdir, "forbidden.tsv")?;

    writeln!(writer, "bin\treason")?;

    for (bin, reason) in crm.forbidden().iter() {
        let reason = reason.map_or_else(|| "NA".to_string(), |r| r.to_string());
        writeln!(writer, "{}\t{}", bin, reason)?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_summary<P: AsRef<Path>>(outdir: P, crm: &Chromosome) -> Result<()> {
    let mut writer = create(outdir, "summary.tsv")?;

    writeln!(
        writer,
        "chromosome\tsize\trelative_size\tforbidden_bins\tcentromere_begin\tcentromere_end"
    )?;

    let (cen_beg, cen_end) = crm
        .centromere()
        .map_or(("NA".to_string(), "NA".to_string()), |c| {
            (c.begin.to_string(), c.end.to_string())
        });
    writeln!(
        writer,
        "{}\t{}\t{}\t{}\t{}\t{}",
        crm.name,
        crm.size(),
        crm.relative_size(),
        crm.forbidden().len(),
        cen_beg,
        cen_end
    )?;

    writer.flush()?;
    Ok(())
}
