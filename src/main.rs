use anyhow::{anyhow, Context};
use log::info;

use tadcrm::{io::load_experiments, persist::save_chromosome, Chromosome, ChromosomeOptions, DataSource};

mod cli;
mod output;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = cli::parse_args();

    rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .build_global()
        .context("Could not build thread pool")?;

    let n = args.tads.len();
    let labels = match &args.labels {
        Some(labels) if labels.len() != n => {
            return Err(anyhow!("The provided labels does not match the provided TAD files"));
        }
        Some(labels) => labels.clone(),
        None => (1..=n).map(|i| format!("exp{}", i)).collect(),
    };
    let resolutions = match args.resolutions.len() {
        1 => vec![args.resolutions[0]; n],
        len if len == n => args.resolutions.clone(),
        _ => return Err(anyhow!("Give one resolution or one per TAD file")),
    };
    if let Some(hic) = &args.hic {
        if hic.len() != n {
            return Err(anyhow!("The provided Hi-C matrices do not match the provided TAD files"));
        }
    }

    let inputs = (0..n)
        .map(|i| {
            let source = DataSource {
                tads: Some(args.tads[i].clone().into()),
                hic: args.hic.as_ref().map(|h| h[i].clone().into()),
                norm: None,
            };
            (labels[i].clone(), resolutions[i], source)
        })
        .collect::<Vec<_>>();
    let experiments = load_experiments(&inputs).context("Failed to load experiments")?;

    let options = ChromosomeOptions {
        species: args.species.clone(),
        assembly: args.assembly.clone(),
        max_tad_size: args.max_tad_size,
        chr_len: args.chr_len,
        centromere_search: args.centromere_search,
        ..Default::default()
    };
    let crm = Chromosome::with_experiments(&args.name, options, experiments.into_iter().map(Into::into))
        .context("Failed to build chromosome")?;
    info!("{}", crm);

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("Could not create output directory: {}", args.output))?;
    output::write_tads(&args.output, &crm)?;
    output::write_forbidden(&args.output, &crm)?;
    output::write_summary(&args.output, &crm)?;

    if let Some(path) = &args.save {
        let saved = save_chromosome(&crm, path, true, false)
            .with_context(|| format!("Could not save chromosome to {}", path))?;
        info!("Saved chromosome to {:?}", saved);
    }

    Ok(())
}
