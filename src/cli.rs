use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Args {
    #[arg(short, long, required = true, help = "Chromosome name")]
    pub name: String,

    #[arg(short, long, num_args(1..), required = true, help = "TAD definition files, one per experiment. Can be .gz")]
    pub tads: Vec<String>,

    #[arg(long, num_args(1..), help = "Hi-C contact matrices in the same order as the TAD files. Can be .gz")]
    pub hic: Option<Vec<String>>,

    #[arg(short, long, num_args(1..), help = "Labels for experiments in the same order as the TAD files")]
    pub labels: Option<Vec<String>>,

    #[arg(short, long, num_args(1..), required = true, help = "Resolution (bp per bin), one value or one per experiment")]
    pub resolutions: Vec<u64>,

    #[arg(long, help = "Maximum TAD size in bp. TADs above it are marked as forbidden")]
    pub max_tad_size: Option<u64>,

    #[arg(long, help = "Chromosome length in bp. Inferred from TADs by default")]
    pub chr_len: Option<u64>,

    #[arg(long, default_value_t = false, help = "Search for the centromere in the Hi-C matrices")]
    pub centromere_search: bool,

    #[arg(long, help = "Species name")]
    pub species: Option<String>,

    #[arg(long, help = "Genome assembly")]
    pub assembly: Option<String>,

    #[arg(short = 'j', long, default_value_t = 1, help = "Num processes")]
    pub threads: usize,

    #[arg(
        short,
        long,
        default_value = "output",
        help = "Path to output directory"
    )]
    pub output: String,

    #[arg(long, help = "Save the chromosome as JSON to this path")]
    pub save: Option<String>,
}

pub fn parse_args() -> Args {
    Args::parse()
}
