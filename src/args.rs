use clap::Parser;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Path to settings.
    #[clap(long)]
    pub settings: String,

    /// Apply scheduled parameter updates up to this time step.
    #[clap(long)]
    pub step: Option<usize>,

    /// Path to write the resolved parameters as a table (csv file).
    #[clap(long)]
    pub table: Option<String>,

    /// Current size of group 1, used to report balanced act rates.
    #[clap(long, requires = "size_g2")]
    pub size_g1: Option<f64>,

    /// Current size of group 2, used to report balanced act rates.
    #[clap(long, requires = "size_g1")]
    pub size_g2: Option<f64>,

    /// Path to log file.
    #[clap(long, default_value = "epiparams.log")]
    pub log_file: String,

    /// Increase logging verbosity.
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
