use clap::Parser;
use epiparams::args::Args;
use epiparams::runner::Runner;

fn main() {
    let args = Args::parse();
    let result = Runner::new(args).and_then(|runner| runner.start());
    if let Err(error) = result {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}
