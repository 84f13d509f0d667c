use anyhow::{Context, Result};

use crate::args::Args;
use crate::config::{ParameterTable, Settings};
use crate::core::{GroupSizes, ParameterSet};

pub struct Runner {
    args: Args,
    settings: Settings,
}

impl Runner {
    pub fn new(args: Args) -> Result<Runner> {
        Self::setup_logger(&args);
        let settings = Self::load_settings(&args.settings)?;
        Ok(Self { args, settings })
    }

    pub fn start(&self) -> Result<()> {
        let parameters = self.resolve()?;
        println!("{parameters}");

        if let Some(table) = &self.args.table {
            log::info!("Writing parameter table to {table}...");
            ParameterTable::from_parameters(&parameters)
                .write_to_file(table)
                .with_context(|| format!("Unable to write parameter table `{table}`."))?;
        }

        if let (Some(g1), Some(g2)) = (self.args.size_g1, self.args.size_g2) {
            self.report_act_rates(&parameters, &GroupSizes::new(g1, g2))?;
        }

        log::info!("Finished.");
        Ok(())
    }

    /// Setup logging level and file
    fn setup_logger(args: &Args) {
        let log_level = match args.verbose {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };
        simple_logging::log_to_file(args.log_file.as_str(), log_level).unwrap_or_else(|_| {
            eprintln!("Unable to open log file.");
            std::process::exit(1);
        });
    }

    /// Load settings from file
    fn load_settings(path: &str) -> Result<Settings> {
        let settings = Settings::read_from_file(path)
            .with_context(|| format!("Unable to load settings `{path}`."))?;
        log::info!("Loaded settings\n{}", settings);
        Ok(settings)
    }

    fn resolve(&self) -> Result<ParameterSet> {
        let parameters = match self.args.step {
            Some(step) => self.settings.resolve_at(step)?,
            None => self.settings.resolve()?,
        };
        Ok(parameters)
    }

    fn report_act_rates(&self, parameters: &ParameterSet, sizes: &GroupSizes) -> Result<()> {
        let runs = parameters.runs()?;
        for (index, run) in runs.iter().enumerate() {
            match run.act_rates(sizes)? {
                Some(rates) => println!(
                    "run={} act.rate={} {}={}",
                    index + 1,
                    rates.g1,
                    run.group_key("act.rate"),
                    rates.g2
                ),
                None => {
                    println!("run={} act rates are not balanced for this model", index + 1)
                }
            }
        }
        Ok(())
    }
}
