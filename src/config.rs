use clap::ArgMatches;
use std::path::{Path, PathBuf};

/// Runtime configuration for one analysis pass.
///
/// Everything is passed in explicitly; the pipeline reads no environment
/// variables or global state.
#[derive(Clone, Debug)]
pub struct Config {
    /// Input `.npy` tensor
    pub input_path: PathBuf,
    /// Directory receiving the report and rendered images
    pub output_dir: PathBuf,
    /// Percentile flagging high extreme time steps
    pub high_percentile: f64,
    /// Percentile flagging low extreme time steps
    pub low_percentile: f64,
    /// Assumed cycle length for the seasonal breakdown (0 disables)
    pub seasonal_period: usize,
    /// Skip PNG output
    pub no_render: bool,
    /// Verbose output
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("./input.npy"),
            output_dir: PathBuf::from("./analysis"),
            high_percentile: 95.0,
            low_percentile: 5.0,
            seasonal_period: 12,
            no_render: false,
            verbose: false,
        }
    }
}

impl Config {
    /// Build a configuration from parsed CLI matches of the `analyze`
    /// subcommand
    pub fn from_matches(matches: &ArgMatches) -> Result<Self, String> {
        let input_path = PathBuf::from(matches.get_one::<String>("input").unwrap());
        let output_dir = PathBuf::from(matches.get_one::<String>("output-dir").unwrap());
        let high_percentile = *matches.get_one::<f64>("high-percentile").unwrap();
        let low_percentile = *matches.get_one::<f64>("low-percentile").unwrap();
        let seasonal_period = *matches.get_one::<usize>("seasonal-period").unwrap();
        let no_render = matches.get_flag("no-render");
        let verbose = matches.get_flag("verbose");

        let config = Self {
            input_path,
            output_dir,
            high_percentile,
            low_percentile,
            seasonal_period,
            no_render,
            verbose,
        };

        config.validate()?;
        Ok(config)
    }

    /// Create a test configuration without touching the CLI
    pub fn for_testing(input_path: &Path, output_dir: &Path) -> Self {
        Self {
            input_path: input_path.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            ..Default::default()
        }
    }

    /// Validate parameter ranges and the input path
    pub fn validate(&self) -> Result<(), String> {
        if !self.input_path.exists() {
            return Err(format!(
                "Input path does not exist: {}",
                self.input_path.display()
            ));
        }
        for (name, p) in [
            ("high-percentile", self.high_percentile),
            ("low-percentile", self.low_percentile),
        ] {
            if !(0.0..=100.0).contains(&p) {
                return Err(format!("{} must be within 0..=100, got {}", name, p));
            }
        }
        if self.low_percentile >= self.high_percentile {
            return Err(format!(
                "low-percentile ({}) must be below high-percentile ({})",
                self.low_percentile, self.high_percentile
            ));
        }
        Ok(())
    }
}
