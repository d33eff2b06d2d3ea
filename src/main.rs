use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use gridprobe::{
    analysis::{
        anomaly_map, detect_extremes, map_extremes, profile_volume, seasonal_cycle,
        series_thresholds, spatial_map, temporal_series, variability_map, Direction,
        ExtremeEvent, ExtremeOptions, SeriesThresholds, TIME_AXIS,
    },
    config::Config,
    data_io::NpyVolumeReader,
    grid::infer_grid,
    render, report,
};
use ndarray::{Array2, Array3, Axis};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

fn main() {
    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("analyze", sub_matches)) => {
            if let Err(e) = run_analyze(sub_matches) {
                eprintln!("Analysis error: {}", e);
                std::process::exit(1);
            }
        }
        Some(("profile", sub_matches)) => {
            if let Err(e) = run_profile(sub_matches) {
                eprintln!("Profile error: {}", e);
                std::process::exit(1);
            }
        }
        _ => {
            eprintln!("Please specify a subcommand. Use --help for more information.");
            std::process::exit(1);
        }
    }
}

fn build_cli() -> Command {
    Command::new("gridprobe")
        .version("0.1.0")
        .about("Exploratory analysis of unidentified gridded data")
        .subcommand(
            Command::new("analyze")
                .about("Run the full pipeline: profile, grid inference, reductions, extremes, report, images")
                .arg(
                    Arg::new("input")
                        .short('i')
                        .long("input")
                        .value_name("FILE")
                        .help("Input .npy tensor (3-D f32)")
                        .required(true),
                )
                .arg(
                    Arg::new("output-dir")
                        .short('o')
                        .long("output-dir")
                        .value_name("DIR")
                        .help("Output directory for the report and images")
                        .default_value("./analysis"),
                )
                .arg(
                    Arg::new("high-percentile")
                        .long("high-percentile")
                        .value_name("PERCENT")
                        .help("Percentile flagging high extreme time steps")
                        .value_parser(value_parser!(f64))
                        .default_value("95"),
                )
                .arg(
                    Arg::new("low-percentile")
                        .long("low-percentile")
                        .value_name("PERCENT")
                        .help("Percentile flagging low extreme time steps")
                        .value_parser(value_parser!(f64))
                        .default_value("5"),
                )
                .arg(
                    Arg::new("seasonal-period")
                        .long("seasonal-period")
                        .value_name("STEPS")
                        .help("Assumed cycle length for the seasonal breakdown (0 disables)")
                        .value_parser(value_parser!(usize))
                        .default_value("12"),
                )
                .arg(
                    Arg::new("no-render")
                        .long("no-render")
                        .help("Skip PNG output")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("verbose")
                        .short('v')
                        .long("verbose")
                        .help("Enable verbose output")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("profile")
                .about("Load the tensor and print its statistical summary")
                .arg(
                    Arg::new("input")
                        .short('i')
                        .long("input")
                        .value_name("FILE")
                        .help("Input .npy tensor (3-D f32)")
                        .required(true),
                )
                .arg(
                    Arg::new("verbose")
                        .short('v')
                        .long("verbose")
                        .help("Enable verbose output")
                        .action(ArgAction::SetTrue),
                ),
        )
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    // one-shot CLI; a failed second init just keeps the first subscriber
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn run_analyze(matches: &ArgMatches) -> Result<(), String> {
    let config = Config::from_matches(matches)?;
    init_tracing(config.verbose);

    info!("loading {}", config.input_path.display());
    let volume = NpyVolumeReader::new(&config.input_path)
        .load()
        .map_err(|e| e.to_string())?;
    let (rows, cols, steps) = volume.dim();
    info!("loaded tensor of shape ({}, {}, {})", rows, cols, steps);

    let summary = profile_volume(&volume).map_err(|e| e.to_string())?;
    debug!(
        "profiled {} elements ({} non-finite)",
        summary.element_count, summary.non_finite_count
    );

    let grid = infer_grid(rows, cols);
    match &grid {
        Some(g) => info!("grid hypothesis: {}", g),
        None => info!(
            "no known global grid matches ({}, {}); reporting raw indices",
            rows, cols
        ),
    }

    let series = temporal_series(&volume, TIME_AXIS).map_err(|e| e.to_string())?;
    let mean_map = spatial_map(&volume, TIME_AXIS).map_err(|e| e.to_string())?;
    let var_map = variability_map(&volume, TIME_AXIS).map_err(|e| e.to_string())?;
    let seasonal = seasonal_cycle(&series, config.seasonal_period);

    let opts = ExtremeOptions {
        high_percentile: config.high_percentile,
        low_percentile: config.low_percentile,
    };
    let thresholds = series_thresholds(&series, &opts).map_err(|e| e.to_string())?;
    let events = detect_extremes(&series, &volume, grid.as_ref(), &opts).map_err(|e| e.to_string())?;
    info!("{} extreme event(s) flagged", events.len());
    let extremes_of_map = map_extremes(&mean_map, grid.as_ref());

    std::fs::create_dir_all(&config.output_dir)
        .map_err(|e| format!("Failed to create output directory: {}", e))?;

    let metadata = report::RunMetadata::new(&config.input_path);
    let context = report::ReportContext {
        shape: (rows, cols, steps),
        summary: &summary,
        grid,
        series: &series,
        thresholds,
        events: &events,
        map_extremes: extremes_of_map.as_ref(),
        seasonal: seasonal.as_deref(),
    };
    let report_path = config.output_dir.join("report.txt");
    report::ReportWriter::new(&report_path)
        .write(&metadata, &context)
        .map_err(|e| e.to_string())?;
    println!("Wrote report to {}", report_path.display());

    if !config.no_render {
        render_outputs(&config, &volume, &series, &mean_map, &var_map, &thresholds, &events)?;
    }

    Ok(())
}

fn run_profile(matches: &ArgMatches) -> Result<(), String> {
    init_tracing(matches.get_flag("verbose"));

    let input = matches.get_one::<String>("input").unwrap();
    let volume = NpyVolumeReader::new(input)
        .load()
        .map_err(|e| e.to_string())?;
    let summary = profile_volume(&volume).map_err(|e| e.to_string())?;
    print!("{}", report::format_summary(volume.dim(), &summary));
    Ok(())
}

fn slice_as_map(volume: &Array3<f32>, step: usize) -> Array2<f64> {
    volume
        .index_axis(Axis(TIME_AXIS), step)
        .mapv(|v| if v.is_finite() { v as f64 } else { f64::NAN })
}

fn render_outputs(
    config: &Config,
    volume: &Array3<f32>,
    series: &[f64],
    mean_map: &Array2<f64>,
    var_map: &Array2<f64>,
    thresholds: &SeriesThresholds,
    events: &[ExtremeEvent],
) -> Result<(), String> {
    let save = |img: &image::RgbImage, name: &str| -> Result<(), String> {
        let path = config.output_dir.join(name);
        render::save_png(img, &path).map_err(|e| e.to_string())?;
        debug!("wrote {}", path.display());
        Ok(())
    };

    let img = thermal_map(mean_map)?;
    save(&img, "temporal_mean.png")?;
    let img = thermal_map(var_map)?;
    save(&img, "variability.png")?;

    let steps = volume.len_of(Axis(TIME_AXIS));
    if steps > 0 {
        for (step, name) in [
            (0, "slice_first.png"),
            (steps / 2, "slice_middle.png"),
            (steps - 1, "slice_last.png"),
        ] {
            let img = thermal_map(&slice_as_map(volume, step))?;
            save(&img, name)?;
        }
    }

    // anomaly of the strongest high event, when one exists
    let peak = events
        .iter()
        .filter(|e| e.direction == Direction::High)
        .max_by(|a, b| a.value.total_cmp(&b.value));
    if let Some(event) = peak {
        let anomaly = anomaly_map(volume, mean_map, event.time_index).map_err(|e| e.to_string())?;
        let img = render::render_map(&anomaly, &render::DIVERGING).map_err(|e| e.to_string())?;
        save(&img, "anomaly_peak.png")?;
    }

    let finite: Vec<f64> = series.iter().copied().filter(|v| v.is_finite()).collect();
    if !finite.is_empty() {
        let mean = finite.iter().sum::<f64>() / finite.len() as f64;
        let references = [
            (mean, [60u8, 60, 60]),
            (thresholds.high, [214u8, 96, 34]),
            (thresholds.low, [67u8, 147, 195]),
        ];
        let img = render::render_series(series, &references, 900, 360).map_err(|e| e.to_string())?;
        save(&img, "time_series.png")?;
    }

    info!("rendered images into {}", config.output_dir.display());
    Ok(())
}

fn thermal_map(map: &Array2<f64>) -> Result<image::RgbImage, String> {
    render::render_map(map, &render::THERMAL).map_err(|e| e.to_string())
}
