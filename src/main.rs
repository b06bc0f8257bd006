use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

use velowatt::logging::{init_logging, LogConfig};
use velowatt::metrics::{format_duration, round1, round_to, MetricsCalculator, RideInput};
use velowatt::models::{FitnessPoint, Ride};
use velowatt::pmc::PmcCalculator;
use velowatt::zones::{IntensityZone, ZoneCalculator};
use velowatt::{recalculate_all, FtpEstimator, TssRecovery, VelowattError};

/// VeloWatt - Cycling Training Metrics CLI
///
/// Computes per-ride power metrics (NP, IF, TSS, VI, EF), the
/// fitness/fatigue/form trend, power zones, and FTP estimates from ride
/// history.
#[derive(Parser)]
#[command(name = "velowatt")]
#[command(version)]
#[command(about = "Cycling training metrics engine", long_about = None)]
struct Cli {
    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log output format (pretty, json, compact)
    #[arg(long, default_value = "compact")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate metrics for a single ride
    Metrics {
        /// Athlete FTP in watts
        #[arg(short = 'F', long)]
        ftp: f64,

        /// Ride JSON file to read instead of summary flags
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// CSV file with one watt value per second (single column)
        #[arg(short, long)]
        samples: Option<PathBuf>,

        /// Ride duration in seconds (manual entry)
        #[arg(short, long)]
        duration: Option<u32>,

        /// Average power in watts (manual entry)
        #[arg(short = 'p', long)]
        avg_power: Option<f64>,

        /// Average heart rate in bpm
        #[arg(long)]
        hr: Option<f64>,
    },

    /// Show the fitness/fatigue/form trend from a ride history
    Fitness {
        /// Rides JSON file (array of rides with calculated metrics)
        #[arg(short, long)]
        file: PathBuf,

        /// Compute the series through this date (YYYY-MM-DD, default today)
        #[arg(short, long)]
        through: Option<String>,

        /// History rows to show
        #[arg(long, default_value = "14")]
        days: usize,
    },

    /// Print the seven power zones for an FTP
    Zones {
        /// Athlete FTP in watts
        #[arg(short = 'F', long)]
        ftp: f64,
    },

    /// Estimate FTP from ride history
    EstimateFtp {
        /// Rides JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Recalculate all ride metrics against a new FTP
    Recalculate {
        /// Rides JSON file
        #[arg(short, long)]
        file: PathBuf,

        /// New FTP in watts
        #[arg(short = 'F', long)]
        ftp: f64,

        /// Where to write updated rides (defaults to in-place)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Tabled)]
struct FitnessRow {
    #[tabled(rename = "Date")]
    date: NaiveDate,
    #[tabled(rename = "CTL")]
    ctl: f64,
    #[tabled(rename = "ATL")]
    atl: f64,
    #[tabled(rename = "TSB")]
    tsb: f64,
}

impl From<&FitnessPoint> for FitnessRow {
    fn from(p: &FitnessPoint) -> Self {
        FitnessRow {
            date: p.date,
            ctl: round1(p.ctl),
            atl: round1(p.atl),
            tsb: round1(p.tsb),
        }
    }
}

#[derive(Tabled)]
struct ZoneRow {
    #[tabled(rename = "Zone")]
    zone: u8,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Watts")]
    watts: String,
    #[tabled(rename = "% FTP")]
    pct: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_verbosity(cli.verbose);
    log_config.format = cli
        .log_format
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    init_logging(&log_config)?;

    match cli.command {
        Commands::Metrics {
            ftp,
            file,
            samples,
            duration,
            avg_power,
            hr,
        } => cmd_metrics(ftp, file, samples, duration, avg_power, hr),
        Commands::Fitness {
            file,
            through,
            days,
        } => cmd_fitness(&file, through.as_deref(), days),
        Commands::Zones { ftp } => cmd_zones(ftp),
        Commands::EstimateFtp { file } => cmd_estimate_ftp(&file),
        Commands::Recalculate { file, ftp, output } => {
            cmd_recalculate(&file, ftp, output.as_deref())
        }
    }
}

fn cmd_metrics(
    ftp: f64,
    file: Option<PathBuf>,
    samples_path: Option<PathBuf>,
    duration: Option<u32>,
    avg_power: Option<f64>,
    hr: Option<f64>,
) -> Result<()> {
    let samples = samples_path.map(|p| read_power_csv(&p)).transpose()?;

    let metrics = if let Some(path) = file {
        let ride = load_ride(&path)?;
        info!(title = %ride.title, "calculating metrics from ride file");
        println!(
            "{} ({}, {})",
            ride.title.bold(),
            ride.date,
            format_duration(ride.duration_seconds)
        );
        MetricsCalculator::calculate(&RideInput::from(&ride), ftp)?
    } else if let Some(samples) = &samples {
        let duration = duration.unwrap_or(samples.len() as u32);
        let avg = if samples.is_empty() {
            0.0
        } else {
            samples.iter().sum::<f64>() / samples.len() as f64
        };
        let input = RideInput {
            duration_seconds: duration,
            avg_power: avg_power.unwrap_or(avg),
            power_samples: Some(samples.as_slice()),
            normalized_power: None,
            avg_heart_rate: hr,
        };
        MetricsCalculator::calculate(&input, ftp)?
    } else {
        let (duration, avg_power) = match (duration, avg_power) {
            (Some(d), Some(p)) => (d, p),
            _ => anyhow::bail!(
                "provide --file, --samples, or both --duration and --avg-power"
            ),
        };
        let input = RideInput {
            duration_seconds: duration,
            avg_power,
            power_samples: None,
            normalized_power: None,
            avg_heart_rate: hr,
        };
        MetricsCalculator::calculate(&input, ftp)?
    };

    println!("{}", "Ride Metrics".green().bold());
    println!("  Normalized Power:  {} W", round1(metrics.normalized_power));
    println!(
        "  Intensity Factor:  {} ({})",
        round_to(metrics.intensity_factor, 3),
        IntensityZone::from_intensity_factor(metrics.intensity_factor).label()
    );
    println!("  TSS:               {}", round1(metrics.tss));
    println!("  Variability Index: {}", round_to(metrics.variability_index, 2));
    match metrics.efficiency_factor {
        Some(ef) => println!("  Efficiency Factor: {}", round_to(ef, 2)),
        None => println!("  Efficiency Factor: n/a (no heart rate data)"),
    }
    println!(
        "  Recovery:          {}",
        TssRecovery::from_tss(metrics.tss).description()
    );
    Ok(())
}

fn cmd_fitness(path: &Path, through: Option<&str>, days: usize) -> Result<()> {
    let rides = load_rides(path)?;
    let through = through
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|e| anyhow::anyhow!("invalid --through date {:?}: {}", s, e))
        })
        .transpose()?;

    let summary = PmcCalculator::new().fitness_summary(&rides, through);

    println!("{}", "Fitness Summary".blue().bold());
    println!("  Fitness (CTL): {}", round1(summary.current_ctl));
    println!("  Fatigue (ATL): {}", round1(summary.current_atl));
    println!(
        "  Form (TSB):    {} ({})",
        round1(summary.current_tsb),
        describe_form(summary.current_tsb)
    );
    println!("  Peak fitness:  {}", round1(summary.peak_ctl));

    if !summary.history.is_empty() {
        let recent: Vec<FitnessRow> = summary
            .history
            .iter()
            .rev()
            .take(days)
            .rev()
            .map(FitnessRow::from)
            .collect();
        println!("\n{}", format!("Last {} days", recent.len()).bold());
        println!("{}", Table::new(recent).with(Style::rounded()));
    }

    if !summary.forecast.is_empty() {
        let rows: Vec<FitnessRow> = summary
            .forecast
            .iter()
            .enumerate()
            .filter(|(i, _)| (i + 1) % 7 == 0 || *i + 1 == summary.forecast.len())
            .map(|(_, p)| FitnessRow::from(p))
            .collect();
        println!("\n{}", "Forecast if you stop training".bold());
        println!("{}", Table::new(rows).with(Style::rounded()));
    }
    Ok(())
}

fn cmd_zones(ftp: f64) -> Result<()> {
    let zones = ZoneCalculator::power_zones(ftp)?;
    let rows: Vec<ZoneRow> = zones
        .iter()
        .map(|z| ZoneRow {
            zone: z.zone,
            name: z.name.clone(),
            watts: match z.max_watts {
                Some(max) => format!("{}-{}", z.min_watts, max),
                None => format!("{}+", z.min_watts),
            },
            pct: match z.max_pct {
                Some(max) => format!("{}-{}%", z.min_pct, max),
                None => format!("{}%+", z.min_pct),
            },
        })
        .collect();

    println!("{}", format!("Power Zones at FTP {} W", ftp).cyan().bold());
    println!("{}", Table::new(rows).with(Style::rounded()));
    Ok(())
}

fn cmd_estimate_ftp(path: &Path) -> Result<()> {
    let rides = load_rides(path)?;
    match FtpEstimator::estimate(&rides) {
        Ok(estimate) => {
            println!("{}", "FTP Estimate".green().bold());
            println!("  Estimated FTP: {} W", round1(estimate.watts));
            println!("  Method:        {}", estimate.method.description());
            Ok(())
        }
        Err(e) => {
            let wrapped = VelowattError::from(e);
            eprintln!("{}", wrapped.user_message().red());
            std::process::exit(1);
        }
    }
}

fn cmd_recalculate(path: &Path, ftp: f64, output: Option<&Path>) -> Result<()> {
    let mut rides = load_rides(path)?;
    let outcome = recalculate_all(&mut rides, ftp, &PmcCalculator::new(), None)?;

    let target = output.unwrap_or(path);
    save_rides(target, &rides)?;

    println!(
        "{}",
        format!(
            "✓ Recalculated {} rides at FTP {} W",
            outcome.rides_updated, outcome.ftp_used
        )
        .green()
    );
    println!(
        "  Fitness (CTL): {}  Form (TSB): {}",
        round1(outcome.fitness.current_ctl),
        round1(outcome.fitness.current_tsb)
    );
    println!("  Updated rides written to {}", target.display());
    Ok(())
}

fn describe_form(tsb: f64) -> &'static str {
    if tsb > 10.0 {
        "fresh"
    } else if tsb >= -10.0 {
        "neutral"
    } else if tsb >= -30.0 {
        "fatigued"
    } else {
        "very fatigued"
    }
}

fn load_ride(path: &Path) -> velowatt::Result<Ride> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

fn load_rides(path: &Path) -> velowatt::Result<Vec<Ride>> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

fn save_rides(path: &Path, rides: &[Ride]) -> velowatt::Result<()> {
    let json = serde_json::to_string_pretty(rides)?;
    fs::write(path, json)?;
    Ok(())
}

/// Read a single-column CSV of per-second watt values
fn read_power_csv(path: &Path) -> velowatt::Result<Vec<f64>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(false)
        .from_path(path)?;

    let mut samples = Vec::new();
    for record in reader.records() {
        let record = record?;
        let field = record
            .get(0)
            .ok_or_else(|| VelowattError::Validation("empty row in power CSV".to_string()))?;
        samples.push(field.trim().parse::<f64>().map_err(|e| {
            VelowattError::Validation(format!(
                "bad watt value {:?} in {}: {}",
                field,
                path.display(),
                e
            ))
        })?);
    }
    info!(samples = samples.len(), file = %path.display(), "loaded power stream");
    Ok(samples)
}
