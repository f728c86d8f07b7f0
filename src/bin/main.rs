//! vepcv command line interface
//!
//! Runs stratified cross-validated SVM evaluation on CSV feature tables and
//! prints or saves the resulting report.

use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::{error, info};
use std::path::PathBuf;
use std::process;
use vepcv::config::{EvalConfig, Gamma, KernelKind};
use vepcv::core::Result;
use vepcv::cv::CrossValidator;
use vepcv::data::CsvDataset;
use vepcv::multiclass::MulticlassStrategy;

#[derive(Parser)]
#[command(name = "vepcv")]
#[command(about = "Stratified cross-validated SVM evaluation for epoch features")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run stratified k-fold evaluation on a dataset
    Evaluate(EvaluateArgs),
    /// Summarize a dataset without training
    Inspect(InspectArgs),
}

#[derive(Args)]
struct EvaluateArgs {
    /// Feature data file (CSV, last column is the class label)
    #[arg(long)]
    data: PathBuf,

    /// Configuration file (JSON); command-line flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of stratified folds
    #[arg(short = 'k', long)]
    folds: Option<usize>,

    /// Seed for fold shuffling
    #[arg(long)]
    seed: Option<u64>,

    /// Kernel function
    #[arg(long)]
    kernel: Option<CliKernel>,

    /// Regularization parameter C
    #[arg(short = 'C', long)]
    c: Option<f64>,

    /// Kernel width: scale, auto, or a positive number
    #[arg(long, value_parser = parse_gamma)]
    gamma: Option<Gamma>,

    /// Polynomial degree (poly kernel only)
    #[arg(long)]
    degree: Option<u32>,

    /// Multi-class decomposition strategy
    #[arg(long)]
    strategy: Option<CliStrategy>,

    /// Write the report as JSON to this path
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct InspectArgs {
    /// Feature data file (CSV, last column is the class label)
    #[arg(long)]
    data: PathBuf,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliKernel {
    Rbf,
    Linear,
    Poly,
}

impl From<CliKernel> for KernelKind {
    fn from(kernel: CliKernel) -> Self {
        match kernel {
            CliKernel::Rbf => KernelKind::Rbf,
            CliKernel::Linear => KernelKind::Linear,
            CliKernel::Poly => KernelKind::Poly,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliStrategy {
    /// One-vs-one: a binary machine per class pair
    Ovo,
    /// One-vs-rest: a binary machine per class
    Ovr,
}

impl From<CliStrategy> for MulticlassStrategy {
    fn from(strategy: CliStrategy) -> Self {
        match strategy {
            CliStrategy::Ovo => MulticlassStrategy::OneVsOne,
            CliStrategy::Ovr => MulticlassStrategy::OneVsRest,
        }
    }
}

fn parse_gamma(s: &str) -> std::result::Result<Gamma, String> {
    match s {
        "scale" => Ok(Gamma::Scale),
        "auto" => Ok(Gamma::Auto),
        other => other
            .parse::<f64>()
            .map_err(|_| format!("expected scale, auto, or a number, got '{other}'"))
            .and_then(|v| {
                if v > 0.0 {
                    Ok(Gamma::Value(v))
                } else {
                    Err(format!("gamma must be positive, got {v}"))
                }
            }),
    }
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Evaluate(args) => evaluate_command(args),
        Commands::Inspect(args) => inspect_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn build_config(args: &EvaluateArgs) -> Result<EvalConfig> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {path:?}");
            EvalConfig::from_file(path)?
        }
        None => EvalConfig::default(),
    };

    if let Some(folds) = args.folds {
        config.num_folds = folds;
    }
    if let Some(seed) = args.seed {
        config.random_seed = seed;
    }
    if let Some(kernel) = args.kernel {
        config.svm_kernel = kernel.into();
    }
    if let Some(c) = args.c {
        config.svm_c = c;
    }
    if let Some(gamma) = args.gamma {
        config.svm_gamma = gamma;
    }
    if let Some(degree) = args.degree {
        config.poly_degree = degree;
    }
    if let Some(strategy) = args.strategy {
        config.multiclass_strategy = strategy.into();
    }

    config.validate()?;
    Ok(config)
}

fn evaluate_command(args: EvaluateArgs) -> Result<()> {
    let config = build_config(&args)?;

    info!("Loading dataset from {:?}", args.data);
    let dataset = CsvDataset::from_file(&args.data)?;
    let (features, labels) = dataset.into_parts();

    info!(
        "Loaded {} samples, {} features, {} classes",
        features.rows(),
        features.cols(),
        labels.n_classes()
    );
    info!(
        "Parameters: k={}, seed={}, kernel={}, C={}, gamma={}",
        config.num_folds,
        config.random_seed,
        config.svm_kernel,
        config.svm_c,
        config.svm_gamma
    );

    let report = CrossValidator::new(config)?.evaluate(&features, &labels)?;

    println!("{report}");

    if let Some(output) = args.output {
        report.save_to_file(&output)?;
        info!("Report saved to {output:?}");
    }

    Ok(())
}

fn inspect_command(args: InspectArgs) -> Result<()> {
    let dataset = CsvDataset::from_file(&args.data)?;
    let labels = dataset.labels();
    let counts = labels.class_counts();

    println!("=== Dataset Summary ===");
    println!("Samples:  {}", labels.len());
    println!("Features: {}", dataset.features().cols());
    println!("Classes:  {}", labels.n_classes());
    println!();
    println!("Class balance:");
    for (id, &count) in counts.iter().enumerate() {
        println!(
            "  {:<12} {:>5}  ({:.1}%)",
            labels.classes().name(id),
            count,
            100.0 * count as f64 / labels.len() as f64
        );
    }

    Ok(())
}
