use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use cardio_frame::{
    CleanOptions, CleanSummary, CsvTableReader, CsvTableWriter, FeatureTable, MissingCount,
    StandardScaler, Table, encode_one_hot,
};
use cardio_rf::{
    ClassificationReport, ConfusionMatrix, RandomForestConfig, RankedFeature, SplitCriterion,
    TrainTestSplit, TrainingMetadata,
};

#[derive(Parser)]
#[command(name = "cardio")]
#[command(about = "Heart-disease table preparation and random forest classification")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for the holdout split and the forest
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Input file and target column.
#[derive(Args, Debug, Clone)]
struct DataArgs {
    /// Path to the input CSV file
    #[arg(long, default_value = "heart.csv")]
    data: PathBuf,

    /// Name of the class column
    #[arg(long, default_value = "target")]
    target: String,
}

/// Cleaning and output options.
#[derive(Args, Debug, Clone)]
struct PrepareArgs {
    /// Path of the cleaned, standardized CSV to write
    #[arg(long, default_value = "cleaned_heart_disease_data.csv")]
    output: PathBuf,

    /// Keep rows with gaps and mean-impute numeric columns instead of dropping them
    #[arg(long, default_value_t = false)]
    keep_incomplete: bool,
}

/// Holdout and forest parameters.
#[derive(Args, Debug, Clone)]
struct TrainArgs {
    /// Fraction of rows held out for evaluation
    #[arg(long, default_value_t = 0.3)]
    test_size: f64,

    /// Number of trees in the Random Forest
    #[arg(long, default_value_t = 100)]
    n_trees: usize,

    /// Maximum tree depth (unlimited if not set)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Split criterion: "gini" or "entropy"
    #[arg(long, default_value = "gini")]
    criterion: String,

    /// Print a JSON summary instead of the text report
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Load, clean, encode, and standardize a raw CSV, then write it out
    Prepare {
        #[command(flatten)]
        input: DataArgs,

        #[command(flatten)]
        prepare: PrepareArgs,
    },

    /// Print missing counts, info, head, statistics, correlation, and class counts
    Describe {
        #[command(flatten)]
        input: DataArgs,

        /// Number of leading rows to show
        #[arg(long, default_value_t = 5)]
        head: usize,

        /// Print JSON instead of text tables
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Train and evaluate a Random Forest on an already-cleaned CSV
    Train {
        #[command(flatten)]
        input: DataArgs,

        #[command(flatten)]
        train: TrainArgs,
    },

    /// Prepare, describe the cleaned file, then train and evaluate
    Run {
        #[command(flatten)]
        input: DataArgs,

        #[command(flatten)]
        prepare: PrepareArgs,

        #[command(flatten)]
        train: TrainArgs,

        /// Number of leading rows of the cleaned file to show
        #[arg(long, default_value_t = 5)]
        head: usize,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct PrepareOutput {
    input: String,
    output: String,
    n_features: usize,
    feature_names: Vec<String>,
    cleaning: CleanSummary,
}

#[derive(Serialize)]
struct DescribeOutput {
    missing: Vec<MissingCount>,
    info: cardio_frame::TableInfo,
    head: cardio_frame::Head,
    describe: cardio_frame::Description,
    correlation: cardio_frame::CorrelationMatrix,
    class_distribution: cardio_frame::ClassDistribution,
}

#[derive(Serialize)]
struct TrainOutput {
    n_train: usize,
    n_test: usize,
    accuracy: f64,
    report: ClassificationReport,
    importances: Vec<RankedFeature>,
    metadata: TrainingMetadata,
}

fn parse_criterion(s: &str) -> Result<SplitCriterion> {
    match s {
        "gini" => Ok(SplitCriterion::Gini),
        "entropy" => Ok(SplitCriterion::Entropy),
        other => anyhow::bail!("unknown criterion: {other} (expected gini or entropy)"),
    }
}

fn read_table(path: &Path) -> Result<Table> {
    CsvTableReader::new(path)
        .read()
        .with_context(|| format!("failed to read {}", path.display()))
}

/// Load..Persist. Returns the written table with the cleaning summary.
fn prepare(input: &DataArgs, args: &PrepareArgs) -> Result<(FeatureTable, CleanSummary)> {
    let mut table = read_table(&input.data)?;

    let summary = CleanOptions::new(input.target.as_str())
        .with_drop_incomplete(!args.keep_incomplete)
        .apply(&mut table)
        .context("cleaning failed")?;

    let encoded = encode_one_hot(&table, &input.target).context("encoding failed")?;
    info!(n_features = encoded.n_features(), "table encoded");

    let (_, scaled) = StandardScaler::fit_transform(&encoded).context("scaling failed")?;

    CsvTableWriter::new(&args.output)
        .write(&scaled)
        .context("failed to write cleaned CSV")?;
    info!(path = %args.output.display(), "cleaned table written");

    Ok((scaled, summary))
}

fn describe(table: &Table, target: &str, head: usize) -> Result<DescribeOutput> {
    Ok(DescribeOutput {
        missing: table.missing_counts(),
        info: table.info(),
        head: table.head(head),
        describe: table.describe(),
        correlation: table.correlation_matrix(),
        class_distribution: table
            .class_distribution(target)
            .context("failed to count classes")?,
    })
}

fn print_missing(counts: &[MissingCount]) {
    for m in counts {
        println!("{:<12} {}", m.column, m.missing);
    }
    println!();
}

fn print_description(d: &DescribeOutput) {
    println!("Missing values:");
    print_missing(&d.missing);
    println!("{}", d.info);
    println!("{}", d.head);
    println!("{}", d.describe);
    println!("{}", d.correlation);
    println!("{}", d.class_distribution);
}

/// Reload..Report on an already-cleaned CSV.
fn train(input: &DataArgs, args: &TrainArgs, seed: u64) -> Result<TrainOutput> {
    let table = read_table(&input.data)?;
    let reloaded = FeatureTable::from_table(&table, &input.target)
        .context("input is not a cleaned numeric table")?;
    let (_, scaled) = StandardScaler::fit_transform(&reloaded).context("scaling failed")?;
    let data = scaled.to_labelled();
    info!(
        n_rows = scaled.n_rows(),
        n_features = scaled.n_features(),
        n_classes = data.n_classes(),
        "training data ready"
    );

    let holdout = TrainTestSplit::new(args.test_size)?
        .with_seed(seed)
        .split(&data.features, &data.labels)
        .context("holdout split failed")?;

    let config = RandomForestConfig::new(args.n_trees)?
        .with_max_depth(args.max_depth)
        .with_criterion(parse_criterion(&args.criterion)?)
        .with_seed(seed);
    let result = config
        .fit(&holdout.train_features, &holdout.train_labels, &data.feature_names)
        .context("training failed")?;

    let predicted = result
        .forest()
        .predict_batch(&holdout.test_features)
        .context("prediction failed")?;
    let matrix = ConfusionMatrix::from_labels(&holdout.test_labels, &predicted, data.n_classes())?;
    let report = ClassificationReport::new(&matrix, &data.class_names)?;
    info!(accuracy = matrix.accuracy(), "evaluation complete");

    Ok(TrainOutput {
        n_train: holdout.train_labels.len(),
        n_test: holdout.test_labels.len(),
        accuracy: matrix.accuracy(),
        report,
        importances: result.importances().to_vec(),
        metadata: result.metadata().clone(),
    })
}

fn print_training(output: &TrainOutput, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(output)?);
    } else {
        println!("Accuracy: {}", output.accuracy);
        println!("{}", output.report);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Prepare { input, prepare: args } => {
            let (scaled, cleaning) = prepare(&input, &args)?;
            let output = PrepareOutput {
                input: input.data.display().to_string(),
                output: args.output.display().to_string(),
                n_features: scaled.n_features(),
                feature_names: scaled.feature_names().to_vec(),
                cleaning,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Describe { input, head, json } => {
            let table = read_table(&input.data)?;
            let description = describe(&table, &input.target, head)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&description)?);
            } else {
                print_description(&description);
            }
        }

        Command::Train { input, train: args } => {
            let output = train(&input, &args, cli.seed)?;
            print_training(&output, args.json)?;
        }

        Command::Run {
            input,
            prepare: prepare_args,
            train: train_args,
            head,
        } => {
            let (_, cleaning) = prepare(&input, &prepare_args)?;
            if !train_args.json {
                println!("Missing values before cleaning:");
                print_missing(&cleaning.missing_before);
            }
            info!(
                rows_before = cleaning.rows_before,
                rows_after = cleaning.rows_after,
                "prepare stage complete"
            );

            // Everything downstream reads the written file, not the in-memory table.
            let cleaned = DataArgs {
                data: prepare_args.output.clone(),
                target: input.target.clone(),
            };
            let written = read_table(&cleaned.data)?;
            let description = describe(&written, &cleaned.target, head)?;
            let output = train(&cleaned, &train_args, cli.seed)?;

            if train_args.json {
                #[derive(Serialize)]
                struct RunOutput<'a> {
                    cleaning: &'a CleanSummary,
                    description: &'a DescribeOutput,
                    training: &'a TrainOutput,
                }
                let run = RunOutput {
                    cleaning: &cleaning,
                    description: &description,
                    training: &output,
                };
                println!("{}", serde_json::to_string_pretty(&run)?);
            } else {
                print_description(&description);
                print_training(&output, false)?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_accepts_every_stage_option() {
        let cli = Cli::try_parse_from([
            "cardio", "run", "--data", "raw.csv", "--output", "out.csv", "--keep-incomplete",
            "--test-size", "0.25", "--n-trees", "10", "--head", "3", "--json",
        ])
        .unwrap();
        let Command::Run { prepare, train, head, .. } = cli.command else {
            panic!("expected run");
        };
        assert_eq!(head, 3);
        assert!(prepare.keep_incomplete);
        assert_eq!(train.n_trees, 10);
        assert!(train.json);
    }

    #[test]
    fn run_head_defaults_to_five() {
        let cli = Cli::try_parse_from(["cardio", "run"]).unwrap();
        assert!(matches!(cli.command, Command::Run { head: 5, .. }));
    }
}
