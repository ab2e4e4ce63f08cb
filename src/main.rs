use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use sylva_io::{DEFAULT_N_ATTRIBUTES, RecordReader};
use sylva_tree::{
    ClassMetrics, DecisionTreeConfig, Evaluation, Instance, Label, RandomForestConfig,
    SplitCriterion, evaluate,
};

#[derive(Parser)]
#[command(name = "sylva")]
#[command(about = "ID3/C4.5 decision trees and random forests over categorical records")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for bootstrapping and unseen-value fallbacks
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Number of attributes per record
    #[arg(long, default_value_t = DEFAULT_N_ATTRIBUTES, global = true)]
    n_attributes: usize,

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

/// Input files and output options shared by every model.
#[derive(Args, Debug, Clone)]
struct DataArgs {
    /// Path to the training records
    #[arg(long)]
    train: PathBuf,

    /// Path to held-out test records (evaluation is skipped if not set)
    #[arg(long)]
    test: Option<PathBuf>,

    /// Rank attributes by gain ratio (C4.5) instead of information gain (ID3)
    #[arg(long, default_value_t = false)]
    gain_ratio: bool,

    /// Dump the fitted tree structure to stdout
    #[arg(long, default_value_t = false)]
    print: bool,
}

impl DataArgs {
    fn criterion(&self) -> SplitCriterion {
        if self.gain_ratio {
            SplitCriterion::GainRatio
        } else {
            SplitCriterion::InformationGain
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Train a single decision tree
    Tree {
        #[command(flatten)]
        data: DataArgs,
    },

    /// Train a bagged random forest
    Forest {
        /// Number of trees in the forest
        #[arg(long, default_value_t = 10)]
        n_trees: usize,

        /// Bootstrap size per tree as a fraction of the training set
        #[arg(long, default_value_t = 1.0)]
        sample_ratio: f64,

        #[command(flatten)]
        data: DataArgs,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct TreeOutput {
    criterion: SplitCriterion,
    n_train: usize,
    n_nodes: usize,
    n_leaves: usize,
    depth: usize,
    n_decisions: usize,
    evaluation: Option<EvaluationOutput>,
}

#[derive(Serialize)]
struct ForestOutput {
    criterion: SplitCriterion,
    n_train: usize,
    n_trees: usize,
    sample_ratio: f64,
    total_nodes: usize,
    evaluation: Option<EvaluationOutput>,
}

#[derive(Serialize)]
struct EvaluationOutput {
    n_test: usize,
    n_correct: usize,
    accuracy: f64,
    labels: Vec<Label>,
    confusion_matrix: Vec<Vec<usize>>,
    class_metrics: Vec<ClassMetrics>,
}

impl From<Evaluation> for EvaluationOutput {
    fn from(eval: Evaluation) -> Self {
        Self {
            n_test: eval.n_samples,
            n_correct: eval.n_correct,
            accuracy: eval.accuracy,
            labels: eval.confusion_matrix.labels().to_vec(),
            confusion_matrix: eval.confusion_matrix.as_rows().to_vec(),
            class_metrics: eval.confusion_matrix.class_metrics(),
        }
    }
}

fn read_records(path: &Path, n_attributes: usize) -> Result<Vec<Instance>> {
    RecordReader::new(path)
        .with_n_attributes(n_attributes)
        .read()
        .with_context(|| format!("failed to read records from {}", path.display()))
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
        Command::Tree { data } => {
            let train = read_records(&data.train, cli.n_attributes)?;

            let tree = DecisionTreeConfig::new()
                .with_criterion(data.criterion())
                .fit(&train)
                .context("tree training failed")?;
            info!(
                n_nodes = tree.n_nodes(),
                depth = tree.depth(),
                "decision tree trained"
            );

            if data.print {
                print!("{tree}");
            }

            let evaluation = match &data.test {
                Some(path) => {
                    let test = read_records(path, cli.n_attributes)?;
                    let eval = evaluate(&tree, &test, cli.seed).context("evaluation failed")?;
                    Some(EvaluationOutput::from(eval))
                }
                None => None,
            };

            let output = TreeOutput {
                criterion: tree.criterion(),
                n_train: train.len(),
                n_nodes: tree.n_nodes(),
                n_leaves: tree.n_leaves(),
                depth: tree.depth(),
                n_decisions: tree.n_decisions(),
                evaluation,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Forest {
            n_trees,
            sample_ratio,
            data,
        } => {
            let train = read_records(&data.train, cli.n_attributes)?;

            let forest = RandomForestConfig::new(n_trees)?
                .with_sample_ratio(sample_ratio)
                .with_criterion(data.criterion())
                .with_seed(cli.seed)
                .fit(&train)
                .context("forest training failed")?;

            if data.print {
                print!("{forest}");
            }

            let evaluation = match &data.test {
                Some(path) => {
                    let test = read_records(path, cli.n_attributes)?;
                    let eval = evaluate(&forest, &test, cli.seed).context("evaluation failed")?;
                    Some(EvaluationOutput::from(eval))
                }
                None => None,
            };

            let output = ForestOutput {
                criterion: forest.criterion(),
                n_train: train.len(),
                n_trees: forest.n_trees(),
                sample_ratio: forest.sample_ratio(),
                total_nodes: forest.trees().iter().map(|t| t.n_nodes()).sum(),
                evaluation,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
