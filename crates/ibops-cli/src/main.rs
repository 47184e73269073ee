mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "ibops",
    version,
    about = "Inbound warehouse operations analyzer: PPA, Air vs Ground, hours and snapshot"
)]
struct Cli {
    /// Log lookups and skipped rows (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Location categories and small-volume reach moves from a PPA export
    Ppa {
        /// Path to XLSX export or pre-parsed JSON rows
        input_file: PathBuf,

        /// Item master JSON (ITEM_NUMBER, CUBIC_VOL)
        #[arg(short, long, value_name = "FILE")]
        item_master: Option<PathBuf>,

        /// Custom JSON rule file replacing the PPA locations
        #[arg(short, long, value_name = "FILE")]
        rules: Option<PathBuf>,

        /// Spreadsheet row holding the column headers (0-based)
        #[arg(long, default_value_t = 1)]
        header_row: usize,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Air vs Ground split and cart analysis of a put-away export
    AirGround {
        /// Path to XLSX export or pre-parsed JSON rows
        input_file: PathBuf,

        /// Item master JSON (ITEM_NUMBER, CUBIC_VOL)
        #[arg(short, long, value_name = "FILE")]
        item_master: Option<PathBuf>,

        /// Custom JSON rule file replacing the Air/Ground rules
        #[arg(short, long, value_name = "FILE")]
        rules: Option<PathBuf>,

        /// Compare two periods: baseline start/end, current start/end
        #[arg(
            long,
            num_args = 4,
            value_names = ["P1_START", "P1_END", "P2_START", "P2_END"]
        )]
        compare: Option<Vec<String>>,

        /// Spreadsheet row holding the column headers (0-based)
        #[arg(long, default_value_t = 0)]
        header_row: usize,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Bucket a pasted labor-hours listing
    Hours {
        /// Text file with "function <tab> hours" lines
        input_file: PathBuf,

        /// Baseline listing (e.g. a 4-week average) to compare against
        #[arg(short, long, value_name = "FILE")]
        baseline: Option<PathBuf>,

        /// Custom labor-function map replacing the hours buckets
        #[arg(short = 'm', long, value_name = "FILE")]
        labor_map: Option<PathBuf>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Inbound KPIs from a transaction history and/or a labor report
    Snapshot {
        /// Transaction history (XLSX or JSON rows)
        #[arg(short, long, value_name = "FILE")]
        transactions: Option<PathBuf>,

        /// Pasted labor-management report (text)
        #[arg(short, long, value_name = "FILE")]
        labor: Option<PathBuf>,

        /// Custom labor-function map replacing the direct/indirect buckets
        #[arg(short = 'm', long, value_name = "FILE")]
        labor_map: Option<PathBuf>,

        /// Spreadsheet row holding the column headers (0-based)
        #[arg(long, default_value_t = 0)]
        header_row: usize,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Manage and inspect rule sets
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },
}

#[derive(Subcommand)]
enum RulesAction {
    /// List predefined rule sets and labor maps
    List,
    /// Explain a preset in plain language
    Explain {
        /// Preset name (e.g., "ppa")
        preset: String,
    },
    /// Print the JSON rule schema with an example
    Schema,
    /// Validate a custom rule file
    Validate {
        /// Path to JSON rule file
        file: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Ppa {
            input_file,
            item_master,
            rules,
            header_row,
            output,
        } => commands::ppa::run(input_file, item_master, rules, header_row, &output),
        Commands::AirGround {
            input_file,
            item_master,
            rules,
            compare,
            header_row,
            output,
        } => commands::air_ground::run(input_file, item_master, rules, compare, header_row, &output),
        Commands::Hours {
            input_file,
            baseline,
            labor_map,
            output,
        } => commands::hours::run(input_file, baseline, labor_map, &output),
        Commands::Snapshot {
            transactions,
            labor,
            labor_map,
            header_row,
            output,
        } => commands::snapshot::run(transactions, labor, labor_map, header_row, &output),
        Commands::Rules { action } => match action {
            RulesAction::List => commands::rules::list(),
            RulesAction::Explain { preset } => commands::rules::explain(&preset),
            RulesAction::Schema => commands::rules::schema(),
            RulesAction::Validate { file } => commands::rules::validate(&file),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
