//! Flir command-line tool
//!
//! Encodes, decodes, validates and analyzes `.ir` files produced by the
//! source adapter.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use flir_cli::commands::{self, Format};
use flir_cli::config::FlirConfig;
use flir_cli::output::{resolve_color_choice, StyledOutput};
use flir_cli::tracing_config;

#[derive(Parser)]
#[command(name = "flir")]
#[command(about = "Typed IR toolkit for UI component source files", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to the nearest flir.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Colorize output: auto, always, never
    #[arg(long, global = true)]
    color: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a JSON IR document to .ir
    Encode {
        /// Input .json file
        input: PathBuf,
        /// Output path (defaults to the input with an .ir extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Omit the SHA-256 trailer
        #[arg(long)]
        no_checksum: bool,
        /// Omit source locations and node metadata
        #[arg(long)]
        no_debug_info: bool,
    },

    /// Decode an .ir file to JSON
    Decode {
        /// Input .ir file
        input: PathBuf,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run the flow-analysis pass
    Analyze {
        /// Files or directories to analyze
        #[arg(default_value = ".")]
        paths: Vec<String>,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
        /// Worker threads (defaults to the number of CPUs)
        #[arg(short = 'j', long)]
        threads: Option<usize>,
    },

    /// Check an .ir file's integrity, consistency and round trip
    Validate {
        /// Input .ir file
        input: PathBuf,
        /// Expected tree as .json or .ir
        #[arg(long)]
        golden: Option<PathBuf>,
    },

    /// Show section sizes and node counts of an .ir file
    Stats {
        /// Input .ir file
        input: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
    },

    /// List analysis rules
    Rules,
}

fn main() -> anyhow::Result<()> {
    tracing_config::init_tracing();
    let cli = Cli::parse();
    let config = FlirConfig::resolve(cli.config.as_deref())?;
    let mut out = StyledOutput::new(resolve_color_choice(cli.color.as_deref()));

    let ok = match cli.command {
        Commands::Encode {
            input,
            output,
            no_checksum,
            no_debug_info,
        } => {
            let mut options = config.codec.write_options();
            options.checksum &= !no_checksum;
            options.debug_info &= !no_debug_info;
            let output = output.unwrap_or_else(|| commands::encode::default_output(&input));
            commands::encode::execute(&input, &output, options, &mut out)?;
            true
        }

        Commands::Decode { input, output } => {
            commands::decode::execute(&input, output.as_deref())?;
            true
        }

        Commands::Analyze {
            paths,
            format,
            threads,
        } => commands::analyze::execute(&paths, format, &config, threads, &mut out)?,

        Commands::Validate { input, golden } => {
            commands::validate::execute(&input, golden.as_deref(), &mut out)?
        }

        Commands::Stats { input, format } => {
            commands::stats::execute(&input, format, &mut out)?;
            true
        }

        Commands::Rules => {
            commands::rules::execute(&config.analysis, &mut out);
            true
        }
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
