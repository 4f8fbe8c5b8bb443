use clap::{Parser, Subcommand};

use ngram_cli::commands::{artifact_ops, build_ops, config_ops};
use ngram_cli::trace_init;

#[derive(Parser)]
#[command(name = "ngramtool", about = "N-gram prediction dictionary compiler")]
struct Cli {
    /// Emit log events as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build every target of a build configuration
    Build {
        /// Build configuration (TOML)
        config: String,
        /// Only build this target (repeatable)
        #[arg(long = "target")]
        targets: Vec<String>,
        /// Print build reports as JSON on stdout
        #[arg(long)]
        json: bool,
    },
    /// Compile one artifact without a configuration file
    Compile {
        /// Frequency table (CSV, first line is a header)
        csv: String,
        /// Output artifact
        #[arg(short, long)]
        output: String,
        /// CSV layout: text-weight or text-ignored-weight
        #[arg(long, default_value = "text-weight")]
        schema: String,
        /// Phrase corpus as PATH or PATH=START_MARKER (repeatable)
        #[arg(long = "corpus")]
        corpora: Vec<String>,
        /// OpenCC conversion id, e.g. hk2s or t2s
        #[arg(long)]
        conversion: Option<String>,
        /// Convert corpus words with the same conversion
        #[arg(long)]
        convert_corpora: bool,
        /// Print the build report as JSON on stdout
        #[arg(long)]
        json: bool,
    },
    /// Show header, section table and heaviest entries of an artifact
    Info {
        /// Artifact file
        file: String,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Look up one key (exact match)
    Lookup {
        /// Artifact file
        file: String,
        /// Key to look up
        key: String,
    },
    /// List keys starting with a prefix, heaviest first
    Predict {
        /// Artifact file
        file: String,
        /// Query prefix
        prefix: String,
        /// Number of results
        #[arg(short, long, default_value = "10")]
        n: usize,
        /// Only complete words
        #[arg(long)]
        words_only: bool,
    },
    /// Suggest continuations of a context text
    Continue {
        /// Artifact file
        file: String,
        /// Text typed so far
        context: String,
        /// Number of results
        #[arg(short, long, default_value = "10")]
        n: usize,
        /// Only complete words
        #[arg(long)]
        words_only: bool,
        /// File of terms to suppress, one per line
        #[arg(long)]
        denylist: Option<String>,
    },
    /// Export the default build configuration as TOML
    ConfigExport,
    /// Validate a build configuration file
    ConfigValidate {
        /// Path to the TOML file
        file: String,
    },
}

fn main() {
    let cli = Cli::parse();
    trace_init::init_tracing(cli.log_json);

    match cli.command {
        Command::Build {
            config,
            targets,
            json,
        } => build_ops::build(&config, &targets, json),
        Command::Compile {
            csv,
            output,
            schema,
            corpora,
            conversion,
            convert_corpora,
            json,
        } => build_ops::compile(&build_ops::CompileOptions {
            csv,
            schema,
            corpora,
            conversion,
            output,
            convert_corpora,
            json,
        }),
        Command::Info { file, json } => artifact_ops::info(&file, json),
        Command::Lookup { file, key } => artifact_ops::lookup(&file, &key),
        Command::Predict {
            file,
            prefix,
            n,
            words_only,
        } => artifact_ops::predict(&file, &prefix, n, words_only),
        Command::Continue {
            file,
            context,
            n,
            words_only,
            denylist,
        } => artifact_ops::continue_cmd(&file, &context, n, words_only, denylist.as_deref()),
        Command::ConfigExport => config_ops::config_export(),
        Command::ConfigValidate { file } => config_ops::config_validate(&file),
    }
}
