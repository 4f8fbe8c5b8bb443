use std::path::{Path, PathBuf};
use std::process;

use ngram_core::artifact::SectionId;
use ngram_core::config::{self, BuildConfig, InputConfig, TargetConfig};
use ngram_core::pipeline::{self, BuildReport};
use ngram_core::source::{CorpusSpec, CsvSchema};

/// Build the targets described by a configuration file.
pub fn build(config_file: &str, targets: &[String], json: bool) {
    let config = die!(
        config::load_config(Path::new(config_file)),
        "Error loading {config_file}: {}"
    );
    eprintln!(
        "Config: {config_file} ({} targets, {} corpora)",
        config.targets.len(),
        config.corpora.len()
    );
    let reports = die!(pipeline::run(&config, targets), "Error: {}");
    print_reports(&reports, json);
}

pub struct CompileOptions {
    pub csv: String,
    pub schema: String,
    /// `PATH` or `PATH=MARKER`.
    pub corpora: Vec<String>,
    /// OpenCC configuration id; `None` keeps keys as written.
    pub conversion: Option<String>,
    pub output: String,
    pub convert_corpora: bool,
    pub json: bool,
}

/// Single-target build straight from command-line arguments.
pub fn compile(opts: &CompileOptions) {
    let schema = CsvSchema::from_name(&opts.schema).unwrap_or_else(|| {
        eprintln!(
            "Error: unknown schema '{}' (available: text-weight, text-ignored-weight)",
            opts.schema
        );
        process::exit(1);
    });

    let output = PathBuf::from(&opts.output);
    let name = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "default".to_string());

    let config = BuildConfig {
        input: InputConfig {
            csv: PathBuf::from(&opts.csv),
            schema,
        },
        corpora: opts.corpora.iter().map(|a| parse_corpus_arg(a)).collect(),
        targets: vec![TargetConfig {
            name,
            output,
            conversion: opts.conversion.clone(),
            convert_corpora: opts.convert_corpora,
        }],
    };

    let reports = die!(pipeline::run(&config, &[]), "Error: {}");
    print_reports(&reports, opts.json);
}

/// `PATH=MARKER` sets a start marker; a plain `PATH` has none.
pub fn parse_corpus_arg(arg: &str) -> CorpusSpec {
    match arg.rsplit_once('=') {
        Some((path, marker)) if !path.is_empty() && !marker.is_empty() => {
            CorpusSpec::new(path).with_start_marker(marker)
        }
        _ => CorpusSpec::new(arg),
    }
}

fn print_reports(reports: &[BuildReport], json: bool) {
    if json {
        let text = die!(serde_json::to_string_pretty(reports), "Error: {}");
        println!("{text}");
        return;
    }

    for report in reports {
        let stats = &report.stats;
        eprintln!(
            "Target {}: {} entries from {} rows ({} merged), maxN {}, {} words",
            report.target,
            stats.entries,
            stats.raw_entries,
            stats.collisions,
            stats.max_n,
            stats.words
        );
        for id in SectionId::ALL {
            let section = report.header.section(id);
            eprintln!(
                "  {:<8} {:>10} bytes at {}",
                id.name(),
                section.size,
                section.offset
            );
        }
        eprintln!(
            "Wrote {} ({:.1} MB)",
            report.output.display(),
            report.file_size as f64 / 1_048_576.0
        );
    }
}
