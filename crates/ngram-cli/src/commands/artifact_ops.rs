use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Serialize;

use ngram_core::artifact::{Candidate, NGramArtifact, NGramHeader, PredictOptions, SectionId};

const SAMPLE_SIZE: usize = 10;

fn open(file: &str) -> NGramArtifact {
    die!(
        NGramArtifact::open(Path::new(file)),
        "Error opening artifact {file}: {}"
    )
}

fn kind(candidate: &Candidate) -> &'static str {
    if candidate.is_word {
        "word"
    } else {
        "fragment"
    }
}

fn print_candidates(candidates: &[Candidate]) {
    for (rank, c) in candidates.iter().enumerate() {
        println!(
            "  {:>3}. {}\t{:.4}\t{} (id {})",
            rank + 1,
            c.text,
            c.weight,
            kind(c),
            c.id
        );
    }
}

#[derive(Serialize)]
struct InfoReport<'a> {
    file: &'a str,
    file_size: u64,
    header: &'a NGramHeader,
    words: usize,
    top: Vec<Candidate>,
}

pub fn info(file: &str, json: bool) {
    let artifact = open(file);
    let header = artifact.header();
    let file_size = fs::metadata(file).map(|m| m.len()).unwrap_or(0);
    let top = artifact.predict_prefix("", SAMPLE_SIZE);

    if json {
        let report = InfoReport {
            file,
            file_size,
            header,
            words: artifact.word_count(),
            top,
        };
        let text = die!(serde_json::to_string_pretty(&report), "Error: {}");
        println!("{text}");
        return;
    }

    println!("Artifact:   {file}");
    println!("File size:  {:.1} MB", file_size as f64 / 1_048_576.0);
    println!("Version:    {}", header.version);
    println!("Header:     {} bytes", header.header_size);
    println!("Entries:    {}", header.num_entries);
    println!("Max n:      {}", header.max_n);
    println!("Words:      {}", artifact.word_count());

    println!();
    println!("Sections:");
    for id in SectionId::ALL {
        let section = header.section(id);
        println!(
            "  {:<8} offset {:>10}  size {:>10}",
            id.name(),
            section.offset,
            section.size
        );
    }

    println!();
    println!("Heaviest entries:");
    if top.is_empty() {
        println!("  (empty)");
    }
    print_candidates(&top);
}

pub fn lookup(file: &str, key: &str) {
    let artifact = open(file);
    match artifact.lookup(key) {
        Some(c) => println!("{key}: {:.4} {} (id {})", c.weight, kind(&c), c.id),
        None => println!("{key}: not found"),
    }
}

/// Keys starting with `prefix`, heaviest first.
pub fn predict(file: &str, prefix: &str, n: usize, words_only: bool) {
    let artifact = open(file);
    let results: Vec<Candidate> = artifact
        .completions(prefix)
        .filter(|c| !words_only || c.is_word)
        .take(n)
        .collect();
    if results.is_empty() {
        println!("{prefix}: no completions");
        return;
    }
    println!("{prefix}: {} completions", results.len());
    print_candidates(&results);
}

/// Continuations of `context`, the way a keyboard suggests the next word.
pub fn continue_cmd(
    file: &str,
    context: &str,
    n: usize,
    words_only: bool,
    denylist_file: Option<&str>,
) {
    let artifact = open(file);
    let denylist = match denylist_file {
        Some(path) => {
            let text = die!(fs::read_to_string(path), "Error reading {path}: {}");
            parse_denylist(&text)
        }
        None => HashSet::new(),
    };
    let options = PredictOptions {
        max_results: n,
        words_only,
        denylist,
    };

    let results = artifact.predict(context, &options);
    if results.is_empty() {
        println!("{context}: no continuations");
        return;
    }
    println!("{context}: {} continuations", results.len());
    print_candidates(&results);
}

/// One term per line; blank lines and `#` comments are ignored.
pub fn parse_denylist(text: &str) -> HashSet<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}
