use std::path::Path;

use ngram_core::config;

pub fn config_export() {
    print!("{}", config::default_toml());
}

pub fn config_validate(file: &str) {
    let config = die!(config::load_config(Path::new(file)), "Error: {}");
    let names: Vec<&str> = config.targets.iter().map(|t| t.name.as_str()).collect();
    println!(
        "OK: {} targets ({}), {} corpora, input {}",
        names.len(),
        names.join(", "),
        config.corpora.len(),
        config.input.csv.display()
    );
}
