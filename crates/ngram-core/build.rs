fn main() {
    // Validate embedded TOML files at compile time.
    validate_toml(
        "src/default_build.toml",
        include_str!("src/default_build.toml"),
    );
}

fn validate_toml(path: &str, content: &str) {
    if content.parse::<toml::Value>().is_err() {
        panic!("{path} contains invalid TOML");
    }
}
