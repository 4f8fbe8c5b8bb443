//! Subcommand bodies. Each prints its result, or a one-line diagnostic on
//! stderr followed by exit status 1.

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            std::process::exit(1);
        })
    };
}

pub mod artifact_ops;
pub mod build_ops;
pub mod config_ops;
