// src/main.rs
use anyhow::Result;
use rawcheckr::cli::{self, Args};

fn main() -> Result<()> {
    let args = Args::parse_args();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    cli::run(args)
}
