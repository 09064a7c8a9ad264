use clap::Parser;
use env_logger::Env;
use indel_converter::{cli, commands};

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = cli::Args::parse();

    let result = match args.command {
        cli::Commands::Convert {
            in_file,
            out_file,
            format,
            to_dash,
            threads,
            summary,
            quiet,
            lookup,
        } => commands::convert::run(in_file, out_file, format, to_dash, threads, summary, quiet, lookup)
            .map(|_| ()),
        cli::Commands::Fetch { regions, lookup } => commands::fetch::run(regions, lookup),
        cli::Commands::Check { lookup } => commands::check::run(lookup),
        cli::Commands::InitConfig { path, force } => {
            commands::init_config::run(path, force).map(|_| ())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
