mod dump;
mod predict;
mod train;

use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use env_logger::Env;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PKG_NAME: &str = "cpgkin";
    pub const BIN_NAME: &str = "cpgkin";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .author("cpgkin developers")
        .about("Call CpG methylation from PacBio CCS kinetics: train histogram models on labelled reads, then predict per-CpG methylation probabilities.")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log per-slice details (overridden by RUST_LOG)"),
        )
        .subcommand(train::cli::create_train_cli())
        .subcommand(predict::cli::create_predict_cli())
        .subcommand(dump::cli::create_dump_cli())
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();

    let level = if matches.get_flag("verbose") {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    match matches.subcommand() {
        //
        // TRAIN
        //
        Some((train::cli::TRAIN_CMD, matches)) => {
            train::handlers::run_train(matches)?;
        }

        //
        // PREDICT
        //
        Some((predict::cli::PREDICT_CMD, matches)) => {
            predict::handlers::run_predict(matches)?;
        }

        //
        // DUMP
        //
        Some((dump::cli::DUMP_CMD, matches)) => {
            dump::handlers::run_dump(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::*;

    #[rstest]
    fn test_parser_is_consistent() {
        build_parser().debug_assert();
    }

    #[rstest]
    fn test_verbose_is_global() {
        let matches = build_parser()
            .try_get_matches_from(["cpgkin", "dump", "--model", "m.bin", "--verbose"])
            .unwrap();
        assert!(matches.get_flag("verbose"));
    }

    #[rstest]
    fn test_subcommand_is_required() {
        assert!(build_parser().try_get_matches_from(["cpgkin"]).is_err());
    }
}
