use clap::{Arg, ArgAction, Command, arg};

use cpgkin_engine::consts::{DEFAULT_PSEUDOCOUNT, DEFAULT_THREADS};

pub const TRAIN_CMD: &str = "train";

pub fn create_train_cli() -> Command {
    Command::new(TRAIN_CMD)
        .author("cpgkin developers")
        .about("Train a kinetic model from CCS reads over a set of CpGs of known methylation state.")
        .arg(
            Arg::new("kind")
                .required(true)
                .value_parser(["raw", "diposition", "pairwise"])
                .help("Model kind: one histogram per position (raw), per adjacent position pair (diposition) or per position pair (pairwise)"),
        )
        .arg(
            arg!(--bam <bam>)
                .required(true)
                .help("Comma separated list of indexed CCS BAM files"),
        )
        .arg(
            arg!(--bed <bed>)
                .required(true)
                .help("BED file of CpGs to learn from (optionally gzipped)"),
        )
        .arg(
            arg!(--out <out>)
                .required(true)
                .help("Where to write the trained model"),
        )
        .arg(
            Arg::new("params")
                .long("params")
                .help("TOML file with size, nbins, xmin, xmax and pseudocount; flags take precedence"),
        )
        .arg(
            Arg::new("size")
                .long("size")
                .value_parser(clap::value_parser!(usize))
                .help("Signal window size, odd"),
        )
        .arg(
            Arg::new("nbin")
                .long("nbin")
                .value_parser(clap::value_parser!(usize))
                .help("Number of histogram bins"),
        )
        .arg(
            Arg::new("xmin")
                .long("xmin")
                .value_parser(clap::value_parser!(f64))
                .allow_negative_numbers(true)
                .help("Lower bound of the histogram range"),
        )
        .arg(
            Arg::new("xmax")
                .long("xmax")
                .value_parser(clap::value_parser!(f64))
                .allow_negative_numbers(true)
                .help("Upper bound of the histogram range"),
        )
        .arg(
            Arg::new("pseudocount")
                .long("pseudocount")
                .value_parser(clap::value_parser!(f64))
                .help(format!(
                    "Count added to every histogram bin [default: {}]",
                    DEFAULT_PSEUDOCOUNT
                )),
        )
        .arg(
            Arg::new("threads")
                .long("threads")
                .short('t')
                .value_parser(clap::value_parser!(usize))
                .help(format!("Number of worker threads [default: {}]", DEFAULT_THREADS)),
        )
        .arg(
            arg!(--progress)
                .action(ArgAction::SetTrue)
                .help("Show a progress bar"),
        )
}
