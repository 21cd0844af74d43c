use clap::{Arg, ArgAction, Command, arg};

use cpgkin_engine::consts::{DEFAULT_PRIOR, DEFAULT_THREADS};

pub const PREDICT_CMD: &str = "predict";

pub fn create_predict_cli() -> Command {
    Command::new(PREDICT_CMD)
        .author("cpgkin developers")
        .about("Predict the methylation probability of every CpG of a BED file from CCS kinetics.")
        .arg(
            arg!(--bam <bam>)
                .required(true)
                .help("Comma separated list of indexed CCS BAM files"),
        )
        .arg(
            arg!(--bed <bed>)
                .required(true)
                .help("BED file of CpGs to call (optionally gzipped)"),
        )
        .arg(
            Arg::new("model-meth")
                .long("model-meth")
                .required(true)
                .help("Model trained on methylated CpGs"),
        )
        .arg(
            Arg::new("model-unmeth")
                .long("model-unmeth")
                .required(true)
                .help("Model trained on unmethylated CpGs"),
        )
        .arg(
            Arg::new("prob")
                .long("prob")
                .value_parser(clap::value_parser!(f64))
                .help(format!(
                    "Prior probability of methylation [default: {}]",
                    DEFAULT_PRIOR
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
            Arg::new("max-reads")
                .long("max-reads")
                .value_parser(clap::value_parser!(usize))
                .help("Use at most this many reads per CpG"),
        )
        .arg(
            arg!(--stranded)
                .action(ArgAction::SetTrue)
                .help("Call each strand of the BED file on its own instead of both strands of every forward CpG together"),
        )
        .arg(
            arg!(--output <output>)
                .short('o')
                .help("Output BED file, gzipped when ending in .gz [default: stdout]"),
        )
        .arg(
            arg!(--progress)
                .action(ArgAction::SetTrue)
                .help("Show a progress bar"),
        )
}
