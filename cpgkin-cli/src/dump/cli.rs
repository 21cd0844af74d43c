use clap::{Command, arg};

pub const DUMP_CMD: &str = "dump";

pub fn create_dump_cli() -> Command {
    Command::new(DUMP_CMD)
        .author("cpgkin developers")
        .about("Print the histograms of a model file as tab separated text.")
        .arg(
            arg!(--model <model>)
                .required(true)
                .help("Model file written by train"),
        )
        .arg(
            arg!(--output <output>)
                .short('o')
                .help("Output file, gzipped when ending in .gz [default: stdout]"),
        )
}
