use std::path::Path;

use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;

use cpgkin_io::TextOutput;
use cpgkin_models::dump::write_tsv;
use cpgkin_models::load_model;

pub fn run_dump(matches: &ArgMatches) -> Result<()> {
    let model = matches
        .get_one::<String>("model")
        .ok_or_else(|| anyhow!("A path to a model file is required."))?;
    let output = matches.get_one::<String>("output");

    let model = load_model(Path::new(model))
        .with_context(|| format!("Failed to load the model {}", model))?;

    let mut destination = TextOutput::create(output)?;
    write_tsv(&model, &mut destination)?;
    destination.finish()?;

    Ok(())
}
