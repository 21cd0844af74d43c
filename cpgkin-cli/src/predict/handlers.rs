use std::path::Path;

use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use log::info;

use cpgkin_core::models::RegionSet;
use cpgkin_core::utils::split_path_list;
use cpgkin_engine::Predictor;
use cpgkin_engine::consts::{DEFAULT_PRIOR, DEFAULT_THREADS};
use cpgkin_io::{BamContainerSet, CcsKineticExtractor, PredictionWriter, TextOutput};
use cpgkin_models::{KineticClassifier, KineticModel, load_model};

fn load(matches: &ArgMatches, name: &str) -> Result<KineticModel> {
    let path = matches
        .get_one::<String>(name)
        .ok_or_else(|| anyhow!("--{} is required.", name))?;
    load_model(Path::new(path)).with_context(|| format!("Failed to load the model {}", path))
}

/// CpGs to call: forward CpGs stand for both strands unless `stranded`.
pub fn prediction_regions(regions: RegionSet, stranded: bool) -> RegionSet {
    if stranded {
        regions
    } else {
        regions.forward_as_unoriented()
    }
}

pub fn run_predict(matches: &ArgMatches) -> Result<()> {
    let bams = matches
        .get_one::<String>("bam")
        .map(|list| split_path_list(list))
        .ok_or_else(|| anyhow!("A list of BAM files is required."))?;

    let bed = matches
        .get_one::<String>("bed")
        .ok_or_else(|| anyhow!("A path to a BED file is required."))?;

    let prior = matches
        .get_one::<f64>("prob")
        .copied()
        .unwrap_or(DEFAULT_PRIOR);
    let threads = matches
        .get_one::<usize>("threads")
        .copied()
        .unwrap_or(DEFAULT_THREADS);
    let max_reads = matches.get_one::<usize>("max-reads").copied();
    let stranded = matches.get_flag("stranded");
    let progress = matches.get_flag("progress");
    let output = matches.get_one::<String>("output");

    let predictor = Predictor::new(threads, prior)?
        .with_max_reads(max_reads)
        .with_progress(progress);

    let methylated = load(matches, "model-meth")?;
    let unmethylated = load(matches, "model-unmeth")?;
    let extractor = CcsKineticExtractor::new(methylated.size())?;
    let classifier = KineticClassifier::new(extractor, methylated, unmethylated)?;

    let containers = BamContainerSet::new(bams)?;
    let regions = RegionSet::try_from(Path::new(bed))
        .with_context(|| format!("Failed to read CpGs from {}", bed))?;
    let regions = prediction_regions(regions, stranded);

    info!(
        "Calling {} CpGs from {} BAM file(s), prior {}",
        regions.len(),
        containers.paths().len(),
        prior
    );

    let destination = TextOutput::create(output).with_context(|| {
        format!(
            "Failed to open the output {}",
            output.map_or("-", |o| o.as_str())
        )
    })?;
    let mut writer = PredictionWriter::new(destination);

    predictor.run_with_sink(
        regions.as_slice(),
        &containers,
        &classifier,
        |region, probability| writer.write_prediction(region, probability),
    )?;

    let written = writer.written();
    writer.into_inner().finish()?;

    info!("Wrote {} methylation calls", written);

    Ok(())
}
