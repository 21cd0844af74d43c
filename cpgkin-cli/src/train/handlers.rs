use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use log::info;
use serde::Deserialize;

use cpgkin_core::models::RegionSet;
use cpgkin_core::utils::split_path_list;
use cpgkin_engine::Trainer;
use cpgkin_engine::consts::{DEFAULT_PSEUDOCOUNT, DEFAULT_THREADS};
use cpgkin_io::{BamContainerSet, CcsKineticExtractor};
use cpgkin_models::{KineticModel, ModelKind, ModelParams};

/// Model parameters as read from a `--params` TOML file. Every field may be
/// overridden on the command line.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ParamsFile {
    pub size: Option<usize>,
    pub nbins: Option<usize>,
    pub xmin: Option<f64>,
    pub xmax: Option<f64>,
    pub pseudocount: Option<f64>,
}

impl ParamsFile {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read parameters from {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("Invalid parameter file {}", path.display()))
    }
}

fn required<T>(flag: Option<T>, file: Option<T>, name: &str) -> Result<T> {
    flag.or(file)
        .ok_or_else(|| anyhow!("--{} is required when the parameter file does not set it", name))
}

///
/// Merge command line values over the parameter file.
///
/// Returns the model parameters and the pseudo-count.
///
pub fn resolve_params(matches: &ArgMatches, file: ParamsFile) -> Result<(ModelParams, f64)> {
    let params = ModelParams {
        size: required(matches.get_one::<usize>("size").copied(), file.size, "size")?,
        nbins: required(matches.get_one::<usize>("nbin").copied(), file.nbins, "nbin")?,
        xmin: required(matches.get_one::<f64>("xmin").copied(), file.xmin, "xmin")?,
        xmax: required(matches.get_one::<f64>("xmax").copied(), file.xmax, "xmax")?,
    };
    let pseudocount = matches
        .get_one::<f64>("pseudocount")
        .copied()
        .or(file.pseudocount)
        .unwrap_or(DEFAULT_PSEUDOCOUNT);

    Ok((params, pseudocount))
}

pub fn run_train(matches: &ArgMatches) -> Result<()> {
    let kind: ModelKind = matches
        .get_one::<String>("kind")
        .ok_or_else(|| anyhow!("A model kind is required."))?
        .parse()?;

    let bams = matches
        .get_one::<String>("bam")
        .map(|list| split_path_list(list))
        .ok_or_else(|| anyhow!("A list of BAM files is required."))?;

    let bed = matches
        .get_one::<String>("bed")
        .ok_or_else(|| anyhow!("A path to a BED file is required."))?;

    let out = matches
        .get_one::<String>("out")
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("An output path is required."))?;

    let file = match matches.get_one::<String>("params") {
        Some(path) => ParamsFile::from_path(Path::new(path))?,
        None => ParamsFile::default(),
    };
    let (params, pseudocount) = resolve_params(matches, file)?;

    let threads = matches
        .get_one::<usize>("threads")
        .copied()
        .unwrap_or(DEFAULT_THREADS);
    let progress = matches.get_flag("progress");

    // everything is checked before a single worker starts
    KineticModel::new(kind, params, pseudocount)?;
    let trainer = Trainer::new(threads, pseudocount)?.with_progress(progress);
    let extractor = CcsKineticExtractor::new(params.size)?;
    let containers = BamContainerSet::new(bams)?;
    let regions = RegionSet::try_from(Path::new(bed))
        .with_context(|| format!("Failed to read CpGs from {}", bed))?;

    info!(
        "Training a {} model (size {}, {} bins over [{}, {})) on {} CpGs from {} BAM file(s)",
        kind,
        params.size,
        params.nbins,
        params.xmin,
        params.xmax,
        regions.len(),
        containers.paths().len()
    );

    let trained = trainer.run(regions.as_slice(), &containers, &extractor, |bias| {
        KineticModel::new(kind, params, bias)
    })?;

    trained
        .accumulator
        .save(&out)
        .with_context(|| format!("Failed to write the model to {}", out.display()))?;

    info!(
        "Model written to {} ({} signal windows)",
        out.display(),
        trained.stats.ingested
    );

    Ok(())
}
