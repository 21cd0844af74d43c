//! Binary model files.
//!
//! A model file is a bincode encoded [`ModelFile`]: magic bytes, a format
//! version, the kind tag and the model itself. Loading checks all three
//! before handing the model out.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::{ModelError, Result};
use crate::kinetic::{KineticModel, ModelKind};

pub const MODEL_MAGIC: [u8; 8] = *b"CPGKINMD";
pub const MODEL_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct ModelFile {
    magic: [u8; 8],
    version: u32,
    kind: ModelKind,
    model: KineticModel,
}

pub fn write_model<W: Write>(model: &KineticModel, writer: W) -> Result<()> {
    let file = ModelFile {
        magic: MODEL_MAGIC,
        version: MODEL_FORMAT_VERSION,
        kind: model.kind(),
        model: model.clone(),
    };
    bincode::serialize_into(writer, &file)?;
    Ok(())
}

pub fn read_model<R: Read>(mut reader: R) -> Result<KineticModel> {
    let mut magic = [0u8; 8];
    reader
        .read_exact(&mut magic)
        .map_err(|_| ModelError::NotAModel)?;
    if magic != MODEL_MAGIC {
        return Err(ModelError::NotAModel);
    }

    let version: u32 = bincode::deserialize_from(&mut reader)?;
    if version != MODEL_FORMAT_VERSION {
        return Err(ModelError::UnsupportedVersion(version));
    }

    let kind: ModelKind = bincode::deserialize_from(&mut reader)?;
    let model: KineticModel = bincode::deserialize_from(&mut reader)?;

    if model.kind() != kind {
        return Err(ModelError::KindMismatch {
            declared: kind,
            found: model.kind(),
        });
    }
    model.check_layout()?;

    Ok(model)
}

/// Save a model to `path`, replacing any existing file.
pub fn save_model(model: &KineticModel, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_model(model, &mut writer)?;
    writer.flush()?;
    debug!("Saved {} model to {}", model.kind(), path.display());
    Ok(())
}

pub fn load_model(path: &Path) -> Result<KineticModel> {
    let reader = BufReader::new(File::open(path)?);
    let model = read_model(reader)?;
    debug!(
        "Loaded {} model (size {}, {} bins) from {}",
        model.kind(),
        model.size(),
        model.params().nbins,
        path.display()
    );
    Ok(model)
}

impl KineticModel {
    pub fn save(&self, path: &Path) -> Result<()> {
        save_model(self, path)
    }

    pub fn load(path: &Path) -> Result<Self> {
        load_model(path)
    }
}
