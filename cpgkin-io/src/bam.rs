use std::ffi::OsString;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use noodles::bam;
use noodles::bgzf::Reader;
use noodles::core::region::Interval;
use noodles::core::{Position, Region as QueryRegion};
use noodles::sam;

use cpgkin_core::models::Region;
use cpgkin_core::traits::{ReadContainerSet, RegionStream};

use crate::ccs::CcsRead;
use crate::error::{BamError, Result};

pub type IndexedBamReader = bam::io::IndexedReader<Reader<File>>;

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

///
/// Make sure a BAM file exists and has an index next to it
/// (`<file>.bai` or `<file>.csi`).
///
pub fn check_bam_file(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(BamError::MissingFile(path.to_path_buf()));
    }
    let indexed = [".bai", ".csi"]
        .iter()
        .any(|suffix| with_suffix(path, suffix).is_file());
    if !indexed {
        return Err(BamError::MissingIndex(path.to_path_buf()));
    }
    Ok(())
}

///
/// A list of indexed CCS BAM files, queried together.
///
/// Every call to [`ReadContainerSet::open`] opens all files anew, so each
/// worker reads through its own file handles.
///
#[derive(Debug, Clone)]
pub struct BamContainerSet {
    paths: Vec<PathBuf>,
}

impl BamContainerSet {
    pub fn new(paths: Vec<PathBuf>) -> Result<Self> {
        if paths.is_empty() {
            return Err(BamError::NoContainers);
        }
        for path in &paths {
            check_bam_file(path)?;
        }
        Ok(BamContainerSet { paths })
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

pub struct BamRegionStream {
    readers: Vec<(IndexedBamReader, sam::Header)>,
}

impl ReadContainerSet for BamContainerSet {
    type Read = CcsRead;
    type Stream = BamRegionStream;

    fn open(&self) -> io::Result<BamRegionStream> {
        let mut readers = Vec::with_capacity(self.paths.len());
        for path in &self.paths {
            let mut reader = bam::io::indexed_reader::Builder::default()
                .build_from_path(path)
                .map_err(|err| {
                    io::Error::new(err.kind(), format!("{}: {}", path.display(), err))
                })?;
            let header = reader.read_header()?;
            readers.push((reader, header));
        }
        Ok(BamRegionStream { readers })
    }
}

fn has_reference(header: &sam::Header, name: &str) -> bool {
    header
        .reference_sequences()
        .keys()
        .any(|key| key.as_slice() == name.as_bytes())
}

impl RegionStream for BamRegionStream {
    type Read = CcsRead;

    fn fetch(&mut self, region: &Region) -> io::Result<Vec<CcsRead>> {
        let to_position = |value: usize| {
            Position::try_from(value)
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))
        };
        // noodles positions are 1-based and inclusive
        let start = to_position(region.start as usize + 1)?;
        let end = to_position((region.end as usize).max(region.start as usize + 1))?;
        let query_region = QueryRegion::new(region.chr.as_str(), Interval::from(start..=end));

        let mut reads = Vec::new();
        for (reader, header) in self.readers.iter_mut() {
            if !has_reference(header, &region.chr) {
                debug!("{} is not in the BAM header, no reads", region.chr);
                continue;
            }
            let query = reader.query(header, &query_region)?;
            for result in query {
                let record = result?;
                reads.push(CcsRead::from_record(&record)?);
            }
        }

        Ok(reads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::*;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        File::create(&path).unwrap();
        path
    }

    #[rstest]
    #[case(".bai")]
    #[case(".csi")]
    fn test_indexed_bam_is_accepted(#[case] suffix: &str) {
        let dir = tempfile::tempdir().unwrap();
        let bam = touch(&dir, "reads.bam");
        touch(&dir, &format!("reads.bam{}", suffix));

        assert!(check_bam_file(&bam).is_ok());
        assert!(BamContainerSet::new(vec![bam]).is_ok());
    }

    #[rstest]
    fn test_missing_index() {
        let dir = tempfile::tempdir().unwrap();
        let bam = touch(&dir, "reads.bam");

        assert!(matches!(
            check_bam_file(&bam),
            Err(BamError::MissingIndex(_))
        ));
    }

    #[rstest]
    fn test_missing_file() {
        assert!(matches!(
            check_bam_file(Path::new("/nonexistent/reads.bam")),
            Err(BamError::MissingFile(_))
        ));
    }

    #[rstest]
    fn test_no_containers() {
        assert!(matches!(
            BamContainerSet::new(vec![]),
            Err(BamError::NoContainers)
        ));
    }

    #[rstest]
    fn test_one_bad_file_rejects_the_set() {
        let dir = tempfile::tempdir().unwrap();
        let good = touch(&dir, "a.bam");
        touch(&dir, "a.bam.bai");
        let bad = touch(&dir, "b.bam");

        assert!(matches!(
            BamContainerSet::new(vec![good, bad]),
            Err(BamError::MissingIndex(path)) if path.ends_with("b.bam")
        ));
    }

    #[rstest]
    fn test_index_suffix_is_appended() {
        assert_eq!(
            with_suffix(Path::new("/data/reads.bam"), ".bai"),
            PathBuf::from("/data/reads.bam.bai")
        );
    }
}
