use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::errors::RegionSetError;
use crate::models::{Region, Strand};
use crate::traits::RegionSource;
use crate::utils::get_dynamic_reader;

///
/// RegionSet struct, the ordered, index-addressable list of regions a run
/// works on. Order is the order of the source file and is never changed.
///
#[derive(Clone, Debug)]
pub struct RegionSet {
    pub regions: Vec<Region>,
    pub path: Option<PathBuf>,
}

///
/// A BED file read lazily, one region at a time. Calling
/// [`RegionSource::regions`] again re-opens the file and starts over.
///
#[derive(Clone, Debug)]
pub struct BedSource {
    path: PathBuf,
}

pub struct BedRegions {
    lines: std::io::Lines<std::io::BufReader<Box<dyn std::io::Read>>>,
    line_number: usize,
    first_record: bool,
}

impl BedSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        BedSource {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RegionSource for BedSource {
    type Iter = BedRegions;

    fn regions(&self) -> Result<Self::Iter, RegionSetError> {
        let reader = get_dynamic_reader(&self.path)
            .map_err(|err| RegionSetError::FileReadError(format!("{:#}", err)))?;

        Ok(BedRegions {
            lines: reader.lines(),
            line_number: 0,
            first_record: true,
        })
    }
}

impl Iterator for BedRegions {
    type Item = Result<Region, RegionSetError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => return Some(Err(err.into())),
            };
            self.line_number += 1;

            if line.trim().is_empty()
                || line.starts_with("browser")
                || line.starts_with("track")
                || line.starts_with('#')
            {
                continue;
            }

            let parts: Vec<&str> = line.split('\t').collect();

            // column header like `chrom start end` without a leading #
            if self.first_record {
                self.first_record = false;
                if parts.len() >= 3 && parts[1].parse::<u32>().is_err() {
                    continue;
                }
            }

            return Some(parse_bed_line(&parts, self.line_number));
        }
    }
}

fn parse_bed_line(parts: &[&str], line: usize) -> Result<Region, RegionSetError> {
    if parts.len() < 3 {
        return Err(RegionSetError::RegionParseError {
            line,
            reason: format!("expected at least 3 columns, found {}", parts.len()),
        });
    }

    let start: u32 = parts[1]
        .trim()
        .parse()
        .map_err(|_| RegionSetError::RegionParseError {
            line,
            reason: format!("bad start position {:?}", parts[1]),
        })?;
    let end: u32 = parts[2]
        .trim()
        .parse()
        .map_err(|_| RegionSetError::RegionParseError {
            line,
            reason: format!("bad end position {:?}", parts[2]),
        })?;

    if end < start {
        return Err(RegionSetError::RegionParseError {
            line,
            reason: format!("end {} is before start {}", end, start),
        });
    }

    let strand = match parts.get(5) {
        Some(symbol) => symbol.trim().parse::<Strand>()?,
        None => Strand::Unoriented,
    };

    Ok(Region {
        chr: parts[0].to_owned(),
        start,
        end,
        strand,
    })
}

impl TryFrom<&Path> for RegionSet {
    type Error = RegionSetError;

    ///
    /// Create a new [RegionSet] from a bed file, keeping file order.
    ///
    /// # Arguments:
    /// - value: path to bed file on disk.
    fn try_from(value: &Path) -> Result<Self, Self::Error> {
        let source = BedSource::new(value);
        let regions = source.regions()?.collect::<Result<Vec<Region>, _>>()?;

        Ok(RegionSet {
            regions,
            path: Some(value.to_owned()),
        })
    }
}

impl TryFrom<&str> for RegionSet {
    type Error = RegionSetError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        RegionSet::try_from(Path::new(value))
    }
}

impl TryFrom<PathBuf> for RegionSet {
    type Error = RegionSetError;

    fn try_from(value: PathBuf) -> Result<Self, Self::Error> {
        RegionSet::try_from(value.as_path())
    }
}

impl From<Vec<Region>> for RegionSet {
    fn from(regions: Vec<Region>) -> Self {
        RegionSet {
            regions,
            path: None,
        }
    }
}

impl<'a> IntoIterator for &'a RegionSet {
    type Item = &'a Region;
    type IntoIter = std::slice::Iter<'a, Region>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.iter()
    }
}

impl RegionSet {
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn as_slice(&self) -> &[Region] {
        &self.regions
    }

    ///
    /// Both strands of a CpG share coordinates: keep the forward copy of each
    /// and mark it unoriented so that signal from both strands is used.
    ///
    pub fn forward_as_unoriented(self) -> RegionSet {
        let regions = self
            .regions
            .into_iter()
            .filter(|region| region.strand == Strand::Forward)
            .map(|region| Region {
                strand: Strand::Unoriented,
                ..region
            })
            .collect();

        RegionSet {
            regions,
            path: self.path,
        }
    }
}
