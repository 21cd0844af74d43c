use std::fmt::{self, Display};
use std::str::FromStr;

use crate::errors::RegionSetError;

/// Strand a region (or a signal window) refers to.
#[derive(Eq, PartialEq, Hash, Debug, Clone, Copy)]
pub enum Strand {
    Forward,
    Reverse,
    Unoriented,
}

impl Strand {
    pub fn as_char(&self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
            Strand::Unoriented => '.',
        }
    }
}

impl FromStr for Strand {
    type Err = RegionSetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            "." | "*" => Ok(Strand::Unoriented),
            other => Err(RegionSetError::InvalidStrand(other.to_string())),
        }
    }
}

impl Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

///
/// Region struct, one CpG (or any interval of interest) with its strand.
/// Coordinates are 0-based, half-open.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone)]
pub struct Region {
    pub chr: String,
    pub start: u32,
    pub end: u32,
    pub strand: Strand,
}

impl Region {
    pub fn new(chr: impl Into<String>, start: u32, end: u32, strand: Strand) -> Self {
        Region {
            chr: chr.into(),
            start,
            end,
            strand,
        }
    }

    ///
    /// Get length of the region
    ///
    pub fn width(&self) -> u32 {
        self.end - self.start
    }

    ///
    /// Get file string of Region (BED6 with an empty name and score)
    ///
    pub fn as_string(&self) -> String {
        format!(
            "{}\t{}\t{}\t.\t0\t{}",
            self.chr, self.start, self.end, self.strand
        )
    }

    /// Same coordinates, another strand.
    pub fn with_strand(&self, strand: Strand) -> Region {
        Region {
            strand,
            ..self.clone()
        }
    }

    /// The oriented views signal is extracted from: the region itself when it
    /// has a strand, both strands when it has none.
    pub fn oriented_views(&self) -> Vec<Region> {
        match self.strand {
            Strand::Unoriented => vec![
                self.with_strand(Strand::Forward),
                self.with_strand(Strand::Reverse),
            ],
            _ => vec![self.clone()],
        }
    }

    ///
    /// Signal window of `size` bases centred on the C of the CpG.
    ///
    /// On the forward strand the C sits at `start`, on the reverse strand at
    /// `end - 1`. Returns `None` for unoriented regions and for windows that
    /// would start before the first reference base.
    ///
    pub fn signal_window(&self, size: u32) -> Option<Region> {
        let half = size / 2;
        let center = match self.strand {
            Strand::Forward => self.start,
            Strand::Reverse => self.end.checked_sub(1)?,
            Strand::Unoriented => return None,
        };
        let start = center.checked_sub(half)?;

        Some(Region {
            chr: self.chr.clone(),
            start,
            end: start + size,
            strand: self.strand,
        })
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}({})", self.chr, self.start, self.end, self.strand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case("+", Strand::Forward)]
    #[case("-", Strand::Reverse)]
    #[case(".", Strand::Unoriented)]
    #[case("*", Strand::Unoriented)]
    fn test_parse_strand(#[case] symbol: &str, #[case] expected: Strand) {
        assert_eq!(symbol.parse::<Strand>().unwrap(), expected);
    }

    #[rstest]
    fn test_parse_bad_strand() {
        assert!("x".parse::<Strand>().is_err());
    }

    #[rstest]
    fn test_forward_window_is_centred_on_start() {
        // CpG at [100, 102), C on the forward strand is base 100
        let cpg = Region::new("chr1", 100, 102, Strand::Forward);
        let window = cpg.signal_window(7).unwrap();

        assert_eq!(window.start, 97);
        assert_eq!(window.end, 104);
        assert_eq!(window.width(), 7);
        assert_eq!(window.strand, Strand::Forward);
    }

    #[rstest]
    fn test_reverse_window_is_centred_on_end() {
        // C on the reverse strand is base 101
        let cpg = Region::new("chr1", 100, 102, Strand::Reverse);
        let window = cpg.signal_window(7).unwrap();

        assert_eq!(window.start, 98);
        assert_eq!(window.end, 105);
    }

    #[rstest]
    fn test_window_before_reference_start() {
        let cpg = Region::new("chr1", 1, 3, Strand::Forward);
        assert_eq!(cpg.signal_window(7), None);
    }

    #[rstest]
    fn test_unoriented_has_no_window_but_two_views() {
        let cpg = Region::new("chr1", 100, 102, Strand::Unoriented);
        assert_eq!(cpg.signal_window(7), None);

        let views = cpg.oriented_views();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].strand, Strand::Forward);
        assert_eq!(views[1].strand, Strand::Reverse);
    }

    #[rstest]
    fn test_as_string_is_bed6() {
        let cpg = Region::new("chr2", 10, 12, Strand::Reverse);
        assert_eq!(cpg.as_string(), "chr2\t10\t12\t.\t0\t-");
    }
}
