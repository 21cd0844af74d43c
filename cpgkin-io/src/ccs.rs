use std::io;

use noodles::bam;
use noodles::sam::alignment::record::cigar::op::Kind;
use noodles::sam::alignment::record::data::field::Value;
use noodles::sam::alignment::record::data::field::value::Array;

use cpgkin_core::ExtractionSkip;

use crate::codec::decode_v1;

/// Alignment operation, reduced to what the extractor needs to know.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CigarOp {
    /// `M`, `=` or `X`: consumes reference and query.
    Match(u32),
    Insertion(u32),
    /// `D` or `N`: consumes reference only.
    Deletion(u32),
    SoftClip(u32),
    /// `H` or `P`: consumes nothing.
    Clip(u32),
}

/// The four per-base kinetic arrays of a CCS read, in frames, indexed along
/// the stored read sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Kinetics {
    pub fi: Option<Vec<f64>>,
    pub fp: Option<Vec<f64>>,
    pub ri: Option<Vec<f64>>,
    pub rp: Option<Vec<f64>>,
    /// Set when a kinetic tag is present but cannot be decoded.
    pub malformed: Option<String>,
}

impl Kinetics {
    fn from_record(record: &bam::Record) -> Self {
        let data = record.data();
        let decode = |tag: [u8; 2]| decode_kinetic_tag(tag, data.get(&tag));

        match (decode(*b"fi"), decode(*b"fp"), decode(*b"ri"), decode(*b"rp")) {
            (Ok(fi), Ok(fp), Ok(ri), Ok(rp)) => Kinetics {
                fi,
                fp,
                ri,
                rp,
                malformed: None,
            },
            (Err(reason), ..) | (_, Err(reason), ..) | (.., Err(reason), _) | (.., Err(reason)) => {
                Kinetics {
                    malformed: Some(reason),
                    ..Default::default()
                }
            }
        }
    }
}

///
/// An aligned PacBio CCS read: where it maps, how, and its kinetics.
///
/// Decoupled from the BAM record so that it can be moved between threads and
/// built by hand in tests.
///
#[derive(Debug, Clone, PartialEq)]
pub struct CcsRead {
    /// 0-based reference position of the first aligned base.
    pub reference_start: Option<u32>,
    pub reverse: bool,
    pub mapped: bool,
    pub primary: bool,
    pub cigar: Vec<CigarOp>,
    /// Length of the stored sequence.
    pub length: usize,
    pub kinetics: Kinetics,
}

/// A gapless stretch of alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Block {
    reference_start: u32,
    query_start: usize,
    len: u32,
}

impl CcsRead {
    pub fn from_record(record: &bam::Record) -> io::Result<Self> {
        let flags = record.flags();

        let reference_start = match record.alignment_start().transpose()? {
            Some(position) => Some((usize::from(position) - 1) as u32),
            None => None,
        };

        let mut cigar = Vec::new();
        for op in record.cigar().iter() {
            let op = op?;
            let len = op.len() as u32;
            cigar.push(match op.kind() {
                Kind::Match | Kind::SequenceMatch | Kind::SequenceMismatch => CigarOp::Match(len),
                Kind::Insertion => CigarOp::Insertion(len),
                Kind::Deletion | Kind::Skip => CigarOp::Deletion(len),
                Kind::SoftClip => CigarOp::SoftClip(len),
                Kind::HardClip | Kind::Pad => CigarOp::Clip(len),
            });
        }

        Ok(CcsRead {
            reference_start,
            reverse: flags.is_reverse_complemented(),
            mapped: !flags.is_unmapped(),
            primary: !(flags.is_secondary() || flags.is_supplementary()),
            cigar,
            length: record.sequence().len(),
            kinetics: Kinetics::from_record(record),
        })
    }

    pub fn is_primary_mapped(&self) -> bool {
        self.mapped && self.primary && self.reference_start.is_some()
    }

    fn blocks(&self) -> Vec<Block> {
        let mut blocks: Vec<Block> = Vec::new();
        let Some(mut reference) = self.reference_start else {
            return blocks;
        };
        let mut query = 0usize;
        // consecutive match operations form one block
        let mut extend = false;

        for op in &self.cigar {
            match *op {
                CigarOp::Match(len) => {
                    match blocks.last_mut() {
                        Some(last) if extend => last.len += len,
                        _ => blocks.push(Block {
                            reference_start: reference,
                            query_start: query,
                            len,
                        }),
                    }
                    reference += len;
                    query += len as usize;
                    extend = true;
                }
                CigarOp::Insertion(len) | CigarOp::SoftClip(len) => {
                    query += len as usize;
                    extend = false;
                }
                CigarOp::Deletion(len) => {
                    reference += len;
                    extend = false;
                }
                CigarOp::Clip(_) => {}
            }
        }

        blocks
    }

    /// Reference span `[start, end)` covered by the alignment.
    pub fn reference_span(&self) -> Option<(u32, u32)> {
        let blocks = self.blocks();
        let first = blocks.first()?;
        let last = blocks.last()?;
        Some((first.reference_start, last.reference_start + last.len))
    }

    ///
    /// Query position aligned to reference position `start`, provided the
    /// whole reference interval `[start, end)` is aligned without any gap or
    /// insertion.
    ///
    pub fn query_offset(&self, start: u32, end: u32) -> Result<usize, ExtractionSkip> {
        let (span_start, span_end) = self.reference_span().ok_or(ExtractionSkip::Unmapped)?;
        if start < span_start || end > span_end {
            return Err(ExtractionSkip::NotSpanning);
        }

        self.blocks()
            .into_iter()
            .find(|block| {
                block.reference_start <= start && end <= block.reference_start + block.len
            })
            .map(|block| block.query_start + (start - block.reference_start) as usize)
            .ok_or(ExtractionSkip::Gapped)
    }
}

/// Kinetic array stored under `tag`, decoded to frames. A tag that is
/// present but unreadable gives the reason it was rejected.
fn decode_kinetic_tag(
    tag: [u8; 2],
    value: Option<io::Result<Value<'_>>>,
) -> Result<Option<Vec<f64>>, String> {
    let name = String::from_utf8_lossy(&tag);
    let decoded = match value {
        None => return Ok(None),
        Some(Err(err)) => Err(err),
        Some(Ok(Value::Array(Array::UInt8(values)))) => values
            .iter()
            .map(|code| code.map(|c| f64::from(decode_v1(c))))
            .collect::<io::Result<Vec<_>>>(),
        Some(Ok(Value::Array(Array::UInt16(values)))) => values
            .iter()
            .map(|frames| frames.map(f64::from))
            .collect::<io::Result<Vec<_>>>(),
        Some(Ok(_)) => {
            return Err(format!("{} tag is not an array of unsigned integers", name));
        }
    };

    decoded
        .map(Some)
        .map_err(|err| format!("{} tag could not be read: {}", name, err))
}

#[cfg(test)]
mod tests {
    use super::*;

    use noodles::sam::alignment::record_buf::data::field::Value as ValueBuf;
    use noodles::sam::alignment::record_buf::data::field::value::Array as ArrayBuf;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn read(start: u32, cigar: Vec<CigarOp>) -> CcsRead {
        CcsRead {
            reference_start: Some(start),
            reverse: false,
            mapped: true,
            primary: true,
            cigar,
            length: 0,
            kinetics: Kinetics::default(),
        }
    }

    #[rstest]
    fn test_span_and_offsets() {
        // 2 soft clipped, 10 aligned, 3 deleted, 5 aligned
        let read = read(
            100,
            vec![
                CigarOp::SoftClip(2),
                CigarOp::Match(10),
                CigarOp::Deletion(3),
                CigarOp::Match(5),
            ],
        );

        assert_eq!(read.reference_span(), Some((100, 118)));
        assert_eq!(read.query_offset(100, 105), Ok(2));
        assert_eq!(read.query_offset(105, 110), Ok(7));
        assert_eq!(read.query_offset(113, 118), Ok(12));
    }

    #[rstest]
    #[case(108, 115, ExtractionSkip::Gapped)]
    #[case(95, 102, ExtractionSkip::NotSpanning)]
    #[case(115, 120, ExtractionSkip::NotSpanning)]
    fn test_unusable_windows(#[case] start: u32, #[case] end: u32, #[case] skip: ExtractionSkip) {
        let read = read(
            100,
            vec![CigarOp::Match(10), CigarOp::Deletion(3), CigarOp::Match(5)],
        );
        assert_eq!(read.query_offset(start, end), Err(skip));
    }

    #[rstest]
    fn test_insertion_breaks_the_block() {
        let read = read(
            0,
            vec![CigarOp::Match(5), CigarOp::Insertion(1), CigarOp::Match(5)],
        );
        assert_eq!(read.query_offset(2, 5), Ok(2));
        assert_eq!(read.query_offset(5, 8), Ok(6));
        assert_eq!(read.query_offset(3, 7), Err(ExtractionSkip::Gapped));
    }

    #[rstest]
    fn test_adjacent_matches_join() {
        let read = read(10, vec![CigarOp::Match(3), CigarOp::Match(4)]);
        assert_eq!(read.query_offset(11, 16), Ok(1));
    }

    #[rstest]
    fn test_unmapped_read() {
        let mut read = read(0, vec![]);
        read.reference_start = None;
        assert!(!read.is_primary_mapped());
        assert_eq!(read.query_offset(0, 1), Err(ExtractionSkip::Unmapped));
    }

    #[rstest]
    fn test_kinetic_tag_decoding() {
        let codes = ValueBuf::Array(ArrayBuf::UInt8(vec![0, 64, 65]));
        assert_eq!(
            decode_kinetic_tag(*b"fi", Some(Ok(Value::from(&codes)))),
            Ok(Some(vec![0.0, 64.0, 66.0]))
        );

        let frames = ValueBuf::Array(ArrayBuf::UInt16(vec![3, 1000]));
        assert_eq!(
            decode_kinetic_tag(*b"rp", Some(Ok(Value::from(&frames)))),
            Ok(Some(vec![3.0, 1000.0]))
        );

        assert_eq!(decode_kinetic_tag(*b"ri", None), Ok(None));
    }

    #[rstest]
    #[case(ValueBuf::Array(ArrayBuf::Int8(vec![1, -2, 3])))]
    #[case(ValueBuf::Array(ArrayBuf::Float(vec![1.5])))]
    #[case(ValueBuf::UInt8(7))]
    fn test_wrongly_typed_kinetic_tag_is_rejected(#[case] value: ValueBuf) {
        let decoded = decode_kinetic_tag(*b"fi", Some(Ok(Value::from(&value))));
        assert_eq!(
            decoded,
            Err("fi tag is not an array of unsigned integers".to_string())
        );
    }

    #[rstest]
    fn test_unreadable_kinetic_tag_is_rejected() {
        let err = io::Error::new(io::ErrorKind::UnexpectedEof, "truncated");
        let decoded = decode_kinetic_tag(*b"fp", Some(Err(err)));
        assert!(matches!(decoded, Err(reason) if reason.starts_with("fp tag could not be read")));
    }
}
