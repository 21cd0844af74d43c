use cpgkin_core::ExtractionSkip;
use cpgkin_core::models::{KineticSignal, Region, Strand};
use cpgkin_core::traits::SignalExtractor;

use crate::ccs::CcsRead;
use crate::error::BamError;

///
/// Extracts the IPD and pulse width window of a CCS read around the C of a
/// CpG, on the strand the region is oriented on.
///
/// A CCS read carries kinetics for both strands of the molecule: `fi`/`fp`
/// for the strand the read was sequenced from, `ri`/`rp` for the other one,
/// each indexed in its own 5' to 3' direction. Windows on the reverse
/// strand are returned 5' to 3' on that strand, so from the highest
/// reference position down.
///
#[derive(Debug, Clone, Copy)]
pub struct CcsKineticExtractor {
    size: u32,
}

impl CcsKineticExtractor {
    pub fn new(size: usize) -> Result<Self, BamError> {
        if size == 0 || size % 2 == 0 || size > u32::MAX as usize {
            return Err(BamError::InvalidWindow(size));
        }
        Ok(CcsKineticExtractor { size: size as u32 })
    }
}

impl SignalExtractor for CcsKineticExtractor {
    type Read = CcsRead;

    fn window_size(&self) -> usize {
        self.size as usize
    }

    fn extract(&self, read: &CcsRead, region: &Region) -> Result<KineticSignal, ExtractionSkip> {
        if region.strand == Strand::Unoriented {
            return Err(ExtractionSkip::Unoriented);
        }
        let window = region
            .signal_window(self.size)
            .ok_or(ExtractionSkip::WindowOutOfBounds)?;

        if !read.is_primary_mapped() {
            return Err(ExtractionSkip::Unmapped);
        }
        if let Some(reason) = &read.kinetics.malformed {
            return Err(ExtractionSkip::Malformed(reason.clone()));
        }
        let offset = read.query_offset(window.start, window.end)?;

        // which array holds the strand, and whether it runs against the read
        let kinetics = &read.kinetics;
        let (ipd, pwd, names, flipped) = match (read.reverse, window.strand) {
            (false, Strand::Forward) => (&kinetics.fi, &kinetics.fp, ("fi", "fp"), false),
            (false, _) => (&kinetics.ri, &kinetics.rp, ("ri", "rp"), true),
            (true, Strand::Forward) => (&kinetics.ri, &kinetics.rp, ("ri", "rp"), false),
            (true, _) => (&kinetics.fi, &kinetics.fp, ("fi", "fp"), true),
        };
        let ipd = ipd
            .as_deref()
            .ok_or(ExtractionSkip::MissingKinetics(names.0))?;
        let pwd = pwd
            .as_deref()
            .ok_or(ExtractionSkip::MissingKinetics(names.1))?;

        let length = read.length;
        if ipd.len() != length || pwd.len() != length {
            return Err(ExtractionSkip::Malformed(format!(
                "kinetic arrays of length {}/{} for a read of length {}",
                ipd.len(),
                pwd.len(),
                length
            )));
        }

        let size = self.size as usize;
        let index = |k: usize| {
            let query = offset + k;
            if flipped { length - 1 - query } else { query }
        };

        let positions: Box<dyn Iterator<Item = usize>> = match window.strand {
            Strand::Reverse => Box::new((0..size).rev()),
            _ => Box::new(0..size),
        };

        let (ipd, pwd): (Vec<f64>, Vec<f64>) = positions
            .map(|k| {
                let i = index(k);
                (ipd[i], pwd[i])
            })
            .unzip();

        Ok(KineticSignal::new(ipd, pwd))
    }
}
