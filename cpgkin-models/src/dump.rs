use std::io::{self, Write};

use cpgkin_core::traits::PartialAccumulator;

use crate::histogram::Histogram2D;
use crate::kinetic::{KineticModel, Tracks, position_pairs};

///
/// Write a model as tab separated text, one row per histogram bin.
///
/// Raw models give `signal position bin lower upper value`. Di-position
/// models give `signal position bin bin2 lower upper lower2 upper2 value`,
/// where `position` is the first position of the pair. Pairwise models name
/// both positions: `signal position position2 bin bin2 ...`.
///
pub fn write_tsv<W: Write>(model: &KineticModel, mut writer: W) -> io::Result<()> {
    writeln!(
        writer,
        "# {} model, size {}, {} bins over [{}, {}), pseudo-count {}, scale {}, {} signals",
        model.kind(),
        model.size(),
        model.params().nbins,
        model.params().xmin,
        model.params().xmax,
        model.pseudocount(),
        model.scale(),
        model.ingested()
    )?;

    match model.tracks() {
        Tracks::Raw { ipd, pwd } => {
            writeln!(writer, "signal\tposition\tbin\tlower\tupper\tvalue")?;
            for (signal, histograms) in [("ipd", ipd), ("pwd", pwd)] {
                for (position, histogram) in histograms.iter().enumerate() {
                    let binning = histogram.binning();
                    for (bin, value) in histogram.values().iter().enumerate() {
                        let (lower, upper) = binning.bounds(bin);
                        writeln!(
                            writer,
                            "{}\t{}\t{}\t{}\t{}\t{}",
                            signal, position, bin, lower, upper, value
                        )?;
                    }
                }
            }
        }
        Tracks::DiPosition { ipd, pwd } => {
            writeln!(
                writer,
                "signal\tposition\tbin\tbin2\tlower\tupper\tlower2\tupper2\tvalue"
            )?;
            for (signal, histograms) in [("ipd", ipd), ("pwd", pwd)] {
                for (position, histogram) in histograms.iter().enumerate() {
                    write_joint(&mut writer, &format!("{}\t{}", signal, position), histogram)?;
                }
            }
        }
        Tracks::PairWise { ipd, pwd } => {
            writeln!(
                writer,
                "signal\tposition\tposition2\tbin\tbin2\tlower\tupper\tlower2\tupper2\tvalue"
            )?;
            for (signal, histograms) in [("ipd", ipd), ("pwd", pwd)] {
                for ((i, j), histogram) in position_pairs(model.size()).zip(histograms) {
                    write_joint(&mut writer, &format!("{}\t{}\t{}", signal, i, j), histogram)?;
                }
            }
        }
    }

    writer.flush()
}

// `key` holds the leading columns, already tab separated
fn write_joint<W: Write>(writer: &mut W, key: &str, histogram: &Histogram2D) -> io::Result<()> {
    let binning = histogram.binning();
    for i in 0..binning.nbins {
        let (lower, upper) = binning.bounds(i);
        for j in 0..binning.nbins {
            let (lower2, upper2) = binning.bounds(j);
            writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                key,
                i,
                j,
                lower,
                upper,
                lower2,
                upper2,
                histogram.get(i, j)
            )?;
        }
    }
    Ok(())
}
