use std::fs::File;
use std::io::{self, BufWriter, Stdout, Write};
use std::path::Path;

use flate2::Compression;
use flate2::write::GzEncoder;

use cpgkin_core::models::Region;

///
/// Where text output goes: stdout, a plain file, or a gzip file when the path
/// ends with `.gz`.
///
pub enum TextOutput {
    Stdout(BufWriter<Stdout>),
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl TextOutput {
    ///
    /// Open the output
    ///
    /// # Arguments
    /// - path: the file to write to, stdout when `None`
    pub fn create<T: AsRef<Path>>(path: Option<T>) -> io::Result<Self> {
        let Some(path) = path else {
            return Ok(TextOutput::Stdout(BufWriter::new(io::stdout())));
        };
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = BufWriter::new(File::create(path)?);
        let gzipped = path.extension().is_some_and(|ext| ext == "gz");

        Ok(if gzipped {
            TextOutput::Gzip(GzEncoder::new(file, Compression::best()))
        } else {
            TextOutput::Plain(file)
        })
    }

    /// Flush everything, writing the gzip trailer if needed.
    pub fn finish(self) -> io::Result<()> {
        match self {
            TextOutput::Stdout(mut writer) => writer.flush(),
            TextOutput::Plain(mut writer) => writer.flush(),
            TextOutput::Gzip(encoder) => encoder.finish()?.flush(),
        }
    }
}

impl Write for TextOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            TextOutput::Stdout(writer) => writer.write(buf),
            TextOutput::Plain(writer) => writer.write(buf),
            TextOutput::Gzip(writer) => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            TextOutput::Stdout(writer) => writer.flush(),
            TextOutput::Plain(writer) => writer.flush(),
            TextOutput::Gzip(writer) => writer.flush(),
        }
    }
}

/// Significant digits of the probability column.
pub const PROBABILITY_DIGITS: usize = 4;

/// BED6 line of one methylation call: the probability sits in the score
/// column, with 4 significant digits.
pub fn prediction_line(region: &Region, probability: f64) -> String {
    format!(
        "{}\t{}\t{}\t.\t{}\t{}",
        region.chr,
        region.start,
        region.end,
        significant(probability, PROBABILITY_DIGITS),
        region.strand
    )
}

///
/// Shortest rendering of `value` with at most `digits` significant digits,
/// trailing zeros dropped. Magnitudes below 1e-4 or from 10^digits up switch
/// to scientific notation with a two digit exponent, e.g. `1.5e-05`.
///
fn significant(value: f64, digits: usize) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string().to_lowercase();
    }
    let digits = digits.max(1);

    // rounding may carry into the next power of ten, so read the exponent back
    let scientific = format!("{:.*e}", digits - 1, value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    if exponent < -4 || exponent >= digits as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

/// Writes methylation calls, one BED6 line each.
pub struct PredictionWriter<W: Write> {
    inner: W,
    written: usize,
}

impl<W: Write> PredictionWriter<W> {
    pub fn new(inner: W) -> Self {
        PredictionWriter { inner, written: 0 }
    }

    pub fn write_prediction(&mut self, region: &Region, probability: f64) -> io::Result<()> {
        writeln!(self.inner, "{}", prediction_line(region, probability))?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}
