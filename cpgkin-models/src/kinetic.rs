use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use cpgkin_core::models::KineticSignal;
use cpgkin_core::traits::PartialAccumulator;

use crate::errors::{ModelError, Result};
use crate::histogram::{Binning, Histogram, Histogram2D};

/// How a model describes the signal of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    /// One histogram per window position.
    Raw,
    /// One joint histogram per pair of adjacent window positions.
    DiPosition,
    /// One joint histogram per pair of window positions, adjacent or not.
    PairWise,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Raw => "raw",
            ModelKind::DiPosition => "diposition",
            ModelKind::PairWise => "pairwise",
        }
    }
}

impl FromStr for ModelKind {
    type Err = ModelError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "raw" => Ok(ModelKind::Raw),
            "diposition" => Ok(ModelKind::DiPosition),
            "pairwise" => Ok(ModelKind::PairWise),
            _ => Err(ModelError::UnknownKind(s.to_string())),
        }
    }
}

impl Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Window size and histogram binning shared by every histogram of a model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelParams {
    pub size: usize,
    pub nbins: usize,
    pub xmin: f64,
    pub xmax: f64,
}

impl ModelParams {
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 || self.size % 2 == 0 {
            return Err(ModelError::InvalidParams(format!(
                "window size must be odd and positive, got {}",
                self.size
            )));
        }
        if self.nbins == 0 {
            return Err(ModelError::InvalidParams(
                "number of bins must be positive".to_string(),
            ));
        }
        if !(self.xmin.is_finite() && self.xmax.is_finite() && self.xmin < self.xmax) {
            return Err(ModelError::InvalidParams(format!(
                "histogram range must satisfy xmin < xmax, got [{}, {}]",
                self.xmin, self.xmax
            )));
        }
        Ok(())
    }

    pub fn binning(&self) -> Binning {
        Binning {
            nbins: self.nbins,
            xmin: self.xmin,
            xmax: self.xmax,
        }
    }
}

/// What the histogram values currently hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scale {
    Counts,
    Density,
    Log,
}

impl Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Scale::Counts => "counts",
            Scale::Density => "density",
            Scale::Log => "log density",
        };
        write!(f, "{}", name)
    }
}

/// Per-signal histograms of a model, IPD and PWD side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Tracks {
    Raw {
        ipd: Vec<Histogram>,
        pwd: Vec<Histogram>,
    },
    DiPosition {
        ipd: Vec<Histogram2D>,
        pwd: Vec<Histogram2D>,
    },
    /// Histograms follow [`position_pairs`] order.
    PairWise {
        ipd: Vec<Histogram2D>,
        pwd: Vec<Histogram2D>,
    },
}

impl Tracks {
    fn kind(&self) -> ModelKind {
        match self {
            Tracks::Raw { .. } => ModelKind::Raw,
            Tracks::DiPosition { .. } => ModelKind::DiPosition,
            Tracks::PairWise { .. } => ModelKind::PairWise,
        }
    }
}

/// Every pair `(i, j)` of positions of a window with `i < j`, ordered by `i`
/// then `j`.
pub fn position_pairs(size: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..size).flat_map(move |i| (i + 1..size).map(move |j| (i, j)))
}

/// Number of histograms per signal a model of `kind` holds for a window of
/// `size` positions.
fn histograms_per_signal(kind: ModelKind, size: usize) -> usize {
    match kind {
        ModelKind::Raw => size,
        ModelKind::DiPosition => size - 1,
        ModelKind::PairWise => size * (size - 1) / 2,
    }
}

///
/// A kinetic signal model: histograms of IPD and PWD values over a window of
/// fixed size.
///
/// A fresh model is on the counts scale and can ingest signals or merge
/// other models. Scoring a signal needs the log density scale, see
/// [`KineticModel::log`].
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KineticModel {
    params: ModelParams,
    pseudocount: f64,
    scale: Scale,
    ingested: u64,
    tracks: Tracks,
}

impl KineticModel {
    pub fn new(kind: ModelKind, params: ModelParams, pseudocount: f64) -> Result<Self> {
        params.validate()?;
        if !(pseudocount >= 0.0 && pseudocount.is_finite()) {
            return Err(ModelError::InvalidParams(format!(
                "pseudo-count must be a non-negative number, got {}",
                pseudocount
            )));
        }

        let binning = params.binning();
        let n = histograms_per_signal(kind, params.size);
        let tracks = match kind {
            ModelKind::Raw => Tracks::Raw {
                ipd: vec![Histogram::new(binning, pseudocount); n],
                pwd: vec![Histogram::new(binning, pseudocount); n],
            },
            ModelKind::DiPosition => Tracks::DiPosition {
                ipd: vec![Histogram2D::new(binning, pseudocount); n],
                pwd: vec![Histogram2D::new(binning, pseudocount); n],
            },
            ModelKind::PairWise => Tracks::PairWise {
                ipd: vec![Histogram2D::new(binning, pseudocount); n],
                pwd: vec![Histogram2D::new(binning, pseudocount); n],
            },
        };

        Ok(KineticModel {
            params,
            pseudocount,
            scale: Scale::Counts,
            ingested: 0,
            tracks,
        })
    }

    pub fn kind(&self) -> ModelKind {
        self.tracks.kind()
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    pub fn size(&self) -> usize {
        self.params.size
    }

    /// Pseudo-count carried by the model: the one it was created with, plus
    /// those of the models merged into it.
    pub fn pseudocount(&self) -> f64 {
        self.pseudocount
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    pub fn tracks(&self) -> &Tracks {
        &self.tracks
    }

    /// Same kind and parameters. The pseudo-count is not part of the
    /// configuration.
    pub fn same_configuration(&self, other: &KineticModel) -> bool {
        self.kind() == other.kind() && self.params == other.params
    }

    fn require_scale(&self, expected: Scale) -> Result<()> {
        if self.scale != expected {
            return Err(ModelError::WrongScale {
                expected,
                found: self.scale,
            });
        }
        Ok(())
    }

    fn require_window(&self, signal: &KineticSignal) -> Result<()> {
        if signal.len() != self.params.size || signal.pwd.len() != self.params.size {
            return Err(ModelError::WindowMismatch {
                expected: self.params.size,
                found: signal.len(),
            });
        }
        Ok(())
    }

    /// Count one signal window.
    pub fn add(&mut self, signal: &KineticSignal) -> Result<()> {
        self.require_scale(Scale::Counts)?;
        self.require_window(signal)?;

        match &mut self.tracks {
            Tracks::Raw { ipd, pwd } => {
                for (i, (h_ipd, h_pwd)) in ipd.iter_mut().zip(pwd.iter_mut()).enumerate() {
                    h_ipd.add(signal.ipd[i]);
                    h_pwd.add(signal.pwd[i]);
                }
            }
            Tracks::DiPosition { ipd, pwd } => {
                for (i, (h_ipd, h_pwd)) in ipd.iter_mut().zip(pwd.iter_mut()).enumerate() {
                    h_ipd.add(signal.ipd[i], signal.ipd[i + 1]);
                    h_pwd.add(signal.pwd[i], signal.pwd[i + 1]);
                }
            }
            Tracks::PairWise { ipd, pwd } => {
                let size = self.params.size;
                for ((i, j), (h_ipd, h_pwd)) in
                    position_pairs(size).zip(ipd.iter_mut().zip(pwd.iter_mut()))
                {
                    h_ipd.add(signal.ipd[i], signal.ipd[j]);
                    h_pwd.add(signal.pwd[i], signal.pwd[j]);
                }
            }
        }

        self.ingested += 1;
        Ok(())
    }

    /// Add the counts of `other` to this model.
    pub fn add_model(&mut self, other: &KineticModel) -> Result<()> {
        self.require_scale(Scale::Counts)?;
        other.require_scale(Scale::Counts)?;
        if !self.same_configuration(other) {
            return Err(ModelError::Incompatible(format!(
                "{} {:?} vs {} {:?}",
                self.kind(),
                self.params,
                other.kind(),
                other.params
            )));
        }

        match (&mut self.tracks, &other.tracks) {
            (Tracks::Raw { ipd, pwd }, Tracks::Raw { ipd: o_ipd, pwd: o_pwd }) => {
                ipd.iter_mut().zip(o_ipd).for_each(|(a, b)| a.merge(b));
                pwd.iter_mut().zip(o_pwd).for_each(|(a, b)| a.merge(b));
            }
            (
                Tracks::DiPosition { ipd, pwd },
                Tracks::DiPosition {
                    ipd: o_ipd,
                    pwd: o_pwd,
                },
            )
            | (
                Tracks::PairWise { ipd, pwd },
                Tracks::PairWise {
                    ipd: o_ipd,
                    pwd: o_pwd,
                },
            ) => {
                ipd.iter_mut().zip(o_ipd).for_each(|(a, b)| a.merge(b));
                pwd.iter_mut().zip(o_pwd).for_each(|(a, b)| a.merge(b));
            }
            _ => unreachable!("kinds were compared above"),
        }

        self.pseudocount += other.pseudocount;
        self.ingested += other.ingested;
        Ok(())
    }

    /// Turn counts into per-histogram frequencies.
    pub fn density(&mut self) -> Result<()> {
        match self.scale {
            Scale::Density => return Ok(()),
            Scale::Log => {
                return Err(ModelError::WrongScale {
                    expected: Scale::Counts,
                    found: Scale::Log,
                });
            }
            Scale::Counts => {}
        }

        match &mut self.tracks {
            Tracks::Raw { ipd, pwd } => ipd.iter_mut().chain(pwd).for_each(Histogram::normalize),
            Tracks::DiPosition { ipd, pwd } | Tracks::PairWise { ipd, pwd } => {
                ipd.iter_mut().chain(pwd).for_each(Histogram2D::normalize)
            }
        }
        self.scale = Scale::Density;
        Ok(())
    }

    /// Turn the model into log frequencies, the scale it scores signals on.
    pub fn log(&mut self) -> Result<()> {
        if self.scale == Scale::Log {
            return Ok(());
        }
        self.density()?;

        match &mut self.tracks {
            Tracks::Raw { ipd, pwd } => ipd.iter_mut().chain(pwd).for_each(Histogram::log),
            Tracks::DiPosition { ipd, pwd } | Tracks::PairWise { ipd, pwd } => {
                ipd.iter_mut().chain(pwd).for_each(Histogram2D::log)
            }
        }
        self.scale = Scale::Log;
        Ok(())
    }

    ///
    /// Log-likelihood of one signal window under this model: the sum of the
    /// log frequencies of the bins the window values fall in, IPD and PWD
    /// together. Can be `-inf` when a bin was never observed.
    ///
    pub fn log_likelihood(&self, signal: &KineticSignal) -> Result<f64> {
        self.require_scale(Scale::Log)?;
        self.require_window(signal)?;

        let ll: f64 = match &self.tracks {
            Tracks::Raw { ipd, pwd } => ipd
                .iter()
                .zip(pwd)
                .enumerate()
                .map(|(i, (h_ipd, h_pwd))| {
                    h_ipd.value_at(signal.ipd[i]) + h_pwd.value_at(signal.pwd[i])
                })
                .sum(),
            Tracks::DiPosition { ipd, pwd } => ipd
                .iter()
                .zip(pwd)
                .enumerate()
                .map(|(i, (h_ipd, h_pwd))| {
                    h_ipd.value_at(signal.ipd[i], signal.ipd[i + 1])
                        + h_pwd.value_at(signal.pwd[i], signal.pwd[i + 1])
                })
                .sum(),
            Tracks::PairWise { ipd, pwd } => position_pairs(self.params.size)
                .zip(ipd.iter().zip(pwd))
                .map(|((i, j), (h_ipd, h_pwd))| {
                    h_ipd.value_at(signal.ipd[i], signal.ipd[j])
                        + h_pwd.value_at(signal.pwd[i], signal.pwd[j])
                })
                .sum(),
        };

        Ok(ll)
    }

    /// Check that the histograms agree with the kind and the parameters.
    pub(crate) fn check_layout(&self) -> Result<()> {
        self.params
            .validate()
            .map_err(|err| ModelError::Corrupt(err.to_string()))?;

        let binning = self.params.binning();
        let expected = histograms_per_signal(self.kind(), self.params.size);
        let (found, consistent) = match &self.tracks {
            Tracks::Raw { ipd, pwd } => (
                (ipd.len(), pwd.len()),
                ipd.iter()
                    .chain(pwd)
                    .all(|h| h.is_consistent() && *h.binning() == binning),
            ),
            Tracks::DiPosition { ipd, pwd } | Tracks::PairWise { ipd, pwd } => (
                (ipd.len(), pwd.len()),
                ipd.iter()
                    .chain(pwd)
                    .all(|h| h.is_consistent() && *h.binning() == binning),
            ),
        };

        if found != (expected, expected) {
            return Err(ModelError::Corrupt(format!(
                "expected {} histograms per signal, found {} IPD and {} PWD",
                expected, found.0, found.1
            )));
        }
        if !consistent {
            return Err(ModelError::Corrupt(
                "histogram binning does not match the model parameters".to_string(),
            ));
        }
        Ok(())
    }
}

impl PartialAccumulator for KineticModel {
    type Error = ModelError;

    fn ingest(&mut self, signal: &KineticSignal) -> Result<()> {
        self.add(signal)
    }

    fn merge(&mut self, other: &Self) -> Result<()> {
        self.add_model(other)
    }

    fn ingested(&self) -> u64 {
        self.ingested
    }
}
