use log::trace;

use cpgkin_core::models::Region;
use cpgkin_core::traits::{Classifier, SignalExtractor};

use crate::errors::{ModelError, Result};
use crate::kinetic::KineticModel;

///
/// Scores a CpG with two kinetic models, one trained on methylated and one on
/// unmethylated data.
///
/// Every (read, strand) window the extractor can produce adds its
/// log-likelihood under each model to the log prior of that class. The
/// posterior of the methylated class is the logistic of the difference.
///
pub struct KineticClassifier<E> {
    extractor: E,
    methylated: KineticModel,
    unmethylated: KineticModel,
}

impl<E: SignalExtractor> KineticClassifier<E> {
    /// Both models are converted to the log density scale. They must share
    /// their configuration and match the extractor window size.
    pub fn new(
        extractor: E,
        mut methylated: KineticModel,
        mut unmethylated: KineticModel,
    ) -> Result<Self> {
        if !methylated.same_configuration(&unmethylated) {
            return Err(ModelError::Incompatible(format!(
                "methylated model is {} {:?}, unmethylated model is {} {:?}",
                methylated.kind(),
                methylated.params(),
                unmethylated.kind(),
                unmethylated.params()
            )));
        }
        if methylated.size() != extractor.window_size() {
            return Err(ModelError::WindowMismatch {
                expected: extractor.window_size(),
                found: methylated.size(),
            });
        }

        methylated.log()?;
        unmethylated.log()?;

        Ok(KineticClassifier {
            extractor,
            methylated,
            unmethylated,
        })
    }

    pub fn extractor(&self) -> &E {
        &self.extractor
    }
}

/// `P(meth | data)` from the two joint log probabilities.
fn posterior(log_meth: f64, log_unmeth: f64, prior: f64) -> f64 {
    match (log_meth == f64::NEG_INFINITY, log_unmeth == f64::NEG_INFINITY) {
        (true, true) => prior,
        (true, false) => 0.0,
        (false, true) => 1.0,
        (false, false) => 1.0 / (1.0 + (log_unmeth - log_meth).exp()),
    }
}

impl<E: SignalExtractor> Classifier for KineticClassifier<E> {
    type Read = E::Read;

    fn classify(
        &self,
        region: &Region,
        reads: &[Self::Read],
        prior_positive: f64,
        prior_negative: f64,
    ) -> f64 {
        let mut log_meth = prior_positive.ln();
        let mut log_unmeth = prior_negative.ln();
        let mut windows = 0usize;

        for read in reads {
            for view in region.oriented_views() {
                let signal = match self.extractor.extract(read, &view) {
                    Ok(signal) => signal,
                    Err(skip) => {
                        trace!("No signal for {}: {}", view, skip);
                        continue;
                    }
                };

                match (
                    self.methylated.log_likelihood(&signal),
                    self.unmethylated.log_likelihood(&signal),
                ) {
                    (Ok(meth), Ok(unmeth)) => {
                        log_meth += meth;
                        log_unmeth += unmeth;
                        windows += 1;
                    }
                    (Err(err), _) | (_, Err(err)) => {
                        trace!("Cannot score window over {}: {}", view, err);
                    }
                }
            }
        }

        if windows == 0 {
            return prior_positive;
        }

        posterior(log_meth, log_unmeth, prior_positive)
    }
}
