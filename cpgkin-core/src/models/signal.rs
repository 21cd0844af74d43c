///
/// Kinetic signal of one read over one signal window: inter-pulse durations
/// and pulse widths, one value per window position, 5' to 3' on the window
/// strand.
///
#[derive(Debug, Clone, PartialEq)]
pub struct KineticSignal {
    pub ipd: Vec<f64>,
    pub pwd: Vec<f64>,
}

impl KineticSignal {
    pub fn new(ipd: Vec<f64>, pwd: Vec<f64>) -> Self {
        debug_assert_eq!(ipd.len(), pwd.len());
        KineticSignal { ipd, pwd }
    }

    /// Window length covered by the signal.
    pub fn len(&self) -> usize {
        self.ipd.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ipd.is_empty()
    }
}
