//! Single S-parameter traces

use ndarray::Array1;
use num_complex::Complex64;

use super::core::Network;

impl Network {
    /// Complex trace S[to, from] over frequency, `None` when a port is out of range
    pub fn trace(&self, to: usize, from: usize) -> Option<Array1<Complex64>> {
        let n = self.nports();
        (to < n && from < n).then(|| self.s.slice(ndarray::s![.., to, from]).to_owned())
    }

    /// |S[to, from]| in dB over frequency
    pub fn trace_db(&self, to: usize, from: usize) -> Option<Array1<f64>> {
        self.trace(to, from)
            .map(|t| t.mapv(|c| 20.0 * c.norm().log10()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::{Frequency, FrequencyUnit};
    use approx::assert_relative_eq;
    use ndarray::Array3;

    fn network() -> Network {
        let freq = Frequency::new(1.0, 2.0, 3, FrequencyUnit::GHz);
        let mut s = Array3::<Complex64>::zeros((3, 2, 2));
        for f in 0..3 {
            s[[f, 1, 0]] = Complex64::from_polar(0.1 * (f + 1) as f64, 0.5);
            s[[f, 0, 0]] = Complex64::new(0.5, 0.0);
        }
        Network::new(freq, s, Array1::from_elem(2, Complex64::new(50.0, 0.0)))
    }

    #[test]
    fn test_trace_db() {
        let ntwk = network();
        let s21 = ntwk.trace_db(1, 0).unwrap();
        assert_eq!(s21.len(), ntwk.nfreq());
        assert_relative_eq!(s21[0], -20.0, epsilon = 1e-12);
        assert_relative_eq!(s21[1], 20.0 * 0.2_f64.log10(), epsilon = 1e-12);
    }

    #[test]
    fn test_trace_out_of_range() {
        assert!(network().trace(2, 0).is_none());
    }

    #[test]
    fn test_trace_keeps_phase() {
        let s21 = network().trace(1, 0).unwrap();
        assert_relative_eq!(s21[2].arg(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(s21[2].norm(), 0.3, epsilon = 1e-12);
    }
}
