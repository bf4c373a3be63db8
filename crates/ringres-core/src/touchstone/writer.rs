//! Touchstone file writer
//!
//! Writes S-parameter data to Touchstone v1 files.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::parser::Touchstone;

impl fmt::Display for Touchstone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = Vec::new();
        self.write_to(&mut buf).map_err(|_| fmt::Error)?;
        f.write_str(&String::from_utf8_lossy(&buf))
    }
}

impl Touchstone {
    /// Write to a Touchstone file
    pub fn write<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()
    }

    /// Write to a writer
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for comment in &self.comments {
            writeln!(writer, "! {}", comment)?;
        }

        writeln!(
            writer,
            "# {} S {} R {}",
            self.frequency.unit().keyword(),
            self.format.keyword(),
            self.z0.first().copied().unwrap_or(crate::constants::DEFAULT_Z0)
        )?;

        // 2-port records use the v1 order S11, S21, S12, S22
        let order: Vec<(usize, usize)> = if self.nports == 2 {
            vec![(0, 0), (1, 0), (0, 1), (1, 1)]
        } else {
            (0..self.nports)
                .flat_map(|i| (0..self.nports).map(move |j| (i, j)))
                .collect()
        };

        for (freq, s_matrix) in self.frequency.f_scaled().iter().zip(&self.s) {
            write!(writer, "{:.9}", freq)?;
            for (k, &(i, j)) in order.iter().enumerate() {
                // Wrap every four pairs for files with more than two ports
                if self.nports > 2 && k > 0 && k % 4 == 0 {
                    writeln!(writer)?;
                }
                let (v1, v2) = self.format.from_complex(s_matrix[i][j]);
                write!(writer, " {:.9} {:.9}", v1, v2)?;
            }
            writeln!(writer)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::{Frequency, FrequencyUnit};
    use crate::touchstone::parser::SParamFormat;
    use approx::assert_relative_eq;
    use num_complex::Complex64;

    fn two_port(format: SParamFormat) -> Touchstone {
        let s = vec![vec![
            vec![Complex64::new(0.1, 0.0), Complex64::new(0.0, 0.2)],
            vec![Complex64::from_polar(0.5, 0.3), Complex64::new(-0.1, 0.05)],
        ]];
        Touchstone {
            nports: 2,
            frequency: Frequency::from_hz(vec![1.25e9], FrequencyUnit::GHz),
            s,
            z0: vec![50.0, 50.0],
            comments: vec!["synthetic".to_string()],
            format,
            is_v2: false,
        }
    }

    #[test]
    fn test_written_text_reads_back() {
        for format in [SParamFormat::RI, SParamFormat::MA, SParamFormat::DB] {
            let ts = two_port(format);
            let text = ts.to_string();
            assert!(text.starts_with("! synthetic\n# GHZ S"));

            let back = Touchstone::from_str(&text, 2).unwrap();
            assert_relative_eq!(back.frequency.f()[0], 1.25e9, epsilon = 1e-3);
            let s21 = back.s[0][1][0];
            assert_relative_eq!(s21.norm(), 0.5, epsilon = 1e-8);
            assert_relative_eq!(s21.arg(), 0.3, epsilon = 1e-8);
            assert_eq!(back.comments, vec!["synthetic".to_string()]);
        }
    }
}
