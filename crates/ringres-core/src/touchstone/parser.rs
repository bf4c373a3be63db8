//! Touchstone file parser
//!
//! Implements parsing of Touchstone v1 (`.sNp`) and v2 (`.ts`) files.

use num_complex::Complex64;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::constants::DEFAULT_Z0;
use crate::error::DataFormatError;
use crate::frequency::{Frequency, FrequencyUnit};

/// Network parameter data format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SParamFormat {
    RI, // Real-Imaginary
    #[default]
    MA, // Magnitude-Angle (degrees)
    DB, // dB-Angle (degrees)
}

impl SParamFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "RI" => Some(SParamFormat::RI),
            "MA" => Some(SParamFormat::MA),
            "DB" => Some(SParamFormat::DB),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            SParamFormat::RI => "RI",
            SParamFormat::MA => "MA",
            SParamFormat::DB => "DB",
        }
    }

    /// Convert a pair of file columns to a complex value
    pub fn to_complex(&self, v1: f64, v2: f64) -> Complex64 {
        match self {
            SParamFormat::RI => Complex64::new(v1, v2),
            SParamFormat::MA => Complex64::from_polar(v1, v2.to_radians()),
            SParamFormat::DB => Complex64::from_polar(10.0_f64.powf(v1 / 20.0), v2.to_radians()),
        }
    }

    /// Convert a complex value to a pair of file columns
    pub fn from_complex(&self, c: Complex64) -> (f64, f64) {
        match self {
            SParamFormat::RI => (c.re, c.im),
            SParamFormat::MA => (c.norm(), c.arg().to_degrees()),
            SParamFormat::DB => (20.0 * c.norm().log10(), c.arg().to_degrees()),
        }
    }
}

/// Network parameter type declared on the option line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParameterType {
    #[default]
    S,
    Y,
    Z,
    G,
    H,
}

impl ParameterType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "S" => Some(ParameterType::S),
            "Y" => Some(ParameterType::Y),
            "Z" => Some(ParameterType::Z),
            "G" => Some(ParameterType::G),
            "H" => Some(ParameterType::H),
            _ => None,
        }
    }
}

/// Touchstone file contents
#[derive(Debug, Clone)]
pub struct Touchstone {
    /// Number of ports
    pub nports: usize,
    /// Frequency data
    pub frequency: Frequency,
    /// S-parameter matrices: [nfreq][nports][nports]
    pub s: Vec<Vec<Vec<Complex64>>>,
    /// Reference impedance (per port)
    pub z0: Vec<f64>,
    /// Comments from the file
    pub comments: Vec<String>,
    /// Data format found in (or used for) the file
    pub format: SParamFormat,
    /// Is this a Version 2.0 file?
    pub is_v2: bool,
}

impl Touchstone {
    /// Parse a Touchstone file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DataFormatError> {
        let path = path.as_ref();

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or(DataFormatError::InvalidExtension)?;

        let nports = Self::parse_extension(ext)?;

        let file = File::open(path)?;
        Self::parse(BufReader::new(file), nports)
    }

    /// Number of ports from an `sNp` extension; `ts` defers to the file
    fn parse_extension(ext: &str) -> Result<usize, DataFormatError> {
        let ext_lower = ext.to_lowercase();
        if ext_lower == "ts" {
            return Ok(0);
        }
        if ext_lower.len() > 2 && ext_lower.starts_with('s') && ext_lower.ends_with('p') {
            return ext_lower[1..ext_lower.len() - 1]
                .parse::<usize>()
                .ok()
                .filter(|&n| n > 0)
                .ok_or(DataFormatError::InvalidExtension);
        }
        Err(DataFormatError::InvalidExtension)
    }

    /// Parse from string content
    ///
    /// # Arguments
    /// * `content` - Touchstone file content as string
    /// * `nports` - Number of ports (0 when the content declares `[Number of Ports]`)
    ///
    /// # Example
    /// ```
    /// use ringres_core::touchstone::Touchstone;
    /// let content = "# GHz S RI R 50\n1.0 0.1 0.0 0.9 0.0 0.9 0.0 0.1 0.0";
    /// let ts = Touchstone::from_str(content, 2).unwrap();
    /// assert_eq!(ts.nfreq(), 1);
    /// ```
    pub fn from_str(content: &str, nports: usize) -> Result<Self, DataFormatError> {
        Self::parse(std::io::Cursor::new(content), nports)
    }

    fn parse<R: BufRead>(reader: R, nports_hint: usize) -> Result<Self, DataFormatError> {
        let mut state = ParserState::new(nports_hint);

        for (idx, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            state.line_no = idx + 1;
            let trimmed = line.trim();

            if trimmed.is_empty() {
                continue;
            }

            if let Some(comment) = trimmed.strip_prefix('!') {
                state.comments.push(comment.trim().to_string());
                continue;
            }

            if trimmed.starts_with('[') {
                state.parse_keyword(trimmed)?;
                continue;
            }

            if trimmed.starts_with('#') {
                if !state.option_parsed {
                    state.parse_option_line(trimmed)?;
                }
                continue;
            }

            if state.expecting_reference {
                state.push_reference(trimmed);
                continue;
            }

            if state.is_data_section() && !state.data_ended {
                state.parse_data_line(trimmed)?;
            }
        }

        state.finalize()
    }

    /// Parse the option line (`# GHz S MA R 50`)
    pub fn parse_option_line(
        line: &str,
    ) -> Result<(FrequencyUnit, SParamFormat, f64, ParameterType), DataFormatError> {
        let body = line
            .strip_prefix('#')
            .ok_or_else(|| DataFormatError::InvalidOption(line.to_string()))?;
        let parts: Vec<&str> = body.split_whitespace().collect();

        let mut freq_unit = FrequencyUnit::GHz;
        let mut format = SParamFormat::MA;
        let mut z0 = DEFAULT_Z0;
        let mut param_type = ParameterType::S;

        let mut i = 0;
        while i < parts.len() {
            let part = parts[i];

            if let Some(unit) = FrequencyUnit::from_str(part) {
                freq_unit = unit;
            } else if let Some(fmt) = SParamFormat::from_str(part) {
                format = fmt;
            } else if let Some(pt) = ParameterType::from_str(part) {
                param_type = pt;
            } else if part.eq_ignore_ascii_case("R") {
                let value = parts
                    .get(i + 1)
                    .and_then(|v| v.parse::<f64>().ok())
                    .ok_or_else(|| DataFormatError::InvalidOption(line.to_string()))?;
                z0 = value;
                i += 1;
            } else {
                return Err(DataFormatError::InvalidOption(line.to_string()));
            }

            i += 1;
        }

        Ok((freq_unit, format, z0, param_type))
    }

    /// Get the number of frequency points
    pub fn nfreq(&self) -> usize {
        self.s.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum MatrixFormat {
    #[default]
    Full,
    Lower,
    Upper,
}

struct ParserState {
    line_no: usize,
    nports: usize,
    freq_unit: FrequencyUnit,
    format: SParamFormat,
    matrix_format: MatrixFormat,
    z0: Vec<f64>,
    comments: Vec<String>,
    option_parsed: bool,

    frequencies: Vec<f64>,
    s_data: Vec<Vec<Vec<Complex64>>>,
    pending: Vec<f64>,
    pending_since: usize,

    is_v2: bool,
    data_section_started: bool,
    two_port_order_21_12: bool,
    expecting_reference: bool,
    data_ended: bool,
}

impl ParserState {
    fn new(nports_hint: usize) -> Self {
        Self {
            line_no: 0,
            nports: nports_hint,
            freq_unit: FrequencyUnit::GHz,
            format: SParamFormat::MA,
            matrix_format: MatrixFormat::Full,
            z0: Vec::new(),
            comments: Vec::new(),
            option_parsed: false,
            frequencies: Vec::new(),
            s_data: Vec::new(),
            pending: Vec::new(),
            pending_since: 0,
            is_v2: false,
            data_section_started: false,
            two_port_order_21_12: true,
            expecting_reference: false,
            data_ended: false,
        }
    }

    fn error(&self, message: impl Into<String>) -> DataFormatError {
        DataFormatError::Parse {
            line: self.line_no,
            message: message.into(),
        }
    }

    fn parse_keyword(&mut self, line: &str) -> Result<(), DataFormatError> {
        let line_lower = line.to_lowercase();
        let argument = line.split_once(']').map(|(_, rest)| rest.trim()).unwrap_or("");

        if line_lower.starts_with("[version]") {
            self.is_v2 = argument != "1.0";
        } else if line_lower.starts_with("[number of ports]") {
            self.nports = argument
                .parse()
                .map_err(|_| self.error(format!("invalid port count '{}'", argument)))?;
        } else if line_lower.starts_with("[two-port data order]") {
            if argument.contains("21_12") {
                self.two_port_order_21_12 = true;
            } else if argument.contains("12_21") {
                self.two_port_order_21_12 = false;
            } else {
                return Err(self.error(format!("invalid two-port data order '{}'", argument)));
            }
        } else if line_lower.starts_with("[reference]") {
            self.z0 = argument
                .split_whitespace()
                .filter_map(|v| v.parse::<f64>().ok())
                .collect();
            self.expecting_reference = self.z0.len() < self.nports;
        } else if line_lower.starts_with("[matrix format]") {
            let arg = argument.to_lowercase();
            self.matrix_format = if arg.contains("lower") {
                MatrixFormat::Lower
            } else if arg.contains("upper") {
                MatrixFormat::Upper
            } else {
                MatrixFormat::Full
            };
        } else if line_lower.starts_with("[network data]") {
            self.data_section_started = true;
        } else if line_lower.starts_with("[noise data]") || line_lower.starts_with("[end]") {
            self.data_section_started = false;
            self.data_ended = true;
        }
        Ok(())
    }

    fn push_reference(&mut self, line: &str) {
        self.z0
            .extend(line.split_whitespace().filter_map(|v| v.parse::<f64>().ok()));
        if self.z0.len() >= self.nports {
            self.expecting_reference = false;
        }
    }

    fn parse_option_line(&mut self, line: &str) -> Result<(), DataFormatError> {
        let (unit, format, z0, param_type) = Touchstone::parse_option_line(line)?;
        if param_type != ParameterType::S {
            return Err(DataFormatError::UnsupportedParameter(format!("{:?}", param_type)));
        }
        self.freq_unit = unit;
        self.format = format;
        if self.z0.is_empty() {
            self.z0 = vec![z0];
        }
        self.option_parsed = true;
        Ok(())
    }

    fn is_data_section(&self) -> bool {
        // V1: everything after the header that is not a comment is data.
        // V2: only lines after [Network Data].
        !self.is_v2 || self.data_section_started
    }

    fn values_per_record(&self) -> usize {
        let n_values = match self.matrix_format {
            MatrixFormat::Full => self.nports * self.nports,
            MatrixFormat::Lower | MatrixFormat::Upper => self.nports * (self.nports + 1) / 2,
        };
        1 + n_values * 2
    }

    fn parse_data_line(&mut self, line: &str) -> Result<(), DataFormatError> {
        if self.nports == 0 {
            return Err(self.error("data before the number of ports is known"));
        }

        let clean_line = line.split('!').next().unwrap_or("");
        if self.pending.is_empty() {
            self.pending_since = self.line_no;
        }
        for part in clean_line.split_whitespace() {
            let val = part
                .parse::<f64>()
                .map_err(|_| self.error(format!("'{}' is not a number", part)))?;
            self.pending.push(val);
        }

        let expected = self.values_per_record();

        // V1 2-port noise parameters follow the network data as 5-column
        // rows whose frequency restarts at or below the last data point.
        if self.nports == 2 && !self.is_v2 && self.pending.len() == 5 {
            let restart = self.frequencies.last().is_some_and(|&last| {
                self.pending[0] * self.freq_unit.multiplier() <= last
            });
            if restart {
                self.pending.clear();
                self.data_ended = true;
                return Ok(());
            }
        }

        // 1- and 2-port records never wrap onto a second line.
        if self.nports <= 2 && self.pending.len() != expected {
            let found = self.pending.len();
            return Err(self.error(format!(
                "expected {} values for a {}-port record, found {}",
                expected, self.nports, found
            )));
        }

        while self.pending.len() >= expected {
            self.take_record(expected);
        }
        if !self.pending.is_empty() {
            self.pending_since = self.line_no;
        }
        Ok(())
    }

    fn take_record(&mut self, expected: usize) {
        let record: Vec<f64> = self.pending.drain(0..expected).collect();
        self.frequencies.push(record[0] * self.freq_unit.multiplier());

        let n = self.nports;
        let mut s_matrix = vec![vec![Complex64::new(0.0, 0.0); n]; n];
        let mut pairs = record[1..]
            .chunks_exact(2)
            .map(|p| self.format.to_complex(p[0], p[1]));

        match self.matrix_format {
            MatrixFormat::Full => {
                for i in 0..n {
                    for j in 0..n {
                        let c = pairs.next().unwrap_or_default();
                        // 2-port 21_12 order (v1 default): S11, S21, S12, S22
                        if n == 2 && self.two_port_order_21_12 {
                            s_matrix[j][i] = c;
                        } else {
                            s_matrix[i][j] = c;
                        }
                    }
                }
            }
            MatrixFormat::Lower => {
                for i in 0..n {
                    for j in 0..=i {
                        let c = pairs.next().unwrap_or_default();
                        s_matrix[i][j] = c;
                        s_matrix[j][i] = c;
                    }
                }
            }
            MatrixFormat::Upper => {
                for i in 0..n {
                    for j in i..n {
                        let c = pairs.next().unwrap_or_default();
                        s_matrix[i][j] = c;
                        s_matrix[j][i] = c;
                    }
                }
            }
        }

        self.s_data.push(s_matrix);
    }

    fn finalize(self) -> Result<Touchstone, DataFormatError> {
        if !self.pending.is_empty() {
            return Err(DataFormatError::Parse {
                line: self.pending_since,
                message: format!("incomplete record ({} trailing values)", self.pending.len()),
            });
        }
        if self.s_data.is_empty() {
            return Err(DataFormatError::Empty);
        }

        let z0 = match self.z0.len() {
            n if n == self.nports => self.z0,
            0 => vec![DEFAULT_Z0; self.nports],
            _ => vec![self.z0[0]; self.nports],
        };

        Ok(Touchstone {
            nports: self.nports,
            frequency: Frequency::from_hz(self.frequencies, self.freq_unit),
            s: self.s_data,
            z0,
            comments: self.comments,
            format: self.format,
            is_v2: self.is_v2,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_extension() {
        assert_eq!(Touchstone::parse_extension("s1p").unwrap(), 1);
        assert_eq!(Touchstone::parse_extension("s2p").unwrap(), 2);
        assert_eq!(Touchstone::parse_extension("S4P").unwrap(), 4);
        assert_eq!(Touchstone::parse_extension("ts").unwrap(), 0);
        assert!(Touchstone::parse_extension("sp").is_err());
        assert!(Touchstone::parse_extension("csv").is_err());
    }

    #[test]
    fn test_parse_option_line() {
        let (unit, format, z0, param_type) =
            Touchstone::parse_option_line("# GHz S RI R 50").unwrap();
        assert_eq!(unit, FrequencyUnit::GHz);
        assert_eq!(format, SParamFormat::RI);
        assert_eq!(z0, 50.0);
        assert_eq!(param_type, ParameterType::S);

        let (unit, format, z0, _) = Touchstone::parse_option_line("# MHz S DB R 75").unwrap();
        assert_eq!(unit, FrequencyUnit::MHz);
        assert_eq!(format, SParamFormat::DB);
        assert_eq!(z0, 75.0);

        // Bare option line falls back to the Touchstone defaults
        let (unit, format, z0, _) = Touchstone::parse_option_line("#").unwrap();
        assert_eq!(unit, FrequencyUnit::GHz);
        assert_eq!(format, SParamFormat::MA);
        assert_eq!(z0, 50.0);

        assert!(Touchstone::parse_option_line("# GHz S XY R 50").is_err());
    }

    #[test]
    fn test_two_port_column_order() {
        let content = "# Hz S RI R 50\n1 1 0 2 0 3 0 4 0\n";
        let ts = Touchstone::from_str(content, 2).unwrap();
        let s = &ts.s[0];
        assert_eq!(s[0][0].re, 1.0);
        assert_eq!(s[1][0].re, 2.0); // S21
        assert_eq!(s[0][1].re, 3.0); // S12
        assert_eq!(s[1][1].re, 4.0);
    }

    #[test]
    fn test_db_format_and_inline_comment() {
        let content = "# MHz S DB R 50\n100 -20 0 -6 90 -6 90 -20 0 ! marker\n";
        let ts = Touchstone::from_str(content, 2).unwrap();
        assert_relative_eq!(ts.frequency.f()[0], 100e6);
        let s21 = ts.s[0][1][0];
        assert_relative_eq!(20.0 * s21.norm().log10(), -6.0, epsilon = 1e-12);
        assert_relative_eq!(s21.arg().to_degrees(), 90.0, epsilon = 1e-9);
    }

    #[test]
    fn test_short_two_port_record_is_rejected() {
        let content = "# GHz S MA R 50\n1.0 0.5 0\n";
        match Touchstone::from_str(content, 2) {
            Err(DataFormatError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_wrapped_four_port_record() {
        let mut content = String::from("# GHz S RI R 50\n1.0");
        for row in 0..4 {
            for col in 0..4 {
                content.push_str(&format!(" {} 0", row * 4 + col));
            }
            content.push('\n');
        }
        let ts = Touchstone::from_str(&content, 4).unwrap();
        assert_eq!(ts.nfreq(), 1);
        assert_eq!(ts.s[0][2][1].re, 9.0);
    }

    #[test]
    fn test_non_s_parameters_rejected() {
        let content = "# GHz Z RI R 50\n1.0 1 0 2 0 3 0 4 0\n";
        assert!(matches!(
            Touchstone::from_str(content, 2),
            Err(DataFormatError::UnsupportedParameter(_))
        ));
    }

    #[test]
    fn test_empty_content() {
        let content = "! only a comment\n# GHz S MA R 50\n";
        assert!(matches!(
            Touchstone::from_str(content, 2),
            Err(DataFormatError::Empty)
        ));
    }

    #[test]
    fn test_sparam_format_from_str() {
        assert_eq!(SParamFormat::from_str("RI"), Some(SParamFormat::RI));
        assert_eq!(SParamFormat::from_str("ma"), Some(SParamFormat::MA));
        assert_eq!(SParamFormat::from_str("DB"), Some(SParamFormat::DB));
        assert_eq!(SParamFormat::from_str("invalid"), None);
    }
}
