//! Append-only measurement log for plotting and filter tuning
//!
//! One line per measurement tick, space separated:
//!
//! ```text
//! timestamp rawTemp filteredTemp rawHumidity filteredHumidity rawPressure filteredPressure rawLux filteredLux rawPpm filteredPpm
//! ```
//!
//! The timestamp is in Unix seconds. Values are the unrounded raw and
//! filtered values; a quantity skipped for the cycle is written as `NaN NaN`.

use std::fmt::Write as _;
use std::fs::{File, OpenOptions};
use std::io::{self, LineWriter, Write};
use std::path::{Path, PathBuf};

use crate::constants::time::MS_PER_SECOND;
use crate::measurement::{Measurement, Quantity};

/// Write statistics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DebugLogStats {
    /// Lines appended since opening
    pub lines_written: usize,
    /// Bytes appended since opening
    pub bytes_written: usize,
}

/// Measurement log file opened in append mode
#[derive(Debug)]
pub struct DebugLog {
    path: PathBuf,
    writer: LineWriter<File>,
    stats: DebugLogStats,
}

impl DebugLog {
    /// Open `path` for appending, creating it if needed
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self { path, writer: LineWriter::new(file), stats: DebugLogStats::default() })
    }

    /// Append the line for one measurement tick
    pub fn write(&mut self, measurement: &Measurement) -> io::Result<()> {
        let line = format_line(measurement);
        self.writer.write_all(line.as_bytes())?;
        self.stats.lines_written += 1;
        self.stats.bytes_written += line.len();
        Ok(())
    }

    /// File being written
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Statistics since opening
    pub fn stats(&self) -> DebugLogStats {
        self.stats
    }
}

fn format_line(measurement: &Measurement) -> String {
    let mut line = (measurement.timestamp / MS_PER_SECOND).to_string();
    for quantity in Quantity::ALL {
        let (raw, filtered) = match measurement.get(quantity) {
            Some(reading) => (reading.raw, reading.filtered),
            None => (f64::NAN, f64::NAN),
        };
        // Writing to a String cannot fail
        let _ = write!(line, " {} {}", raw, filtered);
    }
    line.push('\n');
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::QuantityReading;
    use std::fs;

    fn measurement(with_gas: bool) -> Measurement {
        let mut readings = vec![
            QuantityReading::new(Quantity::Temperature, 21.5, 21.25),
            QuantityReading::new(Quantity::Humidity, 40.0, 41.0),
            QuantityReading::new(Quantity::Pressure, 1013.5, 1013.0),
            QuantityReading::new(Quantity::LightIntensity, 300.0, 310.0),
        ];
        if with_gas {
            readings.push(QuantityReading::new(Quantity::Co2, 420.0, 415.5));
        }
        Measurement { timestamp: 1_700_000_000_250, readings }
    }

    #[test]
    fn writes_one_line_per_tick() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sensordata.log");

        let mut log = DebugLog::open(&path).unwrap();
        log.write(&measurement(true)).unwrap();
        log.write(&measurement(false)).unwrap();
        assert_eq!(log.stats().lines_written, 2);
        assert_eq!(log.path(), path.as_path());

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "1700000000 21.5 21.25 40 41 1013.5 1013 300 310 420 415.5");
        assert_eq!(lines[1], "1700000000 21.5 21.25 40 41 1013.5 1013 300 310 NaN NaN");
        assert_eq!(log.stats().bytes_written, contents.len());
    }

    #[test]
    fn appends_to_existing_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), "earlier run\n").unwrap();

        let mut log = DebugLog::open(file.path()).unwrap();
        log.write(&measurement(true)).unwrap();
        drop(log);

        let contents = fs::read_to_string(file.path()).unwrap();
        assert!(contents.starts_with("earlier run\n1700000000 "));
        assert_eq!(contents.lines().count(), 2);
    }

    #[test]
    fn open_fails_for_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(DebugLog::open(dir.path().join("missing").join("log")).is_err());
    }
}
