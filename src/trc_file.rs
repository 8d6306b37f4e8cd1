// TrcFile - file-level wrapper around `decode`

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;

use crate::error::Result;
use crate::waveform::{decode, Trace};

/// A decoded `.trc` file and where it came from.
#[derive(Debug, Clone)]
pub struct TrcFile {
    pub file_path: String,
    pub trace: Trace,
}

impl TrcFile {
    /// Read the whole file into memory and decode it.
    pub fn open<P: AsRef<Path>>(input_file: P) -> Result<Self> {
        let file_path = input_file.as_ref().to_string_lossy().to_string();
        let bytes = fs::read(&input_file)?;
        info!("read {} bytes from {}", bytes.len(), file_path);

        Ok(TrcFile {
            file_path,
            trace: decode(&bytes)?,
        })
    }

    /// Write `time,amplitude` rows for the valid window.
    pub fn write_csv<P: AsRef<Path>>(&self, output_file: P) -> Result<()> {
        let file = File::create(output_file)?;
        let mut writer = BufWriter::new(file);

        let desc = &self.trace.descriptor;
        match &self.trace.y2 {
            Some(_) => writeln!(writer, "Time ({}),Array1 ({}),Array2 ({})", desc.horunit, desc.vertunit, desc.vertunit)?,
            None => writeln!(writer, "Time ({}),Amplitude ({})", desc.horunit, desc.vertunit)?,
        }

        for (idx, (t, y)) in self.trace.points().enumerate() {
            match self.trace.y2.as_ref().and_then(|y2| y2.get(idx)) {
                Some(y2) => writeln!(writer, "{:e},{:e},{:e}", t, y, y2)?,
                None => writeln!(writer, "{:e},{:e}", t, y)?,
            }
        }

        writer.flush()?;
        Ok(())
    }

    /// Time values of the valid window.
    pub fn get_time_values(&self) -> &[f64] {
        &self.trace.x
    }

    /// Calibrated amplitudes of the valid window.
    pub fn get_samples(&self) -> &[f64] {
        &self.trace.y
    }
}
