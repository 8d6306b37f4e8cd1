// Sample array decoding and calibration

use std::ops::Range;

use log::debug;

use crate::descriptor::{SampleType, WaveDescriptor};
use crate::error::{Result, TrcError};
use crate::metadata::Metadata;
use crate::reader::ByteOrder;

/// Raw samples exactly as stored in a wave array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleArray {
    Byte(Vec<i8>),
    Word(Vec<i16>),
}

impl SampleArray {
    pub fn len(&self) -> usize {
        match self {
            SampleArray::Byte(v) => v.len(),
            SampleArray::Word(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<i16> {
        match self {
            SampleArray::Byte(v) => v.get(index).map(|&s| s as i16),
            SampleArray::Word(v) => v.get(index).copied(),
        }
    }

    /// All samples widened to 16 bits.
    pub fn to_i16(&self) -> Vec<i16> {
        match self {
            SampleArray::Byte(v) => v.iter().map(|&s| s as i16).collect(),
            SampleArray::Word(v) => v.clone(),
        }
    }

    /// Decode `byte_len` bytes at `offset` as samples of `sample_type`.
    pub fn decode(
        buf: &[u8],
        offset: usize,
        byte_len: usize,
        sample_type: SampleType,
        order: ByteOrder,
    ) -> Result<Self> {
        let width = sample_type.width();
        if byte_len % width != 0 {
            return Err(TrcError::ArrayLengthMismatch(format!(
                "{} bytes is not a multiple of the {}-byte sample width",
                byte_len, width
            )));
        }

        let bytes = offset
            .checked_add(byte_len)
            .and_then(|end| buf.get(offset..end))
            .ok_or_else(|| {
                TrcError::ArrayLengthMismatch(format!(
                    "array of {} bytes at offset {} exceeds buffer of {} bytes",
                    byte_len,
                    offset,
                    buf.len()
                ))
            })?;

        Ok(match sample_type {
            SampleType::Byte => SampleArray::Byte(bytes.iter().map(|&b| b as i8).collect()),
            SampleType::Word => SampleArray::Word(
                bytes
                    .chunks_exact(2)
                    .map(|c| match order {
                        ByteOrder::BigEndian => i16::from_be_bytes([c[0], c[1]]),
                        ByteOrder::LittleEndian => i16::from_le_bytes([c[0], c[1]]),
                    })
                    .collect(),
            ),
        })
    }
}

/// Calibration coefficients taken from the descriptor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub vertical_gain: f64,
    pub vertical_offset: f64,
    pub horiz_interval: f64,
    pub horiz_offset: f64,
    pub sparsing: usize,
}

impl Calibration {
    pub fn from_descriptor(desc: &WaveDescriptor) -> Self {
        Calibration {
            vertical_gain: desc.vertical_gain as f64,
            vertical_offset: desc.vertical_offset as f64,
            horiz_interval: desc.horiz_interval as f64,
            horiz_offset: desc.horiz_offset as f64,
            sparsing: desc.sparsing(),
        }
    }

    pub fn amplitude(&self, raw: i16) -> f64 {
        raw as f64 * self.vertical_gain - self.vertical_offset
    }

    /// Time of the stored sample at `index`.
    pub fn time(&self, index: usize) -> f64 {
        index as f64 * (self.horiz_interval * self.sparsing as f64) + self.horiz_offset
    }
}

/// Stored-sample index range covered by FIRST_VALID_PNT..=LAST_VALID_PNT.
pub fn valid_window(desc: &WaveDescriptor, sample_count: usize) -> Range<usize> {
    let sparsing = desc.sparsing();
    let first = desc.first_valid_pnt.max(0) as usize / sparsing;
    let last = desc.last_valid_pnt.max(0) as usize / sparsing;
    let end = last.saturating_add(1).min(sample_count);
    first.min(end)..end
}

fn calibrate(samples: &SampleArray, window: &Range<usize>, cal: &Calibration) -> Vec<f64> {
    window
        .clone()
        .filter_map(|i| samples.get(i))
        .map(|raw| cal.amplitude(raw))
        .collect()
}

/// Fully decoded `.trc` waveform.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    /// Sample times in HORUNIT (seconds)
    pub x: Vec<f64>,
    /// Calibrated WAVE_ARRAY_1 in VERTUNIT
    pub y: Vec<f64>,
    /// Calibrated WAVE_ARRAY_2, present for two-array records
    pub y2: Option<Vec<f64>>,
    pub raw_1: SampleArray,
    pub raw_2: Option<SampleArray>,
    /// Stored-sample indices that `x`/`y` cover
    pub valid: Range<usize>,
    pub descriptor: WaveDescriptor,
    pub metadata: Metadata,
}

impl Trace {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// (time, amplitude) pairs of the first array.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}

fn check_count(desc: &WaveDescriptor, array: &SampleArray, name: &str) -> Result<()> {
    let expected = usize::try_from(desc.wave_array_count).ok();
    if expected != Some(array.len()) {
        return Err(TrcError::ArrayLengthMismatch(format!(
            "{} holds {} samples, WAVE_ARRAY_COUNT is {}",
            name,
            array.len(),
            desc.wave_array_count
        )));
    }
    Ok(())
}

/// Decode a complete `.trc` buffer into calibrated X/Y sequences and metadata.
pub fn decode(buf: &[u8]) -> Result<Trace> {
    let descriptor = WaveDescriptor::parse(buf)?;
    let order = descriptor.byte_order;
    let sample_type = descriptor.sample_type;

    let offset_1 = descriptor.array_1_offset();
    let raw_1 = SampleArray::decode(buf, offset_1, descriptor.wave_array_1_len, sample_type, order)?;
    check_count(&descriptor, &raw_1, "WAVE_ARRAY_1")?;

    let raw_2 = match descriptor.array_2_offset() {
        Some(offset_2) => {
            let raw = SampleArray::decode(buf, offset_2, descriptor.wave_array_2_len, sample_type, order)?;
            check_count(&descriptor, &raw, "WAVE_ARRAY_2")?;
            Some(raw)
        }
        None => None,
    };

    let cal = Calibration::from_descriptor(&descriptor);
    let valid = valid_window(&descriptor, raw_1.len());
    debug!(
        "array 1 at {}: {} {} samples, valid {:?}, sparsing {}",
        offset_1,
        raw_1.len(),
        sample_type.label(),
        valid,
        cal.sparsing
    );

    let x = valid.clone().map(|i| cal.time(i)).collect();
    let y = calibrate(&raw_1, &valid, &cal);
    let y2 = raw_2.as_ref().map(|raw| calibrate(raw, &valid, &cal));
    let metadata = descriptor.metadata();

    Ok(Trace {
        x,
        y,
        y2,
        raw_1,
        raw_2,
        valid,
        descriptor,
        metadata,
    })
}
