// WAVEDESC descriptor decoding

use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, warn};

use crate::codes::{CodeTable, FixedVertGain, ProcessingDone, RecordType, Timebase, VertCoupling};
use crate::error::{Result, TrcError};
use crate::layout;
use crate::metadata::Metadata;
use crate::reader::{nul_terminated, ByteOrder, FieldReader};

/// Sample encoding declared by COMM_TYPE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleType {
    Byte,
    Word,
}

impl SampleType {
    pub fn from_code(code: u16) -> Result<Self> {
        match code {
            0 => Ok(SampleType::Byte),
            1 => Ok(SampleType::Word),
            other => Err(TrcError::UnsupportedSampleWidth(other)),
        }
    }

    /// Bytes per sample.
    pub fn width(self) -> usize {
        match self {
            SampleType::Byte => 1,
            SampleType::Word => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SampleType::Byte => "byte",
            SampleType::Word => "word",
        }
    }
}

/// Decoded WAVEDESC block.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveDescriptor {
    /// Offset of the `WAVEDESC` marker within the buffer.
    pub marker_offset: usize,
    pub byte_order: ByteOrder,
    pub sample_type: SampleType,

    pub descriptor_name: String,
    pub template_name: String,
    pub template_version: Option<(u8, u8)>,

    pub wave_descriptor_len: usize,
    pub user_text_len: usize,
    pub trigtime_array_len: usize,
    pub ris_time_array_len: usize,
    pub wave_array_1_len: usize,
    pub wave_array_2_len: usize,

    pub instrument_name: String,
    pub instrument_number: i32,
    pub trace_label: String,

    pub wave_array_count: i32,
    pub pnts_per_screen: i32,
    pub first_valid_pnt: i32,
    pub last_valid_pnt: i32,
    pub first_point: i32,
    pub sparsing_factor: i32,
    pub segment_index: i32,
    pub subarray_count: i32,
    pub sweeps_per_acq: i32,
    pub points_per_pair: i16,
    pub pair_offset: i16,

    pub vertical_gain: f32,
    pub vertical_offset: f32,
    pub max_value: f32,
    pub min_value: f32,
    pub nominal_bits: i16,
    pub nom_subarray_count: i16,
    pub horiz_interval: f32,
    pub horiz_offset: f64,
    pub pixel_offset: f64,
    pub vertunit: String,
    pub horunit: String,
    pub horiz_uncertainty: f32,

    pub trigger_time: NaiveDateTime,
    pub acq_duration: f32,
    pub record_type: RecordType,
    pub processing_done: ProcessingDone,
    pub ris_sweeps: i16,
    pub timebase: Timebase,
    pub vert_coupling: VertCoupling,
    pub probe_att: f32,
    pub fixed_vert_gain: FixedVertGain,
    pub bandwidth_limit: bool,
    pub vertical_vernier: f32,
    pub acq_vert_offset: f32,
    pub wave_source: u16,

    pub user_text: String,
}

/// Find the `WAVEDESC` marker within the search window.
pub fn locate_marker(buf: &[u8]) -> Result<usize> {
    let window = &buf[..buf.len().min(layout::MARKER_SEARCH_WINDOW)];
    window
        .windows(layout::MARKER.len())
        .position(|w| w == layout::MARKER)
        .ok_or(TrcError::MarkerNotFound(layout::MARKER_SEARCH_WINDOW))
}

/// Parse `LECROY_<major>_<minor>` into its version numbers.
fn template_version(name: &str) -> Option<(u8, u8)> {
    let mut parts = name.strip_prefix("LECROY_")?.split('_');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    match parts.next() {
        Some(_) => None,
        None => Some((major, minor)),
    }
}

fn block_len(value: i32, field: usize, available: usize) -> Result<usize> {
    usize::try_from(value).map_err(|_| {
        debug!("negative block length {} at descriptor offset {}", value, field);
        TrcError::BufferTruncated {
            needed: usize::MAX,
            available,
        }
    })
}

fn decode_trigger_time(reader: &FieldReader<'_>) -> Result<NaiveDateTime> {
    let base = layout::TRIGGER_TIME;
    let seconds = reader.f64(base)?;
    let minutes = reader.u8(base + 8)?;
    let hours = reader.u8(base + 9)?;
    let day = reader.u8(base + 10)?;
    let month = reader.u8(base + 11)?;
    let year = reader.i16(base + 12)?;

    let invalid = || {
        TrcError::InvalidTriggerTimestamp(format!(
            "{:04}-{:02}-{:02} {:02}:{:02}:{}",
            year, month, day, hours, minutes, seconds
        ))
    };

    if !seconds.is_finite() || !(0.0..60.0).contains(&seconds) {
        return Err(invalid());
    }
    let whole = seconds.trunc();
    let nanos = (((seconds - whole) * 1e9).round() as u32).min(999_999_999);

    NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
        .and_then(|date| {
            date.and_hms_nano_opt(hours as u32, minutes as u32, whole as u32, nanos)
        })
        .ok_or_else(invalid)
}

impl WaveDescriptor {
    /// Locate and decode the descriptor block of a complete `.trc` buffer.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        let marker_offset = locate_marker(buf)?;
        debug!("WAVEDESC marker at offset {}", marker_offset);

        let needed = marker_offset + layout::MIN_DESCRIPTOR_LEN;
        if buf.len() < needed {
            return Err(TrcError::BufferTruncated {
                needed,
                available: buf.len(),
            });
        }

        // COMM_ORDER is read the same way regardless of the file's order
        let probe = FieldReader::new(buf, marker_offset, ByteOrder::LittleEndian);
        let byte_order = ByteOrder::from_flag(probe.u16(layout::COMM_ORDER)?)?;
        debug!("byte order {:?}", byte_order);

        let r = FieldReader::new(buf, marker_offset, byte_order);
        let sample_type = SampleType::from_code(r.u16(layout::COMM_TYPE)?)?;

        let descriptor_name = r.string(layout::DESCRIPTOR_NAME, layout::NAME_LEN)?;
        let template_name = r.string(layout::TEMPLATE_NAME, layout::NAME_LEN)?;
        if template_name != layout::EXPECTED_TEMPLATE {
            warn!(
                "unsupported template '{}', expected {}; decoding anyway",
                template_name,
                layout::EXPECTED_TEMPLATE
            );
        }
        let template_version = template_version(&template_name);

        let available = buf.len();
        let wave_descriptor_len = block_len(r.i32(layout::WAVE_DESCRIPTOR)?, layout::WAVE_DESCRIPTOR, available)?;
        if wave_descriptor_len < layout::MIN_DESCRIPTOR_LEN {
            debug!("WAVE_DESCRIPTOR length {} overlaps the fixed fields", wave_descriptor_len);
            return Err(TrcError::BufferTruncated {
                needed: layout::MIN_DESCRIPTOR_LEN,
                available: wave_descriptor_len,
            });
        }
        let user_text_len = block_len(r.i32(layout::USER_TEXT)?, layout::USER_TEXT, available)?;
        let trigtime_array_len = block_len(r.i32(layout::TRIGTIME_ARRAY)?, layout::TRIGTIME_ARRAY, available)?;
        let ris_time_array_len = block_len(r.i32(layout::RIS_TIME_ARRAY)?, layout::RIS_TIME_ARRAY, available)?;
        let wave_array_1_len = block_len(r.i32(layout::WAVE_ARRAY_1)?, layout::WAVE_ARRAY_1, available)?;
        let wave_array_2_len = block_len(r.i32(layout::WAVE_ARRAY_2)?, layout::WAVE_ARRAY_2, available)?;

        let total = [
            wave_descriptor_len,
            user_text_len,
            trigtime_array_len,
            ris_time_array_len,
            wave_array_1_len,
            wave_array_2_len,
        ]
        .iter()
        .try_fold(marker_offset, |acc, len| acc.checked_add(*len));
        match total {
            Some(total) if total <= available => {}
            _ => {
                return Err(TrcError::BufferTruncated {
                    needed: total.unwrap_or(usize::MAX),
                    available,
                })
            }
        }

        let user_text_start = marker_offset + wave_descriptor_len;
        let user_text = nul_terminated(&buf[user_text_start..user_text_start + user_text_len]);

        let record_type = RecordType::from_code(r.u16(layout::RECORD_TYPE)?);
        let processing_done = ProcessingDone::from_code(r.u16(layout::PROCESSING_DONE)?);
        let timebase = Timebase::from_code(r.u16(layout::TIMEBASE)?);
        let vert_coupling = VertCoupling::from_code(r.u16(layout::VERT_COUPLING)?);
        let fixed_vert_gain = FixedVertGain::from_code(r.u16(layout::FIXED_VERT_GAIN)?);
        warn_unknown("RECORD_TYPE", &record_type);
        warn_unknown("PROCESSING_DONE", &processing_done);
        warn_unknown("TIMEBASE", &timebase);
        warn_unknown("VERT_COUPLING", &vert_coupling);
        warn_unknown("FIXED_VERT_GAIN", &fixed_vert_gain);

        Ok(WaveDescriptor {
            marker_offset,
            byte_order,
            sample_type,
            descriptor_name,
            template_name,
            template_version,
            wave_descriptor_len,
            user_text_len,
            trigtime_array_len,
            ris_time_array_len,
            wave_array_1_len,
            wave_array_2_len,
            instrument_name: r.string(layout::INSTRUMENT_NAME, layout::NAME_LEN)?,
            instrument_number: r.i32(layout::INSTRUMENT_NUMBER)?,
            trace_label: r.string(layout::TRACE_LABEL, layout::NAME_LEN)?,
            wave_array_count: r.i32(layout::WAVE_ARRAY_COUNT)?,
            pnts_per_screen: r.i32(layout::PNTS_PER_SCREEN)?,
            first_valid_pnt: r.i32(layout::FIRST_VALID_PNT)?,
            last_valid_pnt: r.i32(layout::LAST_VALID_PNT)?,
            first_point: r.i32(layout::FIRST_POINT)?,
            sparsing_factor: r.i32(layout::SPARSING_FACTOR)?,
            segment_index: r.i32(layout::SEGMENT_INDEX)?,
            subarray_count: r.i32(layout::SUBARRAY_COUNT)?,
            sweeps_per_acq: r.i32(layout::SWEEPS_PER_ACQ)?,
            points_per_pair: r.i16(layout::POINTS_PER_PAIR)?,
            pair_offset: r.i16(layout::PAIR_OFFSET)?,
            vertical_gain: r.f32(layout::VERTICAL_GAIN)?,
            vertical_offset: r.f32(layout::VERTICAL_OFFSET)?,
            max_value: r.f32(layout::MAX_VALUE)?,
            min_value: r.f32(layout::MIN_VALUE)?,
            nominal_bits: r.i16(layout::NOMINAL_BITS)?,
            nom_subarray_count: r.i16(layout::NOM_SUBARRAY_COUNT)?,
            horiz_interval: r.f32(layout::HORIZ_INTERVAL)?,
            horiz_offset: r.f64(layout::HORIZ_OFFSET)?,
            pixel_offset: r.f64(layout::PIXEL_OFFSET)?,
            vertunit: r.string(layout::VERTUNIT, layout::UNIT_LEN)?,
            horunit: r.string(layout::HORUNIT, layout::UNIT_LEN)?,
            horiz_uncertainty: r.f32(layout::HORIZ_UNCERTAINTY)?,
            trigger_time: decode_trigger_time(&r)?,
            acq_duration: r.f32(layout::ACQ_DURATION)?,
            record_type,
            processing_done,
            ris_sweeps: r.i16(layout::RIS_SWEEPS)?,
            timebase,
            vert_coupling,
            probe_att: r.f32(layout::PROBE_ATT)?,
            fixed_vert_gain,
            bandwidth_limit: r.u16(layout::BANDWIDTH_LIMIT)? != 0,
            vertical_vernier: r.f32(layout::VERTICAL_VERNIER)?,
            acq_vert_offset: r.f32(layout::ACQ_VERT_OFFSET)?,
            wave_source: r.u16(layout::WAVE_SOURCE)?,
            user_text,
        })
    }

    /// Absolute offset of WAVE_ARRAY_1.
    pub fn array_1_offset(&self) -> usize {
        self.marker_offset
            + self.wave_descriptor_len
            + self.user_text_len
            + self.trigtime_array_len
            + self.ris_time_array_len
    }

    /// Absolute offset of WAVE_ARRAY_2, if the file has one.
    pub fn array_2_offset(&self) -> Option<usize> {
        (self.wave_array_2_len > 0).then(|| self.array_1_offset() + self.wave_array_1_len)
    }

    /// Stored samples advance by this many acquisition points.
    pub fn sparsing(&self) -> usize {
        self.sparsing_factor.max(1) as usize
    }

    /// Build the key/value view, keyed by template field names.
    pub fn metadata(&self) -> Metadata {
        let mut d = Metadata::with_capacity(64);

        d.insert("DESCRIPTOR_NAME", self.descriptor_name.as_str());
        d.insert("TEMPLATE_NAME", self.template_name.as_str());
        if let Some((major, minor)) = self.template_version {
            d.insert("TEMPLATE_VERSION", format!("{}.{}", major, minor).as_str());
        }
        d.insert_label("COMM_TYPE", self.sample_type.label());
        d.insert_label("COMM_ORDER", self.byte_order.label());
        d.insert("WAVE_DESCRIPTOR", self.wave_descriptor_len as i64);
        d.insert("TRIGTIME_ARRAY", self.trigtime_array_len as i64);
        d.insert("RIS_TIME_ARRAY", self.ris_time_array_len as i64);
        d.insert("WAVE_ARRAY_1", self.wave_array_1_len as i64);
        d.insert("WAVE_ARRAY_2", self.wave_array_2_len as i64);

        d.insert("INSTRUMENT_NAME", self.instrument_name.as_str());
        d.insert("INSTRUMENT_NUMBER", self.instrument_number);
        d.insert("TRACE_LABEL", self.trace_label.as_str());

        d.insert("WAVE_ARRAY_COUNT", self.wave_array_count);
        d.insert("PNTS_PER_SCREEN", self.pnts_per_screen);
        d.insert("FIRST_VALID_PNT", self.first_valid_pnt);
        d.insert("LAST_VALID_PNT", self.last_valid_pnt);
        d.insert("FIRST_POINT", self.first_point);
        d.insert("SPARSING_FACTOR", self.sparsing_factor);
        d.insert("SEGMENT_INDEX", self.segment_index);
        d.insert("SUBARRAY_COUNT", self.subarray_count);
        d.insert("SWEEPS_PER_ACQ", self.sweeps_per_acq);
        d.insert("POINTS_PER_PAIR", self.points_per_pair);
        d.insert("PAIR_OFFSET", self.pair_offset);
        d.insert("VERTICAL_GAIN", self.vertical_gain);
        d.insert("VERTICAL_OFFSET", self.vertical_offset);
        d.insert("MAX_VALUE", self.max_value);
        d.insert("MIN_VALUE", self.min_value);
        d.insert("NOMINAL_BITS", self.nominal_bits);
        d.insert("NOM_SUBARRAY_COUNT", self.nom_subarray_count);
        d.insert("HORIZ_INTERVAL", self.horiz_interval);
        d.insert("HORIZ_OFFSET", self.horiz_offset);
        d.insert("PIXEL_OFFSET", self.pixel_offset);
        d.insert("VERTUNIT", self.vertunit.as_str());
        d.insert("HORUNIT", self.horunit.as_str());
        d.insert("HORIZ_UNCERTAINTY", self.horiz_uncertainty);

        d.insert("TRIGGER_TIME", self.trigger_time);
        d.insert("ACQ_DURATION", self.acq_duration);
        d.insert_label("RECORD_TYPE", self.record_type.label());
        d.insert_label("PROCESSING_DONE", self.processing_done.label());
        d.insert("RIS_SWEEPS", self.ris_sweeps);
        d.insert_label("TIMEBASE", self.timebase.label());
        d.insert_label("VERT_COUPLING", self.vert_coupling.label());
        d.insert("PROBE_ATT", self.probe_att);
        d.insert_label("FIXED_VERT_GAIN", self.fixed_vert_gain.label());
        d.insert("BANDWIDTH_LIMIT", self.bandwidth_limit);
        d.insert("VERTICAL_VERNIER", self.vertical_vernier);
        d.insert("ACQ_VERT_OFFSET", self.acq_vert_offset);
        d.insert("WAVE_SOURCE", self.wave_source);
        d.insert("USER_TEXT", self.user_text.as_str());

        d
    }
}

fn warn_unknown<T: CodeTable>(field: &str, value: &T) {
    if !value.is_known() {
        warn!("unknown {} code {}, keeping raw value", field, value.code());
    }
}
