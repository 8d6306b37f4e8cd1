// tests/integration.rs
// Integration tests for TRC Reader

use std::fs::{self, File};
use std::io::Write;

use chrono::NaiveDate;
use tempfile::tempdir;
use trc_reader::{decode, ByteOrder, MetaValue, RecordType, SampleArray, TrcError, TrcFile};

const DESC_LEN: usize = 346;

/// Field values used to build a synthetic `.trc` buffer.
#[derive(Clone)]
struct Synthetic {
    big_endian: bool,
    prefix: usize,
    word: bool,
    samples_1: Vec<i16>,
    samples_2: Option<Vec<i16>>,
    user_text: Vec<u8>,
    trigtime_len: usize,
    vertical_gain: f32,
    vertical_offset: f32,
    horiz_interval: f32,
    horiz_offset: f64,
    first_valid: i32,
    last_valid: Option<i32>,
    sparsing: i32,
    record_type: u16,
    comm_order: Option<u16>,
    comm_type: Option<u16>,
    wave_array_count: Option<i32>,
    wave_descriptor_len: Option<i32>,
}

impl Default for Synthetic {
    fn default() -> Self {
        Synthetic {
            big_endian: false,
            prefix: 0,
            word: true,
            samples_1: vec![0; 5],
            samples_2: None,
            user_text: Vec::new(),
            trigtime_len: 0,
            vertical_gain: 1.0,
            vertical_offset: 0.0,
            horiz_interval: 1e-9,
            horiz_offset: 0.0,
            first_valid: 0,
            last_valid: None,
            sparsing: 1,
            record_type: 0,
            comm_order: None,
            comm_type: None,
            wave_array_count: None,
            wave_descriptor_len: None,
        }
    }
}

impl Synthetic {
    fn put(&self, buf: &mut [u8], offset: usize, le: &[u8], be: &[u8]) {
        let bytes = if self.big_endian { be } else { le };
        buf[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    fn put_i16(&self, buf: &mut [u8], offset: usize, v: i16) {
        self.put(buf, offset, &v.to_le_bytes(), &v.to_be_bytes());
    }

    fn put_u16(&self, buf: &mut [u8], offset: usize, v: u16) {
        self.put(buf, offset, &v.to_le_bytes(), &v.to_be_bytes());
    }

    fn put_i32(&self, buf: &mut [u8], offset: usize, v: i32) {
        self.put(buf, offset, &v.to_le_bytes(), &v.to_be_bytes());
    }

    fn put_f32(&self, buf: &mut [u8], offset: usize, v: f32) {
        self.put(buf, offset, &v.to_le_bytes(), &v.to_be_bytes());
    }

    fn put_f64(&self, buf: &mut [u8], offset: usize, v: f64) {
        self.put(buf, offset, &v.to_le_bytes(), &v.to_be_bytes());
    }

    fn put_str(buf: &mut [u8], offset: usize, s: &str) {
        buf[offset..offset + s.len()].copy_from_slice(s.as_bytes());
    }

    fn sample_bytes(&self, samples: &[i16]) -> Vec<u8> {
        let mut out = Vec::new();
        for &s in samples {
            if self.word {
                if self.big_endian {
                    out.extend_from_slice(&s.to_be_bytes());
                } else {
                    out.extend_from_slice(&s.to_le_bytes());
                }
            } else {
                out.push(s as i8 as u8);
            }
        }
        out
    }

    fn build(&self) -> Vec<u8> {
        let array_1 = self.sample_bytes(&self.samples_1);
        let array_2 = self
            .samples_2
            .as_ref()
            .map(|s| self.sample_bytes(s))
            .unwrap_or_default();

        let mut d = vec![0u8; DESC_LEN];
        Self::put_str(&mut d, 0, "WAVEDESC");
        Self::put_str(&mut d, 16, "LECROY_2_3");
        self.put_u16(&mut d, 32, self.comm_type.unwrap_or(self.word as u16));
        let order_flag = self.comm_order.unwrap_or(if self.big_endian { 0 } else { 1 });
        d[34..36].copy_from_slice(&order_flag.to_le_bytes());

        self.put_i32(&mut d, 36, self.wave_descriptor_len.unwrap_or(DESC_LEN as i32));
        self.put_i32(&mut d, 40, self.user_text.len() as i32);
        self.put_i32(&mut d, 48, self.trigtime_len as i32);
        self.put_i32(&mut d, 52, 0);
        self.put_i32(&mut d, 60, array_1.len() as i32);
        self.put_i32(&mut d, 64, array_2.len() as i32);

        Self::put_str(&mut d, 76, "LECROYWR104MXi");
        self.put_i32(&mut d, 92, 12345);
        Self::put_str(&mut d, 96, "Probe C1");

        let count = self.samples_1.len() as i32;
        self.put_i32(&mut d, 116, self.wave_array_count.unwrap_or(count));
        self.put_i32(&mut d, 120, 10000);
        self.put_i32(&mut d, 124, self.first_valid);
        self.put_i32(&mut d, 128, self.last_valid.unwrap_or(count - 1));
        self.put_i32(&mut d, 132, 0);
        self.put_i32(&mut d, 136, self.sparsing);
        self.put_i32(&mut d, 140, 0);
        self.put_i32(&mut d, 144, 1);
        self.put_i32(&mut d, 148, 1);
        self.put_i16(&mut d, 152, 0);
        self.put_i16(&mut d, 154, 0);
        self.put_f32(&mut d, 156, self.vertical_gain);
        self.put_f32(&mut d, 160, self.vertical_offset);
        self.put_f32(&mut d, 164, 1.5);
        self.put_f32(&mut d, 168, -1.5);
        self.put_i16(&mut d, 172, 8);
        self.put_i16(&mut d, 174, 1);
        self.put_f32(&mut d, 176, self.horiz_interval);
        self.put_f64(&mut d, 180, self.horiz_offset);
        self.put_f64(&mut d, 188, 0.25);
        Self::put_str(&mut d, 196, "V");
        Self::put_str(&mut d, 244, "S");
        self.put_f32(&mut d, 292, 1e-12);

        self.put_f64(&mut d, 296, 45.5);
        d[304] = 7; // minutes
        d[305] = 13; // hours
        d[306] = 24; // day
        d[307] = 9; // month
        self.put_i16(&mut d, 308, 2015);

        self.put_f32(&mut d, 312, 0.0);
        self.put_u16(&mut d, 316, self.record_type);
        self.put_u16(&mut d, 318, 0);
        self.put_i16(&mut d, 322, 1);
        self.put_u16(&mut d, 324, 18);
        self.put_u16(&mut d, 326, 2);
        self.put_f32(&mut d, 328, 10.0);
        self.put_u16(&mut d, 332, 15);
        self.put_u16(&mut d, 334, 1);
        self.put_f32(&mut d, 336, 1.0);
        self.put_f32(&mut d, 340, -0.125);
        self.put_u16(&mut d, 344, 2);

        let mut buf = vec![0xEE; self.prefix];
        buf.extend(d);
        buf.extend(&self.user_text);
        buf.extend(vec![0u8; self.trigtime_len]);
        buf.extend(array_1);
        buf.extend(array_2);
        buf
    }
}

fn assert_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len());
    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert!((a - e).abs() < 1e-15, "value {} mismatch: {} != {}", i, a, e);
    }
}

/// Decode a file with known field values and check every metadata entry.
fn check_metadata_fields(big_endian: bool) {
    let file = Synthetic {
        big_endian,
        prefix: 11,
        user_text: b"bench 3\0\0\0".to_vec(),
        trigtime_len: 16,
        vertical_gain: 0.5,
        vertical_offset: 0.25,
        horiz_offset: -2.5e-7,
        ..Default::default()
    };
    let trace = decode(&file.build()).expect("Failed to decode");
    let d = &trace.metadata;

    let text = |key: &str| d.get(key).and_then(MetaValue::as_str).map(str::to_string);
    let int = |key: &str| d.get(key).and_then(MetaValue::as_i64);
    let float = |key: &str| d.get(key).and_then(MetaValue::as_f64);

    assert_eq!(text("DESCRIPTOR_NAME").as_deref(), Some("WAVEDESC"));
    assert_eq!(text("TEMPLATE_NAME").as_deref(), Some("LECROY_2_3"));
    assert_eq!(text("TEMPLATE_VERSION").as_deref(), Some("2.3"));
    assert_eq!(text("COMM_TYPE").as_deref(), Some("word"));
    let order = if big_endian { "HIFIRST" } else { "LOFIRST" };
    assert_eq!(text("COMM_ORDER").as_deref(), Some(order));
    assert_eq!(int("WAVE_DESCRIPTOR"), Some(346));
    assert_eq!(int("TRIGTIME_ARRAY"), Some(16));
    assert_eq!(int("WAVE_ARRAY_1"), Some(10));
    assert_eq!(int("WAVE_ARRAY_2"), Some(0));
    assert_eq!(text("INSTRUMENT_NAME").as_deref(), Some("LECROYWR104MXi"));
    assert_eq!(int("INSTRUMENT_NUMBER"), Some(12345));
    assert_eq!(text("TRACE_LABEL").as_deref(), Some("Probe C1"));
    assert_eq!(int("WAVE_ARRAY_COUNT"), Some(5));
    assert_eq!(int("PNTS_PER_SCREEN"), Some(10000));
    assert_eq!(int("FIRST_VALID_PNT"), Some(0));
    assert_eq!(int("LAST_VALID_PNT"), Some(4));
    assert_eq!(int("SPARSING_FACTOR"), Some(1));
    assert_eq!(int("SUBARRAY_COUNT"), Some(1));
    assert_eq!(int("SWEEPS_PER_ACQ"), Some(1));
    assert_eq!(float("VERTICAL_GAIN"), Some(0.5));
    assert_eq!(float("VERTICAL_OFFSET"), Some(0.25));
    assert_eq!(float("MAX_VALUE"), Some(1.5));
    assert_eq!(float("MIN_VALUE"), Some(-1.5));
    assert_eq!(int("NOMINAL_BITS"), Some(8));
    assert_eq!(int("NOM_SUBARRAY_COUNT"), Some(1));
    assert_eq!(float("HORIZ_INTERVAL"), Some(1e-9f32 as f64));
    assert_eq!(float("HORIZ_OFFSET"), Some(-2.5e-7));
    assert_eq!(float("PIXEL_OFFSET"), Some(0.25));
    assert_eq!(text("VERTUNIT").as_deref(), Some("V"));
    assert_eq!(text("HORUNIT").as_deref(), Some("S"));
    assert_eq!(float("HORIZ_UNCERTAINTY"), Some(1e-12f32 as f64));
    assert_eq!(text("RECORD_TYPE").as_deref(), Some("single_sweep"));
    assert_eq!(text("PROCESSING_DONE").as_deref(), Some("no_processing"));
    assert_eq!(int("RIS_SWEEPS"), Some(1));
    assert_eq!(text("TIMEBASE").as_deref(), Some("1_us/div"));
    assert_eq!(text("VERT_COUPLING").as_deref(), Some("DC_1MOhm"));
    assert_eq!(float("PROBE_ATT"), Some(10.0));
    assert_eq!(text("FIXED_VERT_GAIN").as_deref(), Some("100_mV/div"));
    assert_eq!(d.get("BANDWIDTH_LIMIT").and_then(MetaValue::as_bool), Some(true));
    assert_eq!(float("VERTICAL_VERNIER"), Some(1.0));
    assert_eq!(float("ACQ_VERT_OFFSET"), Some(-0.125));
    assert_eq!(int("WAVE_SOURCE"), Some(2));
    assert_eq!(text("USER_TEXT").as_deref(), Some("bench 3"));

    let expected_time = NaiveDate::from_ymd_opt(2015, 9, 24)
        .unwrap()
        .and_hms_milli_opt(13, 7, 45, 500)
        .unwrap();
    assert_eq!(
        d.get("TRIGGER_TIME").and_then(MetaValue::as_timestamp),
        Some(expected_time)
    );

    assert_eq!(trace.descriptor.marker_offset, 11);
    assert_eq!(trace.descriptor.array_1_offset(), 11 + 346 + 10 + 16);
}

#[test]
fn test_metadata_matches_input_fields() {
    check_metadata_fields(false);
}

#[test]
fn test_big_endian_metadata_matches_input_fields() {
    check_metadata_fields(true);
}

#[test]
fn test_big_endian_two_arrays() {
    let file = Synthetic {
        big_endian: true,
        samples_1: vec![300, -300, 7],
        samples_2: Some(vec![-1, 1024, i16::MIN]),
        vertical_gain: 0.5,
        vertical_offset: 1.0,
        horiz_offset: -4e-6,
        ..Default::default()
    };
    let trace = decode(&file.build()).expect("Failed to decode");

    assert_eq!(trace.descriptor.byte_order, ByteOrder::BigEndian);
    assert_eq!(trace.raw_2.as_ref().map(SampleArray::to_i16), Some(vec![-1, 1024, i16::MIN]));
    assert_eq!(trace.y, vec![149.0, -151.0, 2.5]);
    assert_eq!(trace.y2, Some(vec![-1.5, 511.0, -16385.0]));
    assert_eq!(trace.x[0], -4e-6);
    assert_eq!(trace.metadata.get("WAVE_ARRAY_2"), Some(&MetaValue::Int(6)));
    assert_eq!(
        trace.descriptor.array_2_offset(),
        Some(trace.descriptor.array_1_offset() + 6)
    );
}

#[test]
fn test_big_endian_byte_samples() {
    let file = Synthetic {
        big_endian: true,
        word: false,
        samples_1: vec![1, -1, 127, -128],
        vertical_gain: 0.5,
        ..Default::default()
    };
    let trace = decode(&file.build()).expect("Failed to decode");

    assert_eq!(trace.descriptor.byte_order, ByteOrder::BigEndian);
    assert_eq!(trace.raw_1, SampleArray::Byte(vec![1, -1, 127, -128]));
    assert_eq!(trace.y, vec![0.5, -0.5, 63.5, -64.0]);
    assert_eq!(trace.metadata.get("INSTRUMENT_NUMBER"), Some(&MetaValue::Int(12345)));
}

#[test]
fn test_big_endian_word_samples() {
    let file = Synthetic {
        big_endian: true,
        samples_1: vec![1000, -1000, i16::MAX, i16::MIN],
        ..Default::default()
    };
    let trace = decode(&file.build()).expect("Failed to decode");
    assert_eq!(trace.raw_1.to_i16(), vec![1000, -1000, i16::MAX, i16::MIN]);
    assert_eq!(trace.descriptor.horiz_interval, 1e-9);
}

#[test]
fn test_time_axis() {
    let file = Synthetic {
        horiz_interval: 1e-9,
        horiz_offset: -5e-7,
        samples_1: vec![0; 5],
        ..Default::default()
    };
    let trace = decode(&file.build()).expect("Failed to decode");
    assert_close(&trace.x, &[-5e-7, -4.99e-7, -4.98e-7, -4.97e-7, -4.96e-7]);
}

#[test]
fn test_amplitude_calibration() {
    let file = Synthetic {
        samples_1: vec![10, -10, 0],
        vertical_gain: 2.0,
        vertical_offset: 1.0,
        ..Default::default()
    };
    let trace = decode(&file.build()).expect("Failed to decode");
    assert_eq!(trace.y, vec![19.0, -21.0, -1.0]);
    assert_eq!(trace.x.len(), trace.y.len());
}

#[test]
fn test_truncated_before_arrays() {
    let buf = Synthetic::default().build();
    let result = decode(&buf[..DESC_LEN]);
    assert!(matches!(result, Err(TrcError::BufferTruncated { .. })));
}

#[test]
fn test_descriptor_length_below_fixed_fields() {
    let file = Synthetic {
        samples_1: vec![1, 2],
        wave_descriptor_len: Some(0),
        ..Default::default()
    };
    let result = decode(&file.build());
    assert!(matches!(result, Err(TrcError::BufferTruncated { .. })));
}

#[test]
fn test_invalid_byte_order_flag() {
    let file = Synthetic {
        comm_order: Some(2),
        ..Default::default()
    };
    let result = decode(&file.build());
    assert!(matches!(result, Err(TrcError::InvalidByteOrder(2))));
}

#[test]
fn test_unsupported_sample_width() {
    let file = Synthetic {
        comm_type: Some(4),
        ..Default::default()
    };
    let result = decode(&file.build());
    assert!(matches!(result, Err(TrcError::UnsupportedSampleWidth(4))));
    assert!(result.unwrap_err().to_string().contains("unsupported sample width"));
}

#[test]
fn test_missing_marker() {
    let result = decode(&[0u8; 512]);
    assert!(matches!(result, Err(TrcError::MarkerNotFound(_))));
}

#[test]
fn test_wave_array_count_mismatch() {
    let file = Synthetic {
        wave_array_count: Some(7),
        ..Default::default()
    };
    let result = decode(&file.build());
    assert!(matches!(result, Err(TrcError::ArrayLengthMismatch(_))));
}

#[test]
fn test_decode_is_repeatable() {
    let file = Synthetic {
        samples_1: vec![3, -7, 12, 0, 99],
        vertical_gain: 0.1,
        vertical_offset: 0.3,
        horiz_offset: -1e-6,
        ..Default::default()
    };
    let buf = file.build();
    let first = decode(&buf).expect("Failed to decode");
    let second = decode(&buf).expect("Failed to decode");

    let bits = |v: &[f64]| v.iter().map(|f| f.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&first.x), bits(&second.x));
    assert_eq!(bits(&first.y), bits(&second.y));
    assert_eq!(first.metadata, second.metadata);
}

#[test]
fn test_unknown_record_type() {
    let file = Synthetic {
        record_type: 55,
        ..Default::default()
    };
    let trace = decode(&file.build()).expect("Unknown code should not fail");
    assert_eq!(trace.descriptor.record_type, RecordType::Unknown(55));
    assert_eq!(
        trace.metadata.get("RECORD_TYPE"),
        Some(&MetaValue::Label("55".to_string()))
    );
}

#[test]
fn test_two_arrays() {
    let file = Synthetic {
        samples_1: vec![1, 2, 3],
        samples_2: Some(vec![-1, -2, -3]),
        vertical_gain: 2.0,
        ..Default::default()
    };
    let trace = decode(&file.build()).expect("Failed to decode");

    assert_eq!(trace.y, vec![2.0, 4.0, 6.0]);
    assert_eq!(trace.y2, Some(vec![-2.0, -4.0, -6.0]));
    assert_eq!(trace.raw_2.as_ref().map(SampleArray::len), Some(3));
    assert_eq!(
        trace.descriptor.array_2_offset(),
        Some(trace.descriptor.array_1_offset() + 6)
    );
}

#[test]
fn test_valid_window() {
    let file = Synthetic {
        samples_1: vec![0, 1, 2, 3, 4, 5],
        first_valid: 1,
        last_valid: Some(3),
        horiz_interval: 1.0,
        ..Default::default()
    };
    let trace = decode(&file.build()).expect("Failed to decode");

    assert_eq!(trace.valid, 1..4);
    assert_eq!(trace.y, vec![1.0, 2.0, 3.0]);
    assert_eq!(trace.x, vec![1.0, 2.0, 3.0]);
    assert_eq!(trace.raw_1.len(), 6);
}

#[test]
fn test_sparsed_acquisition() {
    let file = Synthetic {
        samples_1: vec![0, 1, 2, 3],
        last_valid: Some(15),
        sparsing: 4,
        horiz_interval: 0.5,
        horiz_offset: -1.0,
        ..Default::default()
    };
    let trace = decode(&file.build()).expect("Failed to decode");

    assert_eq!(trace.valid, 0..4);
    assert_eq!(trace.x, vec![-1.0, 1.0, 3.0, 5.0]);
}

#[test]
fn test_load_and_export_csv() {
    let dir = tempdir().expect("Failed to create temp dir");
    let trc_path = dir.path().join("C1_00000.trc");
    let csv_path = dir.path().join("C1_00000.csv");

    let file = Synthetic {
        samples_1: vec![10, 20, 30],
        ..Default::default()
    };
    File::create(&trc_path)
        .and_then(|mut f| f.write_all(&file.build()))
        .expect("Failed to write test file");

    let trc = TrcFile::open(&trc_path).expect("Failed to load TRC file");
    assert_eq!(trc.get_samples(), &[10.0, 20.0, 30.0]);
    assert_eq!(trc.get_time_values().len(), 3);

    trc.write_csv(&csv_path).expect("Failed to write CSV");
    let csv = fs::read_to_string(&csv_path).expect("Failed to read CSV");
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "Time (S),Amplitude (V)");
}

#[test]
fn test_missing_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let result = TrcFile::open(dir.path().join("missing.trc"));
    assert!(matches!(result, Err(TrcError::Io(_))));
    assert!(!result.unwrap_err().is_format_error());
}
