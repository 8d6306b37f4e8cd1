// WAVEDESC block layout, LECROY_2_3 template.
// All offsets are relative to the start of the `WAVEDESC` marker.

pub const MARKER: &[u8; 8] = b"WAVEDESC";

/// Number of leading bytes searched for `MARKER`.
pub const MARKER_SEARCH_WINDOW: usize = 64;

/// End of the last fixed field (WAVE_SOURCE).
pub const MIN_DESCRIPTOR_LEN: usize = 346;

pub const EXPECTED_TEMPLATE: &str = "LECROY_2_3";

pub const DESCRIPTOR_NAME: usize = 0;
pub const TEMPLATE_NAME: usize = 16;
pub const COMM_TYPE: usize = 32;
pub const COMM_ORDER: usize = 34;

// Block and array lengths
pub const WAVE_DESCRIPTOR: usize = 36;
pub const USER_TEXT: usize = 40;
pub const TRIGTIME_ARRAY: usize = 48;
pub const RIS_TIME_ARRAY: usize = 52;
pub const WAVE_ARRAY_1: usize = 60;
pub const WAVE_ARRAY_2: usize = 64;

// Instrument
pub const INSTRUMENT_NAME: usize = 76;
pub const INSTRUMENT_NUMBER: usize = 92;
pub const TRACE_LABEL: usize = 96;

// Geometry
pub const WAVE_ARRAY_COUNT: usize = 116;
pub const PNTS_PER_SCREEN: usize = 120;
pub const FIRST_VALID_PNT: usize = 124;
pub const LAST_VALID_PNT: usize = 128;
pub const FIRST_POINT: usize = 132;
pub const SPARSING_FACTOR: usize = 136;
pub const SEGMENT_INDEX: usize = 140;
pub const SUBARRAY_COUNT: usize = 144;
pub const SWEEPS_PER_ACQ: usize = 148;
pub const POINTS_PER_PAIR: usize = 152;
pub const PAIR_OFFSET: usize = 154;

// Calibration
pub const VERTICAL_GAIN: usize = 156;
pub const VERTICAL_OFFSET: usize = 160;
pub const MAX_VALUE: usize = 164;
pub const MIN_VALUE: usize = 168;
pub const NOMINAL_BITS: usize = 172;
pub const NOM_SUBARRAY_COUNT: usize = 174;
pub const HORIZ_INTERVAL: usize = 176;
pub const HORIZ_OFFSET: usize = 180;
pub const PIXEL_OFFSET: usize = 188;
pub const VERTUNIT: usize = 196;
pub const HORUNIT: usize = 244;
pub const UNIT_LEN: usize = 48;
pub const HORIZ_UNCERTAINTY: usize = 292;

// Acquisition
pub const TRIGGER_TIME: usize = 296;
pub const ACQ_DURATION: usize = 312;
pub const RECORD_TYPE: usize = 316;
pub const PROCESSING_DONE: usize = 318;
pub const RIS_SWEEPS: usize = 322;
pub const TIMEBASE: usize = 324;
pub const VERT_COUPLING: usize = 326;
pub const PROBE_ATT: usize = 328;
pub const FIXED_VERT_GAIN: usize = 332;
pub const BANDWIDTH_LIMIT: usize = 334;
pub const VERTICAL_VERNIER: usize = 336;
pub const ACQ_VERT_OFFSET: usize = 340;
pub const WAVE_SOURCE: usize = 344;

pub const NAME_LEN: usize = 16;
