// src/lib.rs
// TRC Reader Library - Public API

//! # TRC Reader
//!
//! A Rust library for reading LeCroy `.trc` waveform files (`LECROY_2_3`
//! template).
//!
//! ## Features
//!
//! - Locate and decode the WAVEDESC descriptor, big- or little-endian
//! - 8-bit and 16-bit sample arrays, one or two arrays per file
//! - Calibrated time and amplitude sequences
//! - Metadata keyed by template field names (`VERTICAL_GAIN`, `TRIGGER_TIME`, ...)
//! - Unknown enumerated codes kept as raw values instead of failing
//!
//! ## Example
//!
//! ```no_run
//! use trc_reader::{decode, MetaValue};
//!
//! let bytes = std::fs::read("C1_00000.trc").expect("Failed to read file");
//! let trace = decode(&bytes).expect("Failed to decode file");
//!
//! println!("Points: {}", trace.len());
//! if let Some(MetaValue::Timestamp(t)) = trace.metadata.get("TRIGGER_TIME") {
//!     println!("Triggered at {}", t);
//! }
//! for (t, v) in trace.points().take(5) {
//!     println!("{:e} s, {:e} V", t, v);
//! }
//! ```

mod codes;
mod descriptor;
mod error;
mod layout;
mod metadata;
mod reader;
mod trc_file;
mod waveform;

pub use codes::{CodeTable, FixedVertGain, ProcessingDone, RecordType, Timebase, VertCoupling};
pub use descriptor::{locate_marker, SampleType, WaveDescriptor};
pub use error::{Result, TrcError};
pub use layout::{MARKER, MARKER_SEARCH_WINDOW, MIN_DESCRIPTOR_LEN};
pub use metadata::{MetaValue, Metadata};
pub use reader::ByteOrder;
pub use trc_file::TrcFile;
pub use waveform::{decode, valid_window, Calibration, SampleArray, Trace};
