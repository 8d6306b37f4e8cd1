// Enumerated descriptor codes.
//
// Each table keeps the raw code when it is not recognised, so files written
// by newer firmware still decode.

use std::borrow::Cow;
use std::fmt;

/// Common interface of the descriptor code tables.
pub trait CodeTable: Sized {
    fn from_code(code: u16) -> Self;
    fn code(&self) -> u16;
    fn label(&self) -> Cow<'static, str>;

    fn is_known(&self) -> bool;
}

macro_rules! code_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident = $code:literal => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
            Unknown(u16),
        }

        impl CodeTable for $name {
            fn from_code(code: u16) -> Self {
                match code {
                    $($code => $name::$variant,)+
                    other => $name::Unknown(other),
                }
            }

            fn code(&self) -> u16 {
                match self {
                    $($name::$variant => $code,)+
                    $name::Unknown(code) => *code,
                }
            }

            fn label(&self) -> Cow<'static, str> {
                match self {
                    $($name::$variant => Cow::Borrowed($label),)+
                    $name::Unknown(code) => Cow::Owned(code.to_string()),
                }
            }

            fn is_known(&self) -> bool {
                !matches!(self, $name::Unknown(_))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.label())
            }
        }
    };
}

code_enum! {
    /// RECORD_TYPE
    RecordType {
        SingleSweep = 0 => "single_sweep",
        Interleaved = 1 => "interleaved",
        Histogram = 2 => "histogram",
        Graph = 3 => "graph",
        FilterCoefficient = 4 => "filter_coefficient",
        Complex = 5 => "complex",
        Extrema = 6 => "extrema",
        SequenceObsolete = 7 => "sequence_obsolete",
        CenteredRis = 8 => "centered_RIS",
        PeakDetect = 9 => "peak_detect",
    }
}

code_enum! {
    /// PROCESSING_DONE
    ProcessingDone {
        NoProcessing = 0 => "no_processing",
        FirFilter = 1 => "fir_filter",
        Interpolated = 2 => "interpolated",
        Sparsed = 3 => "sparsed",
        Autoscaled = 4 => "autoscaled",
        NoResult = 5 => "no_result",
        Rolling = 6 => "rolling",
        Cumulative = 7 => "cumulative",
    }
}

code_enum! {
    /// VERT_COUPLING
    VertCoupling {
        Dc50Ohms = 0 => "DC_50_Ohms",
        Ground = 1 => "ground",
        Dc1MOhm = 2 => "DC_1MOhm",
        Ground1MOhm = 3 => "ground",
        Ac1MOhm = 4 => "AC_1MOhm",
    }
}

/// 1-2-5 sequence used by the timebase and fixed gain tables.
fn one_two_five(step: u16, units: &[&'static str]) -> Option<(u16, &'static str)> {
    let mantissa = [1, 2, 5][(step % 3) as usize];
    let decade = step / 3;
    let unit = *units.get((decade / 3) as usize)?;
    Some((mantissa * 10u16.pow((decade % 3) as u32), unit))
}

const TIME_UNITS: [&str; 6] = ["ps", "ns", "us", "ms", "s", "ks"];
const VOLT_UNITS: [&str; 4] = ["uV", "mV", "V", "kV"];

const LAST_TIMEBASE_CODE: u16 = 47;
const LAST_GAIN_CODE: u16 = 27;

/// TIMEBASE: `1_ps/div` (code 0) through `5_ks/div` (code 47), or external.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timebase {
    PerDiv(u16),
    External(u16),
    Unknown(u16),
}

impl Timebase {
    /// Seconds per division for internal timebases.
    pub fn seconds_per_div(&self) -> Option<f64> {
        match self {
            Timebase::PerDiv(code) => {
                let (value, unit) = one_two_five(*code, &TIME_UNITS)?;
                let scale = TIME_UNITS.iter().position(|u| *u == unit)? as i32;
                Some(value as f64 * 10f64.powi(3 * scale - 12))
            }
            _ => None,
        }
    }
}

impl CodeTable for Timebase {
    fn from_code(code: u16) -> Self {
        match code {
            0..=LAST_TIMEBASE_CODE => Timebase::PerDiv(code),
            // Table position 48 in older readers, 100 in the template
            48 | 100 => Timebase::External(code),
            other => Timebase::Unknown(other),
        }
    }

    fn code(&self) -> u16 {
        match self {
            Timebase::PerDiv(code) | Timebase::External(code) | Timebase::Unknown(code) => *code,
        }
    }

    fn label(&self) -> Cow<'static, str> {
        match self {
            Timebase::PerDiv(code) => match one_two_five(*code, &TIME_UNITS) {
                Some((value, unit)) => Cow::Owned(format!("{}_{}/div", value, unit)),
                None => Cow::Owned(code.to_string()),
            },
            Timebase::External(_) => Cow::Borrowed("EXTERNAL"),
            Timebase::Unknown(code) => Cow::Owned(code.to_string()),
        }
    }

    fn is_known(&self) -> bool {
        !matches!(self, Timebase::Unknown(_))
    }
}

/// FIXED_VERT_GAIN: `1_uV/div` (code 0) through `1_kV/div` (code 27).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixedVertGain {
    PerDiv(u16),
    Unknown(u16),
}

impl FixedVertGain {
    pub fn volts_per_div(&self) -> Option<f64> {
        match self {
            FixedVertGain::PerDiv(code) => {
                let (value, unit) = one_two_five(*code, &VOLT_UNITS)?;
                let scale = VOLT_UNITS.iter().position(|u| *u == unit)? as i32;
                Some(value as f64 * 10f64.powi(3 * scale - 6))
            }
            FixedVertGain::Unknown(_) => None,
        }
    }
}

impl CodeTable for FixedVertGain {
    fn from_code(code: u16) -> Self {
        match code {
            0..=LAST_GAIN_CODE => FixedVertGain::PerDiv(code),
            other => FixedVertGain::Unknown(other),
        }
    }

    fn code(&self) -> u16 {
        match self {
            FixedVertGain::PerDiv(code) | FixedVertGain::Unknown(code) => *code,
        }
    }

    fn label(&self) -> Cow<'static, str> {
        match self {
            FixedVertGain::PerDiv(code) => match one_two_five(*code, &VOLT_UNITS) {
                Some((value, unit)) => Cow::Owned(format!("{}_{}/div", value, unit)),
                None => Cow::Owned(code.to_string()),
            },
            FixedVertGain::Unknown(code) => Cow::Owned(code.to_string()),
        }
    }

    fn is_known(&self) -> bool {
        matches!(self, FixedVertGain::PerDiv(_))
    }
}

impl fmt::Display for Timebase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl fmt::Display for FixedVertGain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}
