// src/main.rs
// Command-line front end for TRC Reader

use std::process;

use clap::{Parser, Subcommand};
use log::LevelFilter;
use trc_reader::{CodeTable, TrcFile};

#[derive(Parser, Debug)]
#[command(name = "trc_reader", version, about = "Inspect and convert LeCroy .trc waveform files")]
struct Args {
    /// Log decoder details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Display TRC file information
    Info { file: String },

    /// Convert the calibrated trace to CSV
    Convert { file: String, output: String },

    /// Print every descriptor field
    Metadata {
        file: String,

        /// Emit JSON instead of KEY = value lines
        #[arg(long)]
        json: bool,
    },
}

impl Command {
    fn file(&self) -> &str {
        match self {
            Command::Info { file } | Command::Convert { file, .. } | Command::Metadata { file, .. } => file,
        }
    }
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose { LevelFilter::Debug } else { LevelFilter::Warn };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let input_file = args.command.file();
    let trc = match TrcFile::open(input_file) {
        Ok(trc) => trc,
        Err(e) => {
            eprintln!("Error loading TRC file '{}': {}", input_file, e);
            process::exit(1);
        }
    };

    match &args.command {
        Command::Info { .. } => print_file_info(&trc),

        Command::Convert { output, .. } => {
            if let Err(e) = trc.write_csv(output) {
                eprintln!("Error writing CSV file '{}': {}", output, e);
                process::exit(1);
            }
            println!("Successfully converted {} to {}", input_file, output);
            println!("Total samples written: {}", trc.trace.len());
        }

        Command::Metadata { json: true, .. } => match serde_json::to_string_pretty(&trc.trace.metadata) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error serializing metadata: {}", e);
                process::exit(1);
            }
        },

        Command::Metadata { .. } => {
            for (key, value) in trc.trace.metadata.iter() {
                println!("{:<20} = {}", key, value);
            }
        }
    }
}

fn print_file_info(trc: &TrcFile) {
    let desc = &trc.trace.descriptor;

    println!("TRC File Information");
    println!("====================");
    println!();
    println!("File: {}", trc.file_path);
    println!("Template: {}", desc.template_name);
    println!("Instrument: {} #{}", desc.instrument_name, desc.instrument_number);
    println!("Trace label: {}", desc.trace_label);
    println!("Trigger time: {}", desc.trigger_time);
    println!();

    println!("Acquisition Parameters:");
    println!("  Record type: {}", desc.record_type.label());
    println!("  Processing: {}", desc.processing_done.label());
    println!("  Timebase: {}", desc.timebase.label());
    println!("  Coupling: {}", desc.vert_coupling.label());
    println!("  Fixed gain: {}", desc.fixed_vert_gain.label());
    println!("  Bandwidth limit: {}", if desc.bandwidth_limit { "on" } else { "off" });
    println!("  Samples stored: {}", trc.trace.raw_1.len());
    println!("  Valid samples: {} ({:?})", trc.trace.len(), trc.trace.valid);
    println!("  Sparsing factor: {}", desc.sparsing_factor);
    println!("  Segments: {}", desc.subarray_count);
    println!();

    println!("Vertical Scaling:");
    println!("  Gain: {} {}/count", desc.vertical_gain, desc.vertunit);
    println!("  Offset: {} {}", desc.vertical_offset, desc.vertunit);
    if !trc.trace.is_empty() {
        let min_v = trc.trace.y.iter().fold(f64::INFINITY, |a, &b| a.min(b));
        let max_v = trc.trace.y.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
        println!("  Data range: {:.3} to {:.3} {}", min_v, max_v, desc.vertunit);
        println!("  Peak-to-peak: {:.3} {}", max_v - min_v, desc.vertunit);
    }
    println!();

    println!("Time Scaling:");
    println!(
        "  Sample interval: {:.3e} {} ({:.3} MHz sample rate)",
        desc.horiz_interval,
        desc.horunit,
        1.0 / desc.horiz_interval as f64 / 1e6
    );
    println!("  Trigger offset: {:.6e} {}", desc.horiz_offset, desc.horunit);
    println!();

    println!("Data Layout:");
    println!("  Byte order: {:?}", desc.byte_order);
    println!("  Sample width: {} byte(s)", desc.sample_type.width());
    println!("  Descriptor offset: {} bytes", desc.marker_offset);
    println!("  Array 1 offset: {} bytes", desc.array_1_offset());
    if let Some(offset) = desc.array_2_offset() {
        println!("  Array 2 offset: {} bytes", offset);
    }
}
