use denoise::io::wav::{read_wav_file, write_wav_file, WavSampleFormat};
use denoise::{
    ClassificationMethod, NoiseReducer, NoiseReductionParams, ReductionMode, WindowPairKind,
};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 {
        print_usage();
        std::process::exit(1);
    }

    let input_path = &args[1];
    let output_path = &args[2];

    let mut noise_start: Option<f64> = None;
    let mut noise_end: Option<f64> = None;
    let mut params = NoiseReductionParams::new();
    let mut format = WavSampleFormat::Pcm16;
    let mut verbose = false;

    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            "--noise-start" => {
                i += 1;
                noise_start = Some(parse_f64(&args, i, "noise-start"));
            }
            "--noise-end" => {
                i += 1;
                noise_end = Some(parse_f64(&args, i, "noise-end"));
            }
            "--gain" | "-g" => {
                i += 1;
                params = params.with_noise_gain_db(parse_f64(&args, i, "gain"));
            }
            "--sensitivity" | "-s" => {
                i += 1;
                params = params.with_sensitivity(parse_f64(&args, i, "sensitivity"));
            }
            "--smoothing" => {
                i += 1;
                params = params.with_freq_smoothing_bands(parse_usize(&args, i, "smoothing"));
            }
            "--attack" => {
                i += 1;
                params = params.with_attack_time(parse_f64(&args, i, "attack"));
            }
            "--release" => {
                i += 1;
                params = params.with_release_time(parse_f64(&args, i, "release"));
            }
            "--mode" | "-m" => {
                i += 1;
                params = params.with_mode(parse_mode(&args, i));
            }
            "--method" => {
                i += 1;
                params = params.with_method(parse_method(&args, i));
            }
            "--window-size" => {
                i += 1;
                params = params.with_window_size(parse_usize(&args, i, "window-size"));
            }
            "--steps" => {
                i += 1;
                params = params.with_steps_per_window(parse_usize(&args, i, "steps"));
            }
            "--window-pair" => {
                i += 1;
                params = params.with_window_pair(parse_window_pair(&args, i));
            }
            "--float" => format = WavSampleFormat::Float32,
            "--verbose" | "-v" => verbose = true,
            other => {
                eprintln!("ERROR: Unknown argument: {}", other);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let (noise_start, noise_end) = match (noise_start, noise_end) {
        (Some(t0), Some(t1)) => (t0, t1),
        _ => {
            eprintln!("ERROR: --noise-start and --noise-end are required");
            print_usage();
            std::process::exit(1);
        }
    };

    let buffer = match read_wav_file(input_path) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("ERROR: Failed to read {}: {}", input_path, e);
            std::process::exit(1);
        }
    };

    if verbose {
        eprintln!(
            "Input: {} frames, {} Hz, {:?}, {:.2}s",
            buffer.num_frames(),
            buffer.sample_rate,
            buffer.channels,
            buffer.duration_secs()
        );
        eprintln!(
            "Profile segment: {:.3}s .. {:.3}s; gain {} dB, sensitivity {}",
            noise_start, noise_end, params.noise_gain_db, params.sensitivity
        );
    }

    let mut reducer = match NoiseReducer::new(params) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = reducer.capture_profile(&buffer, noise_start, noise_end) {
        eprintln!("ERROR: Failed to capture noise profile: {}", e);
        std::process::exit(1);
    }
    if verbose {
        if let Some(profile) = reducer.profile() {
            eprintln!("Profile: {} windows", profile.total_windows());
        }
    }

    let output = match reducer.reduce(&buffer) {
        Ok(out) => out,
        Err(e) => {
            eprintln!("ERROR: Noise reduction failed: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = write_wav_file(output_path, &output, format) {
        eprintln!("ERROR: Failed to write {}: {}", output_path, e);
        std::process::exit(1);
    }

    eprintln!(
        "Wrote {} ({} frames, {:.2}s)",
        output_path,
        output.num_frames(),
        output.duration_secs()
    );
}

fn print_usage() {
    eprintln!("Usage: denoise <input.wav> <output.wav> --noise-start SECS --noise-end SECS [options]");
    eprintln!();
    eprintln!("The segment between --noise-start and --noise-end must contain only noise;");
    eprintln!("it is profiled and then the whole file is reduced against the profile.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --gain, -g DB          Suppression applied to noise bands (default 12)");
    eprintln!("  --sensitivity, -s N    Classification sensitivity (default 6)");
    eprintln!("  --smoothing BINS       Frequency smoothing half-width (default 3)");
    eprintln!("  --attack SECS          Attack time (default 0.02)");
    eprintln!("  --release SECS         Release time (default 0.10)");
    eprintln!("  --mode, -m MODE        reduce | isolate | residue (default reduce)");
    eprintln!("  --method NAME          second-greatest | median (default second-greatest)");
    eprintln!("  --window-size N        Analysis window in samples (default 2048)");
    eprintln!("  --steps N              Window starts per window length (default 4)");
    eprintln!("  --window-pair ID       Window pair 0..6 (default 2 = Hann/Hann)");
    eprintln!("  --float                Write 32-bit float output instead of 16-bit PCM");
    eprintln!("  --verbose, -v          Print processing details");
}

fn parse_f64(args: &[String], i: usize, name: &str) -> f64 {
    args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
        eprintln!("ERROR: Invalid or missing value for --{}", name);
        std::process::exit(1);
    })
}

fn parse_usize(args: &[String], i: usize, name: &str) -> usize {
    args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
        eprintln!("ERROR: Invalid or missing value for --{}", name);
        std::process::exit(1);
    })
}

fn parse_mode(args: &[String], i: usize) -> ReductionMode {
    match args.get(i).map(String::as_str) {
        Some("reduce") => ReductionMode::Reduce,
        Some("isolate") => ReductionMode::Isolate,
        Some("residue") => ReductionMode::Residue,
        other => {
            eprintln!(
                "ERROR: Unknown mode {:?} (expected reduce, isolate, or residue)",
                other.unwrap_or("")
            );
            std::process::exit(1);
        }
    }
}

fn parse_method(args: &[String], i: usize) -> ClassificationMethod {
    match args.get(i).map(String::as_str) {
        Some("second-greatest") => ClassificationMethod::SecondGreatest,
        Some("median") => ClassificationMethod::Median,
        other => {
            eprintln!(
                "ERROR: Unknown method {:?} (expected second-greatest or median)",
                other.unwrap_or("")
            );
            std::process::exit(1);
        }
    }
}

fn parse_window_pair(args: &[String], i: usize) -> WindowPairKind {
    let id: usize = parse_usize(args, i, "window-pair");
    *WindowPairKind::ALL.get(id).unwrap_or_else(|| {
        eprintln!("ERROR: Window pair id must be 0..6, got {}", id);
        std::process::exit(1);
    })
}
