use std::{env, fs, process};

use flux_embed::{FluxEmbedding, FluxRuntime, RuntimeConfig, embed::version};

fn main() {
    let args: Vec<String> = env::args().collect();
    let options = match parse_args(&args[1..]) {
        Some(options) => options,
        None => process::exit(2),
    };

    if options.help {
        print_help();
        return;
    }
    if options.version {
        println!("flux-embed {}", version::version_string());
        return;
    }
    if options.exprs.is_empty() && options.file.is_none() {
        print_help();
        return;
    }

    let mut config = match &options.config {
        Some(path) => match RuntimeConfig::load(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("Error: {}", err);
                process::exit(1);
            }
        },
        None => RuntimeConfig::default(),
    };
    if let Some(home) = &options.home {
        config.home_dir = home.into();
    }
    if let Some(image) = &options.image {
        config.image_file = Some(image.into());
    }
    if options.gc_threshold.is_some() {
        config.gc_threshold = options.gc_threshold;
    }
    config.trace |= options.trace;
    config.args = options.script_args.clone();

    let embedding = FluxEmbedding::new(FluxRuntime::new());
    if let Err(err) = embedding.initialize_with_config(config) {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
    if options.trace {
        if let Some(digest) = embedding.runtime().image_digest() {
            eprintln!("[embed] image sha256={}", digest);
        }
    }

    let mut failed = false;
    for expr in &options.exprs {
        failed |= !eval_and_print(&embedding, expr, true);
    }
    if let Some(path) = &options.file {
        match fs::read_to_string(path) {
            Ok(source) => failed |= !eval_and_print(&embedding, &source, false),
            Err(err) => {
                eprintln!("Error: cannot read {}: {}", path, err);
                failed = true;
            }
        }
    }

    if options.leak_detector {
        print_leak_stats(&embedding);
    }
    if failed {
        process::exit(1);
    }
}

#[derive(Default)]
struct Options {
    help: bool,
    version: bool,
    trace: bool,
    leak_detector: bool,
    home: Option<String>,
    image: Option<String>,
    config: Option<String>,
    gc_threshold: Option<usize>,
    exprs: Vec<String>,
    file: Option<String>,
    script_args: Vec<String>,
}

/// Options up to the first positional argument; that one names the script
/// and everything after it is passed through as `ARGS`.
fn parse_args(args: &[String]) -> Option<Options> {
    let mut options = Options::default();
    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        match arg {
            "-h" | "--help" => options.help = true,
            "-v" | "--version" => options.version = true,
            "--trace" => options.trace = true,
            "--leak-detector" => options.leak_detector = true,
            "--home" | "--image" | "--config" | "--gc-threshold" | "-e" => {
                let Some(value) = args.get(i + 1).cloned() else {
                    eprintln!("Usage: flux-embed {} <value>", arg);
                    return None;
                };
                i += 1;
                match arg {
                    "--home" => options.home = Some(value),
                    "--image" => options.image = Some(value),
                    "--config" => options.config = Some(value),
                    "-e" => options.exprs.push(value),
                    _ => match value.parse::<usize>() {
                        Ok(parsed) => options.gc_threshold = Some(parsed),
                        Err(_) => {
                            eprintln!("Error: --gc-threshold expects a non-negative integer.");
                            return None;
                        }
                    },
                }
            }
            "--" => {
                options.script_args = args[i + 1..].to_vec();
                break;
            }
            _ if arg.starts_with('-') => {
                eprintln!("Error: unknown option {}", arg);
                return None;
            }
            _ => {
                options.file = Some(arg.to_string());
                options.script_args = args[i + 1..].to_vec();
                break;
            }
        }
        i += 1;
    }
    Some(options)
}

/// Evaluates `source`, printing the value (when asked) or the exception.
/// Returns `false` when evaluation raised.
fn eval_and_print(embedding: &FluxEmbedding, source: &str, print_value: bool) -> bool {
    match embedding.try_evaluate(source) {
        Ok(value) => {
            if print_value && !value.is_nothing() {
                println!("{}", embedding.render(&value));
            }
            true
        }
        Err(err) => {
            eprintln!("ERROR: {}", embedding.render(&err.exception));
            false
        }
    }
}

fn print_leak_stats(embedding: &FluxEmbedding) {
    let stats = flux_embed::embed::leak_detector::snapshot();
    let runtime = embedding.runtime();
    println!(
        "\nLeak stats (approx):\n  frames_pushed: {}\n  frames_popped: {}\n  boundary_calls: {}\n  managed_errors: {}\n  gc_allocations: {}\n  heap_live: {}",
        stats.frames_pushed,
        stats.frames_popped,
        stats.boundary_calls,
        stats.managed_errors,
        stats.gc_allocations,
        runtime.heap_live_count()
    );
}

fn print_help() {
    println!(
        "\
flux-embed {}

Usage:
  flux-embed [options] -e <expr> [-e <expr> ...]
  flux-embed [options] <file> [args...]

Options:
  --home <dir>         Runtime install root (default: $FLUX_HOME or the binary's directory)
  --image <path>       System image, relative to the home directory
  --config <file>      Load runtime configuration from a JSON file
  --gc-threshold <n>   Allocations between collections
  --trace              Print one line per boundary call
  --leak-detector      Print boundary and heap counters after the run
  -e <expr>            Evaluate an expression and print its value (repeatable)
  -v, --version        Print the version
  -h, --help           Show this help message
",
        version::version_string()
    );
}
