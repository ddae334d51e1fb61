//! vaspout CLI - inspect hierarchical simulation output stores.

use std::env;
use std::error::Error as _;
use std::path::Path;
use std::process;

use serde_json::{json, Value};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use vaspout::raw::{EntryKind, File, Kind, OpenOptions};
use vaspout::{PlainOldDataType, Result};

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut level = None;
    let mut use_mmap = true;
    let mut json_mode = false;
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => level = Some("debug"),
            "-vv" | "--trace" => level = Some("trace"),
            "-q" | "--quiet" => level = Some("error"),
            "--no-mmap" => use_mmap = false,
            "-j" | "--json" => json_mode = true,
            _ => filtered_args.push(arg),
        }
    }
    init_logging(level);

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    let options = OpenOptions::new().mmap(use_mmap);
    let result = match filtered_args[0] {
        "info" | "i" => match filtered_args.get(1) {
            Some(locator) => cmd_info(locator, options, json_mode),
            None => usage_error("info <file>"),
        },
        "tree" | "t" => match filtered_args.get(1) {
            Some(locator) => cmd_tree(locator, options),
            None => usage_error("tree <file>"),
        },
        "dump" | "d" => match (filtered_args.get(1), filtered_args.get(2)) {
            (Some(locator), Some(path)) => cmd_dump(locator, path, options, json_mode),
            _ => usage_error("dump <file> <path> [--json]"),
        },
        "help" | "h" | "-h" | "--help" => {
            print_help();
            Ok(())
        }
        // Default: if the locator exists, show info; otherwise error
        other => {
            if Path::new(other).exists() {
                cmd_info(other, options, json_mode)
            } else {
                eprintln!("Unknown command: {}", other);
                eprintln!();
                print_help();
                process::exit(1);
            }
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        let mut source = e.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {}", cause);
            source = cause.source();
        }
        process::exit(1);
    }
}

/// `RUST_LOG` wins unless a verbosity flag was given.
fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(format!("vaspout={}", level)),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn usage_error(usage: &str) -> Result<()> {
    eprintln!("Error: missing argument");
    eprintln!("Usage: vaspout {}", usage);
    process::exit(1);
}

fn print_help() {
    println!("vaspout - inspect simulation output stores (VOUT5 format)");
    println!();
    println!("USAGE:");
    println!("    vaspout [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("COMMANDS:");
    println!("    i, info <file|dir>            Show version and which records are present");
    println!("    t, tree <file|dir>            Show the full group hierarchy");
    println!("    d, dump <file|dir> <path>     Print one dataset");
    println!("    h, help                       Show this help");
    println!();
    println!("OPTIONS:");
    println!("    -v, --verbose    Show debug output");
    println!("    -vv, --trace     Show trace output (very verbose)");
    println!("    -q, --quiet      Only show errors");
    println!("    -j, --json       JSON output for info and dump");
    println!("    --no-mmap        Read through a buffered file instead of a memory map");
    println!();
    println!("NOTES:");
    println!("    - Stores use the VOUT5 container format; HDF5 files are not readable");
    println!("    - A directory is resolved to {} inside it", File::DEFAULT_FILENAME);
    println!("    - Passing a file directly is equivalent to 'info'");
}

fn cmd_info(locator: &str, options: OpenOptions, json_mode: bool) -> Result<()> {
    info!("Opening store: {}", locator);
    let file = options.open(locator)?;
    let version = file.version()?;

    let mut kinds = Vec::new();
    for kind in Kind::ALL {
        let availability = kind.availability(&file)?;
        let variants: Vec<(&str, bool)> = availability
            .iter()
            .map(|(variant, record)| (variant.name(), record.is_some()))
            .collect();
        debug!("{}: {:?}", kind, variants);
        kinds.push((kind, variants));
    }

    if json_mode {
        let records: serde_json::Map<String, Value> = kinds
            .iter()
            .map(|(kind, variants)| {
                let variants: serde_json::Map<String, Value> = variants
                    .iter()
                    .map(|(name, present)| (name.to_string(), Value::Bool(*present)))
                    .collect();
                (kind.name().to_string(), Value::Object(variants))
            })
            .collect();
        let out = json!({
            "path": file.path().display().to_string(),
            "version": version.to_string(),
            "records": records,
        });
        println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
        return Ok(());
    }

    println!("Store: {}", file.path().display());
    println!("Version: {}", version);
    println!();
    println!("{:<12} {}", "Record", "Variants");
    for (kind, variants) in &kinds {
        let listed: Vec<String> = variants
            .iter()
            .map(|(name, present)| format!("{}={}", name, if *present { "yes" } else { "-" }))
            .collect();
        println!("{:<12} {}", kind.name(), listed.join("  "));
    }
    Ok(())
}

fn cmd_tree(locator: &str, options: OpenOptions) -> Result<()> {
    let file = options.open(locator)?;
    println!("{}", file.path().display());
    print_group(&file, "", 1)
}

fn print_group(file: &File, path: &str, depth: usize) -> Result<()> {
    let indent = "  ".repeat(depth);
    for entry in file.children(path)? {
        let child = if path.is_empty() {
            entry.name.clone()
        } else {
            format!("{}/{}", path, entry.name)
        };
        match &entry.kind {
            EntryKind::Group { .. } => {
                println!("{}{}/", indent, entry.name);
                print_group(file, &child, depth + 1)?;
            }
            EntryKind::Dataset { element_type, shape, compressed } => {
                println!(
                    "{}{}  {} {}{}",
                    indent,
                    entry.name,
                    element_type,
                    shape,
                    if *compressed { " (zlib)" } else { "" }
                );
            }
        }
    }
    Ok(())
}

fn cmd_dump(locator: &str, path: &str, options: OpenOptions, json_mode: bool) -> Result<()> {
    let file = options.open(locator)?;
    let probe = file.bind_array::<f64>(path);
    let element_type = match &probe {
        Ok(array) => array.element_type(),
        Err(_) => file.bind_array::<String>(path)?.element_type(),
    };

    let (shape, values) = if element_type == PlainOldDataType::String {
        let data = file.bind_array::<String>(path)?.read()?;
        let values: Vec<Value> = data.values().iter().map(|s| Value::from(s.as_str())).collect();
        (data.shape().clone(), values)
    } else if element_type.is_integer() || element_type == PlainOldDataType::Boolean {
        let data = file.bind_array::<i64>(path)?.read()?;
        let values: Vec<Value> = data.values().iter().map(|&v| Value::from(v)).collect();
        (data.shape().clone(), values)
    } else {
        let data = probe?.read()?;
        let values: Vec<Value> = data.values().iter().map(|&v| Value::from(v)).collect();
        (data.shape().clone(), values)
    };

    if json_mode {
        let out = json!({
            "path": path,
            "type": element_type.name(),
            "shape": shape.sizes(),
            "values": values,
        });
        println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
        return Ok(());
    }

    println!("{}  {} {}", path, element_type, shape);
    let row = if shape.rank() <= 1 { values.len().max(1) } else { shape.stride().max(1) };
    for chunk in values.chunks(row) {
        let line: Vec<String> = chunk.iter().map(|v| v.to_string()).collect();
        println!("  {}", line.join(" "));
    }
    Ok(())
}
