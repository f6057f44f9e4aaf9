//! Command-line entry point: positional subcommands, no flag parsing.

use arxtag::config::Config;
use arxtag::pipeline::{run_predict, run_training};
use std::env;
use std::error::Error;

fn print_usage() {
    println!("Usage:");
    println!("  arxtag [COMMAND]\n");
    println!("Commands:");
    println!("  train              Train the tagger (saves fitted components to models/)");
    println!("  predict TEXT       Score a single text (requires a trained tagger)");
    println!("  help               Show this help\n");
    println!("Configuration is read from config.toml in the working directory;");
    println!("built-in defaults are used when the file is absent.");
}

fn load_config() -> Config {
    Config::load("config.toml").unwrap_or_else(|e| {
        eprintln!("Warning: could not load config.toml: {}", e);
        eprintln!("Using default configuration\n");
        Config::default()
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();
    let command = if args.len() > 1 {
        args[1].as_str()
    } else {
        "train"
    };

    match command {
        "train" => run_training(&load_config()),
        "predict" => {
            if args.len() < 3 {
                println!("Error: TEXT argument required\n");
                print_usage();
                return Ok(());
            }
            run_predict(&load_config(), &args[2])
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        _ => {
            println!("Unknown command: {}\n", command);
            print_usage();
            Ok(())
        }
    }
}
