//! Configuration for the bytestat binary.
//!
//! Handles parsing command-line arguments for the two run modes:
//! `serve` (aggregator) and `scan` (walk a directory and submit file
//! histograms). Every flag has a default, so `bytestat serve` and
//! `bytestat scan` work with no further arguments.

use std::path::PathBuf;

/// Default aggregator address, shared by both modes.
const DEFAULT_ADDR: &str = "127.0.0.1:3000";

/// What the process should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Run the aggregator.
    Serve {
        /// Address to listen on
        listen: String,

        /// Submission journal path (None = no journal)
        journal: Option<PathBuf>,
    },

    /// Walk a directory and submit per-file histograms.
    Scan {
        /// Aggregator address to dial
        server: String,

        /// Directory to walk
        dir: PathBuf,
    },
}

/// Complete configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub mode: Mode,
}

impl Config {
    /// Parse configuration from command-line arguments (without the
    /// program name).
    pub fn from_args(args: &[String]) -> Result<Self, String> {
        let (mode_name, rest) = args
            .split_first()
            .ok_or_else(|| "expected a mode: serve or scan".to_string())?;

        match mode_name.as_str() {
            "serve" => Self::parse_serve(rest),
            "scan" => Self::parse_scan(rest),
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            other => Err(format!("unknown mode: {other}")),
        }
    }

    fn parse_serve(args: &[String]) -> Result<Self, String> {
        let mut listen: Option<String> = None;
        let mut journal: Option<PathBuf> = None;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--listen" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--listen requires an address".to_string());
                    }
                    listen = Some(args[i].clone());
                }
                "--journal" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--journal requires a path".to_string());
                    }
                    journal = Some(PathBuf::from(&args[i]));
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                other => {
                    return Err(format!("unknown argument: {other}"));
                }
            }
            i += 1;
        }

        Ok(Config {
            mode: Mode::Serve {
                listen: listen.unwrap_or_else(|| DEFAULT_ADDR.to_string()),
                journal,
            },
        })
    }

    fn parse_scan(args: &[String]) -> Result<Self, String> {
        let mut server: Option<String> = None;
        let mut dir: Option<PathBuf> = None;

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--server" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--server requires an address".to_string());
                    }
                    server = Some(args[i].clone());
                }
                "--dir" => {
                    i += 1;
                    if i >= args.len() {
                        return Err("--dir requires a path".to_string());
                    }
                    dir = Some(PathBuf::from(&args[i]));
                }
                "--help" | "-h" => {
                    print_help();
                    std::process::exit(0);
                }
                other => {
                    return Err(format!("unknown argument: {other}"));
                }
            }
            i += 1;
        }

        Ok(Config {
            mode: Mode::Scan {
                server: server.unwrap_or_else(|| DEFAULT_ADDR.to_string()),
                dir: dir.unwrap_or_else(|| PathBuf::from("./")),
            },
        })
    }
}

fn print_help() {
    println!("bytestat: byte-frequency histogram aggregation over TCP");
    println!();
    println!("USAGE:");
    println!("    bytestat serve [OPTIONS]");
    println!("    bytestat scan [OPTIONS]");
    println!();
    println!("SERVE OPTIONS:");
    println!("    --listen <ADDR>     Listen address (default: {DEFAULT_ADDR})");
    println!("    --journal <PATH>    Append accepted submissions to a JSON-lines file");
    println!();
    println!("SCAN OPTIONS:");
    println!("    --server <ADDR>     Aggregator address (default: {DEFAULT_ADDR})");
    println!("    --dir <PATH>        Directory to walk (default: ./)");
    println!();
    println!("    --help, -h          Print this help");
    println!();
    println!("EXAMPLES:");
    println!("    bytestat serve --journal submissions.jsonl");
    println!("    bytestat scan --server 127.0.0.1:3000 --dir ./data");
    println!();
}
