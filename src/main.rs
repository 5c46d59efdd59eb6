//! whois-overrides - WHOIS proxy overrides from the IANA registries
//!
//! Writes the generated section to stdout (or `--output`); progress goes to
//! stderr through `tracing`.

use std::env;
use std::io;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use whois_overrides::{
    types::{parse_number, Pipeline, ScrapeConfig},
    OverrideScraper, OverridesError, Result,
};

/// Parsed command line
#[derive(Debug, Default)]
struct CliOptions {
    pipeline: Option<Pipeline>,
    delay_ms: Option<u64>,
    timeout_secs: Option<u64>,
    output: Option<PathBuf>,
    help: bool,
}

#[tokio::main]
async fn main() {
    // Initialize the library
    if let Err(e) = whois_overrides::init() {
        eprintln!("Failed to initialize: {}", e);
        process::exit(1);
    }

    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{}", e.user_message());
            process::exit(2);
        }
    };

    if options.help {
        print_help();
        return;
    }

    let (config, output) = match build_config(options) {
        Ok(parts) => parts,
        Err(e) => {
            eprintln!("{}", e.user_message());
            process::exit(2);
        }
    };

    if let Err(e) = run(config, output).await {
        tracing::error!(kind = e.kind(), error = %e, "Aborting");
        eprintln!("{}", e.user_message());
        process::exit(1);
    }
}

/// Log to stderr so stdout only ever carries the document
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("whois_overrides=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn parse_args(args: &[String]) -> Result<CliOptions> {
    let mut options = CliOptions::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => options.help = true,
            "--delay-ms" => {
                let value = flag_value(&mut iter, arg)?;
                options.delay_ms = Some(parse_number(arg, value)?);
            }
            "--timeout-secs" => {
                let value = flag_value(&mut iter, arg)?;
                options.timeout_secs = Some(parse_number(arg, value)?);
            }
            "-o" | "--output" => {
                options.output = Some(PathBuf::from(flag_value(&mut iter, arg)?));
            }
            flag if flag.starts_with('-') => {
                return Err(OverridesError::config(format!("Unknown flag '{}'", flag)));
            }
            pipeline => {
                if options.pipeline.is_some() {
                    return Err(OverridesError::config("Only one pipeline may be given"));
                }
                options.pipeline = Some(pipeline.parse()?);
            }
        }
    }

    Ok(options)
}

fn flag_value<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str) -> Result<&'a str> {
    iter.next()
        .map(String::as_str)
        .ok_or_else(|| OverridesError::config(format!("{} needs a value", flag)))
}

/// Environment first, then command line flags on top
fn build_config(options: CliOptions) -> Result<(ScrapeConfig, Option<PathBuf>)> {
    let mut config = ScrapeConfig::from_env()?;

    if let Some(pipeline) = options.pipeline {
        config.pipeline = pipeline;
    }
    if let Some(ms) = options.delay_ms {
        config.request_delay = Duration::from_millis(ms);
    }
    if let Some(secs) = options.timeout_secs {
        config.timeout = Duration::from_secs(secs);
    }

    config.validate()?;
    Ok((config, options.output))
}

async fn run(config: ScrapeConfig, output: Option<PathBuf>) -> Result<()> {
    tracing::info!(
        version = whois_overrides::VERSION,
        pipeline = %config.pipeline,
        delay_ms = %config.request_delay.as_millis(),
        "Starting"
    );

    let scraper = OverrideScraper::new(config)?;
    let result = scraper.run().await?;

    match output {
        Some(path) => {
            result.document.write_to_path(&path)?;
            tracing::info!(path = %path.display(), "Wrote overrides");
        }
        None => result.document.write_to(&mut io::stdout().lock())?,
    }

    Ok(())
}

/// Print help information
fn print_help() {
    println!("whois-overrides {}", whois_overrides::VERSION);
    println!();
    println!("USAGE:");
    println!("    whois-overrides [zones|ipv4] [OPTIONS]");
    println!();
    println!("PIPELINES:");
    println!("    zones    Root zone database to an [overrides] section (default)");
    println!("    ipv4     IPv4 address space to bare prefix=server lines");
    println!();
    println!("OPTIONS:");
    println!("    --delay-ms <MS>        Pause before each zone detail fetch (default: 0)");
    println!("    --timeout-secs <S>     HTTP timeout per request (default: 30)");
    println!("    -o, --output <PATH>    Write to a file instead of stdout");
    println!("    -h, --help             Show this help");
    println!();
    println!("ENVIRONMENT VARIABLES:");
    println!("    WHOIS_OVERRIDES_ROOT_ZONE_DB    Root zone listing URL");
    println!("    WHOIS_OVERRIDES_IPV4_CSV        IPv4 address space CSV URL");
    println!("    WHOIS_OVERRIDES_DELAY_MS        Same as --delay-ms");
    println!("    WHOIS_OVERRIDES_TIMEOUT_SECS    Same as --timeout-secs");
    println!("    RUST_LOG                        Log filter (default: whois_overrides=info)");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        let options = parse_args(&args(&["ipv4", "--delay-ms", "250", "-o", "out.ini"])).unwrap();
        assert_eq!(options.pipeline, Some(Pipeline::Ipv4));
        assert_eq!(options.delay_ms, Some(250));
        assert_eq!(options.output, Some(PathBuf::from("out.ini")));
        assert!(!options.help);
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse_args(&args(&["--delay-ms"])).is_err());
        assert!(parse_args(&args(&["--verbose"])).is_err());
        assert!(parse_args(&args(&["zones", "ipv4"])).is_err());
        assert!(parse_args(&args(&["ipv6"])).is_err());
    }
}
