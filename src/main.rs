//! Rainwise IP-100 driver - command line
//!
//! Runs the poll loop against a configured station, or pokes at a station
//! or a captured document by hand.
//!
//! Usage:
//!   ip100                               # Poll forever using ip100.toml, one JSON packet per line
//!   ip100 --config /etc/ip100.toml      # Same, explicit config file
//!   ip100 --current                     # Poll once through the driver loop and print the packet
//!   ip100 --host 10.0.0.5 [--port 80]   # Fetch status.xml once and print the flat reading
//!   ip100 --test-parse status.xml       # Parse a captured document and print the flat reading
//!   ip100 --print-config                # Print a default configuration stanza
//!   ip100 --version

use argh::FromArgs;
use ip100_driver::config::{self, DEFAULT_CONFIG_PATH, DriverConfig};
use ip100_driver::driver::{DRIVER_VERSION, Ip100Driver};
use ip100_driver::ingest::{HttpStation, StationSource, parse_status};
use ip100_driver::model::{FlatReading, Packet};
use std::fs;
use std::process::ExitCode;

/// Rainwise IP-100 weather station driver
#[derive(FromArgs)]
struct Args {
    /// display driver version
    #[argh(switch)]
    version: bool,

    /// display diagnostic information while running
    #[argh(switch)]
    debug: bool,

    /// configuration file (default: ip100.toml)
    #[argh(option, default = "String::from(DEFAULT_CONFIG_PATH)")]
    config: String,

    /// hostname or ip address of the IP-100
    #[argh(option)]
    host: Option<String>,

    /// port on which the IP-100 is listening
    #[argh(option, default = "80")]
    port: u16,

    /// test the xml parsing on a captured status document
    #[argh(option)]
    test_parse: Option<String>,

    /// get the current weather conditions through the driver loop
    #[argh(switch)]
    current: bool,

    /// print a default configuration stanza
    #[argh(switch)]
    print_config: bool,
}

fn main() -> ExitCode {
    let args: Args = argh::from_env();

    if args.version {
        println!("ip100 driver version {}", DRIVER_VERSION);
        return ExitCode::SUCCESS;
    }

    let level = if args.debug { "debug" } else { "info" };
    env_logger::init_from_env(env_logger::Env::default().default_filter_or(level));

    let result = if args.print_config {
        print!("{}", config::default_stanza());
        Ok(())
    } else if let Some(filename) = &args.test_parse {
        test_parse(filename)
    } else if let Some(host) = &args.host {
        fetch_and_print(host, args.port, args.debug)
    } else if args.current {
        load(&args.config).and_then(show_current)
    } else {
        load(&args.config).and_then(run)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn load(path: &str) -> CliResult<DriverConfig> {
    Ok(config::load_config(path)?)
}

fn test_parse(filename: &str) -> CliResult<()> {
    let data = fs::read(filename)?;
    print_reading(&parse_status(&data))
}

fn fetch_and_print(host: &str, port: u16, debug: bool) -> CliResult<()> {
    let url = config::status_url(host, port);
    println!("get data from {}", url);

    let data = HttpStation::new(url).fetch()?;
    if debug {
        println!("data: {}", String::from_utf8_lossy(&data));
    }
    print!("packet: ");
    print_reading(&parse_status(&data))
}

fn show_current(config: DriverConfig) -> CliResult<()> {
    let mut driver = Ip100Driver::new(config);
    driver.probe()?;

    if let Some(item) = driver.loop_packets().next() {
        print_packet(&item?)?;
    }
    Ok(())
}

fn run(config: DriverConfig) -> CliResult<()> {
    let mut driver = Ip100Driver::new(config);
    driver.probe()?;

    for item in driver.loop_packets() {
        print_packet(&item?)?;
    }
    Ok(())
}

fn print_reading(reading: &FlatReading) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(reading)?);
    Ok(())
}

fn print_packet(packet: &Packet) -> CliResult<()> {
    println!("{}", serde_json::to_string(packet)?);
    Ok(())
}
