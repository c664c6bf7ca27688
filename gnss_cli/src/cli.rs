use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{value_parser, Arg, ArgGroup, ArgMatches};

/// Where the byte stream comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
    Serial { port: String, baud: u32 },
    Tcp(String),
    Udp(u16),
}

/// Decoder to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Nmea,
    Ubx,
    Allystar,
    Goldfish,
    Rtcm3,
}

#[derive(Debug)]
pub struct Options {
    pub input: Input,
    pub protocol: Protocol,
    pub ignore_checksum: bool,
    pub json: bool,
    pub verbose: u8,
}

pub fn command() -> clap::Command {
    clap::Command::new("gnss-cli")
        .author(clap::crate_authors!())
        .version(clap::crate_version!())
        .about("Decodes a GNSS receiver or correction data stream and prints what it contains")
        .arg(
            Arg::new("file")
                .value_name("path")
                .short('f')
                .long("file")
                .value_parser(value_parser!(PathBuf))
                .help("Read a recorded stream from a file"),
        )
        .arg(
            Arg::new("serial")
                .value_name("port")
                .short('p')
                .long("serial")
                .help("Serial port to open"),
        )
        .arg(
            Arg::new("baud")
                .value_name("baud")
                .short('s')
                .long("baud")
                .default_value("9600")
                .value_parser(value_parser!(u32))
                .help("Baud rate of the serial port"),
        )
        .arg(
            Arg::new("tcp")
                .value_name("host:port")
                .long("tcp")
                .help("Connect to a TCP stream"),
        )
        .arg(
            Arg::new("udp")
                .value_name("port")
                .long("udp")
                .value_parser(value_parser!(u16))
                .help("Listen for UDP datagrams on a local port"),
        )
        .group(
            ArgGroup::new("input")
                .args(["file", "serial", "tcp", "udp"])
                .multiple(false),
        )
        .arg(
            Arg::new("protocol")
                .short('P')
                .long("protocol")
                .value_parser(["nmea", "ubx", "allystar", "goldfish", "rtcm3"])
                .default_value("nmea")
                .help("Protocol carried by the stream"),
        )
        .arg(
            Arg::new("ignore-checksum")
                .long("ignore-checksum")
                .action(clap::ArgAction::SetTrue)
                .help("Accept NMEA sentences whose checksum does not match"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(clap::ArgAction::SetTrue)
                .help("Print one JSON object per epoch or frame"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(clap::ArgAction::Count)
                .help("Increase log verbosity, overrides RUST_LOG"),
        )
}

pub fn parse(matches: &ArgMatches) -> Result<Options> {
    let input = if let Some(path) = matches.get_one::<PathBuf>("file") {
        Input::File(path.clone())
    } else if let Some(port) = matches.get_one::<String>("serial") {
        Input::Serial {
            port: port.clone(),
            baud: matches.get_one::<u32>("baud").copied().unwrap_or(9600),
        }
    } else if let Some(addr) = matches.get_one::<String>("tcp") {
        Input::Tcp(addr.clone())
    } else if let Some(port) = matches.get_one::<u16>("udp") {
        Input::Udp(*port)
    } else {
        Input::Stdin
    };

    let protocol = match matches.get_one::<String>("protocol").map(String::as_str) {
        Some("nmea") | None => Protocol::Nmea,
        Some("ubx") => Protocol::Ubx,
        Some("allystar") => Protocol::Allystar,
        Some("goldfish") => Protocol::Goldfish,
        Some("rtcm3") => Protocol::Rtcm3,
        Some(other) => bail!("unknown protocol '{}'", other),
    };

    Ok(Options {
        input,
        protocol,
        ignore_checksum: matches.get_flag("ignore-checksum"),
        json: matches.get_flag("json"),
        verbose: matches.get_count("verbose"),
    })
}
