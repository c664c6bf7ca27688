use std::{
    fs::File,
    io::{self, Read},
    net::{TcpStream, UdpSocket},
    time::Duration,
};

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::Input;

const SERIAL_TIMEOUT: Duration = Duration::from_millis(100);

/// Reads datagrams as if they were one continuous stream
struct UdpReader(UdpSocket);

impl Read for UdpReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.recv(buf)
    }
}

/// An opened byte source and the label its NMEA state is kept under
pub struct Source {
    pub label: String,
    reader: Box<dyn Read>,
    /// Zero byte reads only mean "nothing yet" on a serial port
    live: bool,
}

impl Source {
    pub fn open(input: &Input) -> Result<Self> {
        let (label, reader, live): (String, Box<dyn Read>, bool) = match input {
            Input::Stdin => ("stdin".into(), Box::new(io::stdin()), false),
            Input::File(path) => {
                let file = File::open(path)
                    .with_context(|| format!("Failed to open file {}", path.display()))?;
                (path.display().to_string(), Box::new(file), false)
            },
            Input::Serial { port, baud } => {
                let serial = serialport::new(port, *baud)
                    .timeout(SERIAL_TIMEOUT)
                    .open()
                    .with_context(|| format!("Failed to open \"{}\" serial port", port))?;
                (port.clone(), Box::new(serial), true)
            },
            Input::Tcp(addr) => {
                let stream = TcpStream::connect(addr)
                    .with_context(|| format!("Failed to connect to {}", addr))?;
                (addr.clone(), Box::new(stream), false)
            },
            Input::Udp(port) => {
                let socket = UdpSocket::bind(("0.0.0.0", *port))
                    .with_context(|| format!("Failed to bind UDP port {}", port))?;
                (format!("udp:{}", port), Box::new(UdpReader(socket)), true)
            },
        };
        info!(source = %label, "opened");
        Ok(Self {
            label,
            reader,
            live,
        })
    }

    /// Read the next chunk. `None` at end of stream, `Some(0)` when a live
    /// source had nothing to deliver.
    pub fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<Option<usize>> {
        match self.reader.read(buf) {
            Ok(0) if !self.live => Ok(None),
            Ok(n) => Ok(Some(n)),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(Some(0)),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(Some(0)),
            Err(e) => Err(e),
        }
    }
}
