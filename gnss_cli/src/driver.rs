use std::io::Write;

use anyhow::Result;
use gnss_stream::{
    nmea::{ReframerConfig, SourceMux},
    AllystarDecoder, EpochSnapshot, FrameDecoder, FrameStatus, GoldfishDecoder, MessageStats,
    ParseOutcome, Rtcm3Decoder, UbxDecoder,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cli::{Options, Protocol};

enum Decoder {
    Nmea(SourceMux),
    Ubx(UbxDecoder),
    Allystar(AllystarDecoder),
    Goldfish(GoldfishDecoder),
    Rtcm3(Rtcm3Decoder),
}

/// Feeds chunks to the selected decoder and prints what comes out
pub struct Driver<W: Write> {
    decoder: Decoder,
    buf: Vec<u8>,
    json: bool,
    out: W,
    epochs: u32,
    rejected: u32,
}

impl<W: Write> Driver<W> {
    pub fn new(options: &Options, out: W) -> Self {
        let decoder = match options.protocol {
            Protocol::Nmea => Decoder::Nmea(
                SourceMux::new(ReframerConfig::default()).ignore_checksum(options.ignore_checksum),
            ),
            Protocol::Ubx => Decoder::Ubx(UbxDecoder::default()),
            Protocol::Allystar => Decoder::Allystar(AllystarDecoder::default()),
            Protocol::Goldfish => Decoder::Goldfish(GoldfishDecoder::new()),
            Protocol::Rtcm3 => Decoder::Rtcm3(Rtcm3Decoder::new()),
        };
        Self {
            decoder,
            buf: Vec::new(),
            json: options.json,
            out,
            epochs: 0,
            rejected: 0,
        }
    }

    pub fn push(&mut self, source: &str, chunk: &[u8]) -> Result<()> {
        match &mut self.decoder {
            Decoder::Nmea(mux) => {
                for line in mux.push(source, chunk) {
                    match line.outcome {
                        Ok(ParseOutcome::EpochClosed(snapshot)) => {
                            self.epochs += 1;
                            print_epoch(&mut self.out, self.json, &snapshot)?;
                        },
                        Ok(_) => {},
                        Err(e) if e.is_unsupported() => debug!(sentence = %line.sentence, "{}", e),
                        Err(e) => {
                            self.rejected += 1;
                            warn!(sentence = %line.sentence, "{}", e);
                        },
                    }
                }
                Ok(())
            },
            Decoder::Ubx(decoder) => {
                let (out, json) = (&mut self.out, self.json);
                self.rejected += feed(decoder, &mut self.buf, chunk, |d| match d.last_frame() {
                    Some(frame) if json => print_json(out, frame),
                    Some(frame) => writeln!(
                        out,
                        "UBX {} len={}{}",
                        frame.message_name,
                        frame.length,
                        summary(&frame.message)
                    )
                    .map_err(Into::into),
                    None => Ok(()),
                })?;
                Ok(())
            },
            Decoder::Allystar(decoder) => {
                let (out, json) = (&mut self.out, self.json);
                self.rejected += feed(decoder, &mut self.buf, chunk, |d| match d.last_frame() {
                    Some(frame) if json => print_json(out, frame),
                    Some(frame) => {
                        writeln!(out, "ALLYSTAR {} len={}", frame.message_name, frame.length)
                            .map_err(Into::into)
                    },
                    None => Ok(()),
                })?;
                Ok(())
            },
            Decoder::Goldfish(decoder) => {
                let (out, json) = (&mut self.out, self.json);
                self.rejected += feed(decoder, &mut self.buf, chunk, |d| match d.last_frame() {
                    Some(frame) if json => print_json(out, frame),
                    Some(frame) => {
                        writeln!(out, "{} len={}", frame.name, frame.length).map_err(Into::into)
                    },
                    None => Ok(()),
                })?;
                Ok(())
            },
            Decoder::Rtcm3(decoder) => {
                let (out, json) = (&mut self.out, self.json);
                self.rejected += feed(decoder, &mut self.buf, chunk, |d| match d.last_frame() {
                    Some(frame) if json => print_json(out, frame),
                    Some(frame) => writeln!(
                        out,
                        "RTCM3 {} ({}) station={} len={}{}",
                        frame.message_type,
                        frame.name,
                        frame.station_id,
                        frame.length,
                        summary(&frame.message)
                    )
                    .map_err(Into::into),
                    None => Ok(()),
                })?;
                Ok(())
            },
        }
    }

    /// Log the counters gathered so far
    pub fn report(&self) {
        match &self.decoder {
            Decoder::Nmea(_) => info!(epochs = self.epochs, rejected = self.rejected, "NMEA"),
            Decoder::Ubx(d) => report_stats("UBX", d.stats(), self.rejected),
            Decoder::Allystar(d) => report_stats("Allystar", d.stats(), self.rejected),
            Decoder::Goldfish(d) => report_stats("Goldfish", d.stats(), self.rejected),
            Decoder::Rtcm3(d) => report_stats("RTCM3", d.stats(), self.rejected),
        }
    }
}

/// Buffer `chunk` and decode every complete frame, calling `on_valid` after
/// each accepted one. Returns the number of rejected frames.
fn feed<D, F>(decoder: &mut D, buf: &mut Vec<u8>, chunk: &[u8], mut on_valid: F) -> Result<u32>
where
    D: FrameDecoder,
    F: FnMut(&D) -> Result<()>,
{
    buf.extend_from_slice(chunk);
    let mut rejected = 0;
    while !buf.is_empty() {
        let decoded = decoder.decode(buf);
        match decoded.status {
            FrameStatus::Valid => on_valid(decoder)?,
            FrameStatus::Rejected(_) => rejected += 1,
            _ => {},
        }
        if decoded.consumed == 0 {
            break;
        }
        buf.drain(..decoded.consumed);
    }
    Ok(rejected)
}

fn summary<T: std::fmt::Debug>(message: &Option<T>) -> String {
    match message {
        Some(message) => format!(" {:?}", message),
        None => String::new(),
    }
}

fn print_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn print_epoch<W: Write>(out: &mut W, json: bool, snapshot: &EpochSnapshot) -> Result<()> {
    if json {
        return print_json(out, snapshot);
    }
    let position = &snapshot.position;
    let used = snapshot.satellites.iter().filter(|s| s.used).count();
    let utc = position
        .utc()
        .map_or_else(|| "--".to_string(), |utc| utc.to_rfc3339());
    writeln!(
        out,
        "{} status={} lat={:.8} lon={:.8} alt={:.2} quality={} sats={}/{} hdop={:.1}",
        utc,
        position.status.unwrap_or('-'),
        position.latitude,
        position.longitude,
        position.altitude,
        position.quality,
        used,
        snapshot.satellites.len(),
        position.hdop,
    )?;
    Ok(())
}

fn report_stats(protocol: &str, stats: &MessageStats<u16>, rejected: u32) {
    info!(protocol, total = stats.total(), rejected, "frames accepted");
    for (key, count) in stats.iter() {
        info!(protocol, id = %format!("0x{:04x}", key), count);
    }
}
