use std::collections::HashMap;

use tracing::trace;

use super::{EpochBuilder, EpochSnapshot, NmeaParser, ParseOutcome};
use crate::{
    constants::{
        NMEA_ENCAPSULATION_CHAR, NMEA_END_CHAR_1, NMEA_END_CHAR_2, NMEA_MAX_NOISE_LEN,
        NMEA_MAX_RX_BUFFER, NMEA_MIN_SENTENCE_LEN, NMEA_SYNC_CHAR,
    },
    error::NmeaError,
};

/// Limits of a [`LineReframer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReframerConfig {
    /// Receive buffer cap, the oldest bytes are evicted beyond it
    pub max_buffer_len: usize,
    /// Without any `$`/`!` the buffer is discarded once longer than this
    pub max_noise_len: usize,
    /// Shorter candidate lines are dropped
    pub min_sentence_len: usize,
}

impl Default for ReframerConfig {
    fn default() -> Self {
        Self {
            max_buffer_len: NMEA_MAX_RX_BUFFER,
            max_noise_len: NMEA_MAX_NOISE_LEN,
            min_sentence_len: NMEA_MIN_SENTENCE_LEN,
        }
    }
}

/// Cuts an arbitrary chunked byte stream into candidate NMEA lines.
///
/// Candidates start at `$` or `!`, end at LF, and come out without their
/// CR/LF. Lines that are too short or contain anything but printable ASCII
/// are dropped, which keeps interleaved binary traffic out of the parser.
#[derive(Debug, Default)]
pub struct LineReframer {
    config: ReframerConfig,
    buf: Vec<u8>,
}

impl LineReframer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ReframerConfig) -> Self {
        Self {
            config,
            buf: Vec::new(),
        }
    }

    /// Bytes waiting for the end of a line
    pub fn buffered(&self) -> &[u8] {
        &self.buf
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Append `chunk` and return every complete candidate line
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);
        if self.buf.len() > self.config.max_buffer_len {
            let excess = self.buf.len() - self.config.max_buffer_len;
            self.buf.drain(..excess);
        }

        let mut lines = Vec::new();
        loop {
            let Some(start) = self
                .buf
                .iter()
                .position(|b| *b == NMEA_SYNC_CHAR || *b == NMEA_ENCAPSULATION_CHAR)
            else {
                if self.buf.len() > self.config.max_noise_len {
                    trace!(len = self.buf.len(), "no sentence start, dropping buffer");
                    self.buf.clear();
                }
                break;
            };
            if start > 0 {
                self.buf.drain(..start);
            }

            let Some(end) = self.buf.iter().skip(1).position(|b| *b == NMEA_END_CHAR_2) else {
                break;
            };
            let mut line: Vec<u8> = self.buf.drain(..=end + 1).collect();
            while matches!(line.last(), Some(&NMEA_END_CHAR_1) | Some(&NMEA_END_CHAR_2)) {
                line.pop();
            }

            if line.len() < self.config.min_sentence_len {
                continue;
            }
            if !line.iter().all(|b| (0x20..=0x7e).contains(b)) {
                trace!(len = line.len(), "dropping non printable line");
                continue;
            }
            // printable ASCII is valid UTF-8
            if let Ok(line) = String::from_utf8(line) {
                lines.push(line);
            }
        }
        lines
    }
}

/// Result of feeding one candidate line to a [`SourceMux`]
#[derive(Debug, Clone, PartialEq)]
pub struct LineResult {
    pub source: String,
    pub sentence: String,
    pub outcome: Result<ParseOutcome, NmeaError>,
}

impl LineResult {
    /// The epoch closed by this sentence, if any
    pub fn epoch(&self) -> Option<&EpochSnapshot> {
        match &self.outcome {
            Ok(ParseOutcome::EpochClosed(snapshot)) => Some(snapshot),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct SourceState {
    reframer: LineReframer,
    epoch: EpochBuilder,
}

/// NMEA decoding for several independent byte sources.
///
/// Every named source owns its own reframer buffer and epoch state, so bytes
/// and sentences of one source never mix with another's.
#[derive(Debug)]
pub struct SourceMux {
    parser: NmeaParser,
    config: ReframerConfig,
    ignore_checksum: bool,
    sources: HashMap<String, SourceState>,
}

impl Default for SourceMux {
    fn default() -> Self {
        Self::new(ReframerConfig::default())
    }
}

impl SourceMux {
    pub fn new(config: ReframerConfig) -> Self {
        Self {
            parser: NmeaParser::new(),
            config,
            ignore_checksum: false,
            sources: HashMap::new(),
        }
    }

    pub fn ignore_checksum(mut self, ignore: bool) -> Self {
        self.ignore_checksum = ignore;
        self
    }

    /// Feed a chunk received from `source` and parse every line it completes
    pub fn push(&mut self, source: &str, chunk: &[u8]) -> Vec<LineResult> {
        let config = self.config;
        let state = self
            .sources
            .entry(source.to_string())
            .or_insert_with(|| SourceState {
                reframer: LineReframer::with_config(config),
                epoch: EpochBuilder::new(),
            });

        state
            .reframer
            .push(chunk)
            .into_iter()
            .map(|sentence| {
                let outcome = self
                    .parser
                    .parse(&mut state.epoch, &sentence, self.ignore_checksum);
                LineResult {
                    source: source.to_string(),
                    sentence,
                    outcome,
                }
            })
            .collect()
    }

    /// Epoch under construction for `source`
    pub fn epoch(&self, source: &str) -> Option<&EpochBuilder> {
        self.sources.get(source).map(|state| &state.epoch)
    }

    /// Drop the buffer and epoch state of `source`
    pub fn remove(&mut self, source: &str) {
        self.sources.remove(source);
    }
}
