use criterion::{criterion_group, criterion_main, Criterion};
use gnss_stream::{
    checksum::FletcherChecksum,
    nmea::{encode_sentence, SourceMux},
    FrameDecoder, UbxDecoder,
};

const FRAMES: usize = 2801;

/// NAV-PVT frames separated by a few bytes of noise
fn ubx_stream() -> Vec<u8> {
    let mut data = Vec::new();
    for i in 0..FRAMES {
        let mut frame = vec![0xb5, 0x62, 0x01, 0x07, 92, 0];
        let mut payload = [0u8; 92];
        payload[23] = (i % 32) as u8;
        frame.extend_from_slice(&payload);
        let (ck_a, ck_b) = FletcherChecksum::compute(&frame[2..]);
        frame.extend_from_slice(&[ck_a, ck_b]);
        data.extend_from_slice(&frame);
        data.extend_from_slice(&[0x00, 0x24, 0x0d]);
    }
    data
}

fn nmea_stream() -> Vec<u8> {
    let mut data = Vec::new();
    for _ in 0..FRAMES / 4 {
        for body in [
            "GPGSV,2,1,08,02,28,259,33,04,12,212,27,05,34,305,30,09,41,101,40",
            "GPGSA,A,3,02,04,05,09,,,,,,,,,1.8,1.0,1.5",
            "GPGGA,202530.00,5109.0262,N,11401.8407,W,5,40,0.5,1097.36,M,-17.00,M,18,TSTR",
            "GPRMC,203522.00,A,5109.0262308,N,11401.8407342,W,0.004,133.4,130522,0.0,E,D",
        ] {
            data.extend_from_slice(encode_sentence(body).as_bytes());
        }
    }
    data
}

fn parse_all<D: FrameDecoder>(mut decoder: D, data: &[u8], chunk_size: usize) -> usize {
    let mut buf = Vec::with_capacity(chunk_size * 2);
    let mut count = 0;
    for chunk in data.chunks(chunk_size) {
        buf.extend_from_slice(chunk);
        count += decoder.drain(&mut buf);
    }
    count
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let data = ubx_stream();
    for chunk in &[99, 100, 101, 256, 512, 1000, 1024] {
        c.bench_function(&format!("ubx_drain_{}", chunk), |b| {
            b.iter(|| {
                assert_eq!(parse_all(UbxDecoder::default(), &data, *chunk), FRAMES);
            })
        });
    }

    let data = nmea_stream();
    for chunk in &[64, 512, 4096] {
        c.bench_function(&format!("nmea_mux_{}", chunk), |b| {
            b.iter(|| {
                let mut mux = SourceMux::default();
                let epochs: usize = data
                    .chunks(*chunk)
                    .map(|part| {
                        mux.push("bench", part)
                            .iter()
                            .filter(|r| r.epoch().is_some())
                            .count()
                    })
                    .sum();
                assert_eq!(epochs, FRAMES / 4);
            })
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
