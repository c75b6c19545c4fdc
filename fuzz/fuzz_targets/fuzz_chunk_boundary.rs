#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use statemachine_http11::{Event, Request, RequestDecoder, StatusCode};

#[derive(Arbitrary, Debug)]
struct Input {
    splits: Vec<u16>,
    data: Vec<u8>,
}

/// デコード結果 (デコード失敗はステータスだけを比較する)
fn decode(chunks: &[&[u8]]) -> Vec<Result<Request, Option<StatusCode>>> {
    let mut decoder = RequestDecoder::new();
    let mut events = Vec::new();
    for chunk in chunks {
        decoder.feed(chunk, &mut events);
    }
    decoder.close(&mut events);
    events
        .into_iter()
        .map(|event| match event {
            Event::Message(request) => Ok(request),
            Event::Fault(fault) => Err(fault.status()),
        })
        .collect()
}

fuzz_target!(|input: Input| {
    let mut points: Vec<usize> = input
        .splits
        .iter()
        .map(|&p| usize::from(p) % (input.data.len() + 1))
        .collect();
    points.sort_unstable();

    let mut chunks = Vec::with_capacity(points.len() + 1);
    let mut start = 0;
    for point in points {
        chunks.push(&input.data[start..point]);
        start = point;
    }
    chunks.push(&input.data[start..]);

    // 分割位置によって結果が変わってはならない
    assert_eq!(decode(&chunks), decode(&[&input.data]));
});
