#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use statemachine_http11::{Event, Response, ResponseDecoder};

#[derive(Arbitrary, Debug)]
struct Input {
    expect_no_body: bool,
    chunk_size: u8,
    data: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let mut decoder = ResponseDecoder::new();
    if input.expect_no_body {
        decoder.expect_no_body();
    }
    let mut events: Vec<Event<Response>> = Vec::new();
    for chunk in input.data.chunks(usize::from(input.chunk_size).max(1)) {
        decoder.feed(chunk, &mut events);
    }
    decoder.close(&mut events);

    // レスポンス側のデコード失敗はステータスを持たない
    for event in &events {
        if let Event::Fault(fault) = event {
            assert!(fault.status().is_none());
        }
    }
});
