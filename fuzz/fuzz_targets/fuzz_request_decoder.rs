#![no_main]

use libfuzzer_sys::fuzz_target;
use statemachine_http11::{Event, Request, RequestDecoder};

fuzz_target!(|data: &[u8]| {
    let mut decoder = RequestDecoder::new();
    let mut events: Vec<Event<Request>> = Vec::new();

    // データを一度に feed
    decoder.feed(data, &mut events);
    decoder.close(&mut events);

    // データを分割して feed (ストリーミングシナリオ)
    decoder.reset();
    let mut events: Vec<Event<Request>> = Vec::new();
    for chunk in data.chunks(17) {
        decoder.feed(chunk, &mut events);
    }
    decoder.close(&mut events);

    let faults = events
        .iter()
        .filter(|event| matches!(event, Event::Fault(_)))
        .count();
    assert!(faults <= 1);
});
