#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use statemachine_http11::{DecoderConfig, DecoderLimits, Event, LineEnding, Request, RequestDecoder};

#[derive(Arbitrary, Debug)]
struct Input {
    max_token_size: u16,
    max_header_line_size: u16,
    max_headers_count: u8,
    max_body_size: u16,
    allow_bare_lf: bool,
    data: Vec<u8>,
}

fuzz_target!(|input: Input| {
    let limits = DecoderLimits {
        max_token_size: usize::from(input.max_token_size),
        max_header_line_size: usize::from(input.max_header_line_size),
        max_headers_count: usize::from(input.max_headers_count),
        max_body_size: usize::from(input.max_body_size),
    };
    let line_ending = if input.allow_bare_lf {
        LineEnding::AllowBareLf
    } else {
        LineEnding::Strict
    };
    let config = DecoderConfig::new().limits(limits.clone()).line_ending(line_ending);

    let mut decoder = RequestDecoder::with_config(config);
    let mut events: Vec<Event<Request>> = Vec::new();
    decoder.feed(&input.data, &mut events);

    for event in &events {
        if let Event::Message(request) = event {
            assert!(request.target.len() <= limits.max_token_size);
            assert!(request.headers.len() <= limits.max_headers_count);
            assert!(request.body.len() <= limits.max_body_size);
        }
    }
});
