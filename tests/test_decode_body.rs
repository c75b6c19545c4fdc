//! ボディデコードのテスト
//!
//! 不完全なボディ (接続切断シナリオ) でメッセージが完了しないことを確認する。
//!
//! デコーダーはデータ不足では何も通知しない。接続が切れた場合にアプリケーションが
//! [`Decoder::close`] を呼び、[`CloseOutcome`] で途中のメッセージが破棄されたかを知る。
//!
//! [`Decoder::close`]: statemachine_http11::Decoder::close

use statemachine_http11::{
    CloseOutcome, DecoderConfig, DecoderLimits, Event, HttpHead, Request, RequestDecoder,
    Response, ResponseDecoder, StatusCode,
};

fn messages<T: Clone>(events: &[Event<T>]) -> Vec<T> {
    events
        .iter()
        .map(|event| match event {
            Event::Message(message) => message.clone(),
            Event::Fault(fault) => panic!("unexpected fault: {fault}"),
        })
        .collect()
}

/// 不完全な Content-Length リクエストボディのテスト
///
/// クライアントが途中で切断した場合、メッセージは通知されずに破棄される。
#[test]
fn incomplete_content_length_body() {
    let mut decoder = RequestDecoder::new();
    let mut events: Vec<Event<Request>> = Vec::new();
    decoder.feed(
        b"POST / HTTP/1.1\r\nHost: example.com\r\nContent-Length: 100\r\n\r\n",
        &mut events,
    );
    decoder.feed(&[0u8; 50], &mut events); // 100 バイト中 50 バイトのみ

    assert!(events.is_empty());
    assert!(!decoder.is_idle());
    assert_eq!(decoder.close(&mut events), CloseOutcome::Discarded);
    assert!(events.is_empty());
}

/// 完全な Content-Length リクエストボディのテスト (正常系)
#[test]
fn complete_content_length_body() {
    let mut decoder = RequestDecoder::new();
    let mut events = Vec::new();
    decoder.feed(
        b"POST / HTTP/1.1\r\nHost: example.com\r\nContent-Length: 5\r\n\r\nhello",
        &mut events,
    );

    let requests = messages(&events);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].body, b"hello");
    assert_eq!(requests[0].content_length(), Some(5));
    assert!(decoder.is_idle());
}

/// ボディを 1 バイトずつ渡しても同じ結果になる
#[test]
fn content_length_body_byte_by_byte() {
    let input = b"PUT /data HTTP/1.1\r\nContent-Length: 11\r\n\r\nhello world";
    let mut decoder = RequestDecoder::new();
    let mut events = Vec::new();
    for byte in input {
        decoder.feed(std::slice::from_ref(byte), &mut events);
    }
    let requests = messages(&events);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].body, b"hello world");
}

/// Content-Length: 0 はボディなし
#[test]
fn zero_content_length() {
    let mut decoder = RequestDecoder::new();
    let mut events = Vec::new();
    decoder.feed(
        b"POST / HTTP/1.1\r\nContent-Length: 0\r\n\r\nGET / HTTP/1.1\r\n\r\n",
        &mut events,
    );
    let requests = messages(&events);
    assert_eq!(requests.len(), 2);
    assert!(requests[0].body.is_empty());
}

/// ボディの直後のバイトは次のリクエストとして扱う
#[test]
fn body_followed_by_next_request() {
    let mut decoder = RequestDecoder::new();
    let mut events = Vec::new();
    decoder.feed(
        b"POST /a HTTP/1.1\r\nContent-Length: 3\r\n\r\nabcGET /b HTTP/1.1\r\n\r\n",
        &mut events,
    );
    let requests = messages(&events);
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].body, b"abc");
    assert_eq!(requests[1].target, "/b");
    assert!(requests[1].body.is_empty());
}

/// Content-Length が制限を超える場合は 413
#[test]
fn content_length_over_limit() {
    let config = DecoderConfig::new().limits(DecoderLimits {
        max_body_size: 10,
        ..DecoderLimits::default()
    });
    let mut decoder = RequestDecoder::with_config(config);
    let mut events: Vec<Event<Request>> = Vec::new();
    decoder.feed(b"POST / HTTP/1.1\r\nContent-Length: 11\r\n\r\n", &mut events);
    let [Event::Fault(fault)] = events.as_slice() else {
        panic!("expected fault: {events:?}");
    };
    assert_eq!(fault.status(), Some(StatusCode::ContentTooLarge));
}

/// Transfer-Encoding は 501 で拒否する
#[test]
fn transfer_encoding_request_rejected() {
    let mut decoder = RequestDecoder::new();
    let mut events: Vec<Event<Request>> = Vec::new();
    decoder.feed(
        b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n0\r\n\r\n",
        &mut events,
    );
    let [Event::Fault(fault)] = events.as_slice() else {
        panic!("expected fault: {events:?}");
    };
    assert_eq!(fault.status(), Some(StatusCode::NotImplemented));
}

/// 不完全な close-delimited レスポンスのテスト
///
/// Content-Length がないレスポンスは接続クローズでボディが確定する。
#[test]
fn close_delimited_response_body() {
    let mut decoder = ResponseDecoder::new();
    let mut events: Vec<Event<Response>> = Vec::new();
    decoder.feed(b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\n", &mut events);
    decoder.feed(b"hello ", &mut events);
    decoder.feed(b"world", &mut events);
    assert!(events.is_empty());

    assert_eq!(decoder.close(&mut events), CloseOutcome::Completed);
    let responses = messages(&events);
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].body, b"hello world");
    assert_eq!(responses[0].get_header("content-type"), Some("text/plain"));
}

/// ボディが空の close-delimited レスポンス
#[test]
fn close_delimited_empty_body() {
    let mut decoder = ResponseDecoder::new();
    let mut events = Vec::new();
    decoder.feed(b"HTTP/1.0 200 OK\r\n\r\n", &mut events);
    assert_eq!(decoder.close(&mut events), CloseOutcome::Completed);
    let responses = messages(&events);
    assert!(responses[0].body.is_empty());
}

/// 不完全な Content-Length レスポンスは破棄する
#[test]
fn incomplete_content_length_response() {
    let mut decoder = ResponseDecoder::new();
    let mut events: Vec<Event<Response>> = Vec::new();
    decoder.feed(b"HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\nhello", &mut events);
    assert_eq!(decoder.close(&mut events), CloseOutcome::Discarded);
    assert!(events.is_empty());
}

/// 1xx / 204 / 304 はボディなし
#[test]
fn response_without_body() {
    let mut decoder = ResponseDecoder::new();
    let mut events = Vec::new();
    decoder.feed(
        b"HTTP/1.1 100 Continue\r\n\r\nHTTP/1.1 204 No Content\r\n\r\nHTTP/1.1 304 Not Modified\r\nContent-Length: 10\r\n\r\n",
        &mut events,
    );
    let responses = messages(&events);
    let codes: Vec<u16> = responses.iter().map(|r| r.status_code).collect();
    assert_eq!(codes, [100, 204, 304]);
    assert!(responses.iter().all(|r| r.body.is_empty()));
    assert!(responses[0].is_informational());
    assert!(responses[1].is_success());
}

/// HEAD リクエストへのレスポンスは Content-Length があってもボディなし
#[test]
fn head_response() {
    let mut decoder = ResponseDecoder::new();
    let mut events = Vec::new();
    decoder.expect_no_body();
    decoder.feed(
        b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nHTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhello",
        &mut events,
    );
    let responses = messages(&events);
    assert_eq!(responses.len(), 2);
    assert!(responses[0].body.is_empty());
    // expect_no_body は 1 レスポンスで解除される
    assert_eq!(responses[1].body, b"hello");
}

/// HEAD リクエストへの 100 Continue の後も、最終レスポンスはボディなし
#[test]
fn head_response_after_interim() {
    let mut decoder = ResponseDecoder::new();
    let mut events = Vec::new();
    decoder.expect_no_body();
    decoder.feed(
        b"HTTP/1.1 100 Continue\r\n\r\nHTTP/1.1 200 OK\r\nContent-Length: 3\r\n\r\n",
        &mut events,
    );
    let responses = messages(&events);
    let codes: Vec<u16> = responses.iter().map(|r| r.status_code).collect();
    assert_eq!(codes, [100, 200]);
    assert!(responses[1].body.is_empty());
    assert!(decoder.is_idle());

    // 最終レスポンスで解除される
    decoder.feed(b"HTTP/1.1 200 OK\r\nContent-Length: 3\r\n\r\nabc", &mut events);
    let responses = messages(&events);
    assert_eq!(responses.len(), 3);
    assert_eq!(responses[2].body, b"abc");
}

/// レスポンス側のデコード失敗はステータスを持たない
#[test]
fn response_fault_has_no_status() {
    let mut decoder = ResponseDecoder::new();
    let mut events: Vec<Event<Response>> = Vec::new();
    decoder.feed(
        b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n",
        &mut events,
    );
    let [Event::Fault(fault)] = events.as_slice() else {
        panic!("expected fault: {events:?}");
    };
    assert_eq!(fault.status(), None);

    let mut decoder = ResponseDecoder::new();
    let mut events: Vec<Event<Response>> = Vec::new();
    decoder.feed(b"HTTP/1.1 200 OK\r\nContent-Length: x\r\n\r\n", &mut events);
    let [Event::Fault(fault)] = events.as_slice() else {
        panic!("expected fault: {events:?}");
    };
    assert_eq!(fault.status(), None);
}
