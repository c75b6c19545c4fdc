//! # statemachine_http11
//!
//! 合成可能なデコード状態で組み立てた HTTP/1.1 インクリメンタルデコーダー (Sans I/O)
//!
//! ## 特徴
//!
//! - **Sans I/O**: I/O を行わず、受信したチャンクを渡すだけ
//! - **チャンク境界に依存しない**: 入力をどこで分割しても同じメッセージ列になる
//! - **合成可能**: プリミティブ状態とステートマシンを入れ子にしてデコーダーを作る
//! - **パイプライン対応**: 1 つのチャンクに複数のメッセージがあってもすべて取り出す
//!
//! ## 使い方
//!
//! ### サーバー (リクエスト受信)
//!
//! ```rust
//! use statemachine_http11::{Event, HttpHead, Method, RequestDecoder, StatusCode};
//!
//! let mut decoder = RequestDecoder::new();
//! let mut events = Vec::new();
//! decoder.feed(b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n", &mut events);
//! decoder.feed(b"FOO / HTTP/1.1\r\n\r\n", &mut events);
//!
//! match &events[0] {
//!     Event::Message(request) => {
//!         assert_eq!(request.method, Method::Get);
//!         assert_eq!(request.get_header("host"), Some("example.com"));
//!     }
//!     Event::Fault(fault) => panic!("{fault}"),
//! }
//! // デコード失敗には応答すべきステータスが付いている
//! match &events[1] {
//!     Event::Fault(fault) => assert_eq!(fault.status(), Some(StatusCode::NotImplemented)),
//!     Event::Message(_) => panic!("expected fault"),
//! }
//! ```
//!
//! ### クライアント (レスポンス受信)
//!
//! ```rust
//! use statemachine_http11::{CloseOutcome, Event, ResponseDecoder};
//!
//! let mut decoder = ResponseDecoder::new();
//! let mut events = Vec::new();
//! decoder.feed(b"HTTP/1.0 200 OK\r\n\r\nhello", &mut events);
//! // Content-Length がない場合は接続クローズでボディが確定する
//! assert_eq!(decoder.close(&mut events), CloseOutcome::Completed);
//! assert!(matches!(&events[0], Event::Message(response) if response.body == b"hello"));
//! ```

mod config;
mod decoder;
mod error;
mod limits;
mod method;
mod request;
mod response;
mod status;
mod version;

pub use config::{DecoderConfig, LineEnding};
pub use decoder::{
    BodyKind, ByteCursor, CloseOutcome, Decoder, DecodingState, DecodingStateMachine, Event,
    HeaderLine, HeaderLineMachine, HeadersMachine, HttpHead, Machine, MessageSink, Primitive,
    Product, Progress, RequestDecoder, RequestLine, RequestLineDecoder, RequestLineMachine,
    RequestMachine, RequestPart, RequestPartOutput, ResponseDecoder, ResponseMachine,
    ResponsePart, ResponsePartOutput, StatusLine, StatusLineMachine, Terminator, TokenLimit,
    Transition, decode_request_lines, decode_requests, decode_responses, is_field_delimiter,
    is_line_end, is_linear_whitespace,
};
pub use error::DecodeFault;
pub use limits::DecoderLimits;
pub use method::Method;
pub use request::Request;
pub use response::Response;
pub use status::StatusCode;
pub use version::Version;
