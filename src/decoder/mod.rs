//! HTTP/1.1 デコーダーモジュール
//!
//! 小さなデコード状態を組み合わせてメッセージデコーダーを作る。
//!
//! - [`Primitive`]: 終端バイトまで読む、空白を読み飛ばす、CRLF を照合する、などの最小単位
//! - [`DecodingStateMachine`]: 子状態を [`Machine`] の遷移関数でつないだ状態 (入れ子可能)
//! - [`Decoder`]: チャンクを受け取り、完了したメッセージを [`MessageSink`] に渡す
//!
//! ## 使い方
//!
//! ```rust
//! use statemachine_http11::{Event, Method, RequestDecoder};
//!
//! let mut decoder = RequestDecoder::new();
//! let mut events = Vec::new();
//!
//! // 任意の位置で分割されたチャンクを順に渡す
//! decoder.feed(b"POST /upload HTTP/1.1\r\nContent-Le", &mut events);
//! decoder.feed(b"ngth: 5\r\n\r\nhel", &mut events);
//! assert!(events.is_empty());
//! decoder.feed(b"lo", &mut events);
//!
//! let [Event::Message(request)] = events.as_slice() else {
//!     panic!("unexpected events: {events:?}");
//! };
//! assert_eq!(request.method, Method::Post);
//! assert_eq!(request.body, b"hello");
//! ```

mod body;
mod cursor;
mod driver;
mod head;
mod headers;
mod machine;
mod primitive;
mod request;
mod request_line;
mod response;
mod state;
mod status_line;

pub use body::BodyKind;
pub use cursor::ByteCursor;
pub use driver::{
    CloseOutcome, Decoder, Event, MessageSink, RequestDecoder, RequestLineDecoder,
    ResponseDecoder, decode_request_lines, decode_requests, decode_responses,
};
pub use head::{HttpHead, RequestLine, StatusLine};
pub use headers::{HeaderLine, HeaderLineMachine, HeadersMachine};
pub use machine::{DecodingStateMachine, Machine, Transition};
pub use primitive::{
    Primitive, Product, Terminator, TokenLimit, is_field_delimiter, is_line_end,
    is_linear_whitespace,
};
pub use request::{RequestMachine, RequestPart, RequestPartOutput};
pub use request_line::RequestLineMachine;
pub use response::{ResponseMachine, ResponsePart, ResponsePartOutput};
pub use state::{DecodingState, Progress};
pub use status_line::StatusLineMachine;
