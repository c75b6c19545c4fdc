//! リクエストラインデコーダー
//!
//! ```text
//! request-line = method SP request-target SP HTTP-version CRLF
//! ```
//!
//! SP は 1 つ以上の SP / HTAB を許容し、まとめて読み飛ばす。
//! 各フィールドの区切り (SP / HTAB / CR / LF) は消費せず次の状態に渡すため、
//! バージョン直後の CR は CRLF 状態が確認する。

use log::trace;

use crate::config::{DecoderConfig, LineEnding};
use crate::error::DecodeFault;
use crate::method::Method;
use crate::status::StatusCode;
use crate::version::Version;

use super::head::RequestLine;
use super::machine::{Machine, Transition};
use super::primitive::{Primitive, Product, TokenLimit, is_field_delimiter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    ReadMethod,
    AfterMethod,
    ReadTarget,
    AfterTarget,
    ReadVersion,
    AfterVersion,
    Finish,
}

/// リクエストラインのステートマシン
#[derive(Debug)]
pub struct RequestLineMachine {
    max_token_size: usize,
    line_ending: LineEnding,
    step: Step,
    method: Option<Method>,
    target: Option<String>,
    version: Option<Version>,
}

impl RequestLineMachine {
    pub fn new(config: &DecoderConfig) -> Self {
        Self {
            max_token_size: config.limits.max_token_size,
            line_ending: config.line_ending,
            step: Step::ReadMethod,
            method: None,
            target: None,
            version: None,
        }
    }

    fn enter(&mut self, step: Step) -> Primitive {
        self.step = step;
        match step {
            Step::ReadMethod => Primitive::consume_until(is_field_delimiter).with_limit(
                TokenLimit::new("method", self.max_token_size, StatusCode::NotImplemented),
            ),
            Step::ReadTarget => Primitive::consume_until(is_field_delimiter).with_limit(
                TokenLimit::new("request-target", self.max_token_size, StatusCode::UriTooLong),
            ),
            Step::ReadVersion => Primitive::consume_until(is_field_delimiter).with_limit(
                TokenLimit::new(
                    "HTTP version",
                    self.max_token_size,
                    StatusCode::HttpVersionNotSupported,
                ),
            ),
            Step::AfterMethod | Step::AfterTarget | Step::AfterVersion => {
                Primitive::skip_linear_whitespace()
            }
            Step::Finish => Primitive::crlf(self.line_ending),
        }
    }
}

impl Machine for RequestLineMachine {
    type State = Primitive;
    type Output = RequestLine;

    fn init(&mut self) -> Primitive {
        self.enter(Step::ReadMethod)
    }

    fn transition(
        &mut self,
        product: Product,
    ) -> Result<Transition<Primitive, RequestLine>, DecodeFault> {
        let next = match self.step {
            Step::ReadMethod => {
                let token = product.into_token();
                let method = Method::from_bytes(&token).ok_or_else(|| {
                    DecodeFault::unsupported("method", &token, StatusCode::NotImplemented)
                })?;
                trace!("request line: method {method}");
                self.method = Some(method);
                Step::AfterMethod
            }
            Step::AfterMethod => Step::ReadTarget,
            Step::ReadTarget => {
                let target = parse_request_target(product.into_token())?;
                trace!("request line: target {target}");
                self.target = Some(target);
                Step::AfterTarget
            }
            Step::AfterTarget => Step::ReadVersion,
            Step::ReadVersion => {
                let token = product.into_token();
                if token.is_empty() {
                    return Err(DecodeFault::bad_request(
                        "invalid request line: missing HTTP version",
                    ));
                }
                let version = Version::from_bytes(&token).ok_or_else(|| {
                    DecodeFault::unsupported(
                        "HTTP version",
                        &token,
                        StatusCode::HttpVersionNotSupported,
                    )
                })?;
                trace!("request line: version {version}");
                self.version = Some(version);
                Step::AfterVersion
            }
            Step::AfterVersion => Step::Finish,
            Step::Finish => {
                if !product.matched() {
                    return Err(DecodeFault::bad_request(
                        "expected CRLF at end of request line",
                    ));
                }
                let line = RequestLine {
                    method: self.method.take().ok_or_else(|| {
                        DecodeFault::bad_request("invalid request line: missing method")
                    })?,
                    target: self.target.take().ok_or_else(|| {
                        DecodeFault::bad_request("invalid request line: missing request-target")
                    })?,
                    version: self.version.take().ok_or_else(|| {
                        DecodeFault::bad_request("invalid request line: missing HTTP version")
                    })?,
                };
                return Ok(Transition::Done(line));
            }
        };
        Ok(Transition::Next(self.enter(next)))
    }

    fn destroy(&mut self) {
        self.step = Step::ReadMethod;
        self.method = None;
        self.target = None;
        self.version = None;
    }
}

fn parse_request_target(token: Vec<u8>) -> Result<String, DecodeFault> {
    if token.is_empty() {
        return Err(DecodeFault::bad_request(
            "invalid request line: empty request-target",
        ));
    }
    if !is_valid_request_target(&token) {
        return Err(DecodeFault::bad_request(
            "invalid request line: invalid request-target",
        ));
    }
    String::from_utf8(token)
        .map_err(|e| DecodeFault::bad_request(format!("invalid request-target: invalid UTF-8: {e}")))
}

/// RFC 3986 で URI に使えない文字
const RFC3986_EXCLUDED: &[u8] = b"\"<>\\^`{|}";

/// request-target の文字を検証する (RFC 9112 Section 3.2, RFC 3986)
///
/// 拒否する文字:
/// - 制御文字 (0x00-0x20, 0x7F)
/// - RFC 3986 で除外されている文字: " < > \ ^ ` { | }
/// - 不正なパーセントエンコーディング (% の後に 2 桁の 16 進数がない)
/// - パーセントエンコーディングされた NUL バイト (%00)
///
/// スキームやホストの解釈は行わない。
pub(crate) fn is_valid_request_target(target: &[u8]) -> bool {
    if target.is_empty() {
        return false;
    }

    let mut i = 0;
    while i < target.len() {
        let b = target[i];

        if b <= 0x20 || b == 0x7F || RFC3986_EXCLUDED.contains(&b) {
            return false;
        }

        if b == b'%' {
            let (Some(&high), Some(&low)) = (target.get(i + 1), target.get(i + 2)) else {
                return false;
            };
            if !high.is_ascii_hexdigit() || !low.is_ascii_hexdigit() {
                return false;
            }
            if high == b'0' && low == b'0' {
                return false;
            }
            i += 3;
            continue;
        }

        i += 1;
    }

    true
}
