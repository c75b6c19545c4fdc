//! ヘッダーデコーダー
//!
//! ヘッダー行のステートマシンをヘッダーブロックのステートマシンに入れ子にする。
//!
//! ```text
//! field-line = field-name ":" OWS field-value OWS CRLF
//! ```

use log::trace;

use crate::config::{DecoderConfig, LineEnding};
use crate::error::DecodeFault;
use crate::status::StatusCode;

use super::machine::{DecodingStateMachine, Machine, Transition};
use super::primitive::{Primitive, Product, TokenLimit, is_line_end, is_linear_whitespace};

/// ヘッダー行のデコード結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderLine {
    Field(String, String),
    /// ヘッダーブロック終端の空行
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    ReadName,
    Colon,
    AfterColon,
    ReadValue,
    Finish,
    BlankLine,
}

/// ヘッダー 1 行のステートマシン
#[derive(Debug)]
pub struct HeaderLineMachine {
    max_header_line_size: usize,
    line_ending: LineEnding,
    step: Step,
    /// この行で消費済みのバイト数 (CRLF を除く)
    used: usize,
    name: String,
    value: String,
}

impl HeaderLineMachine {
    pub fn new(config: &DecoderConfig) -> Self {
        Self {
            max_header_line_size: config.limits.max_header_line_size,
            line_ending: config.line_ending,
            step: Step::ReadName,
            used: 0,
            name: String::new(),
            value: String::new(),
        }
    }

    fn enter(&mut self, step: Step) -> Primitive {
        self.step = step;
        let limit = TokenLimit::new(
            "header field",
            self.max_header_line_size,
            StatusCode::RequestHeaderFieldsTooLarge,
        )
        .after(self.used);
        match step {
            Step::ReadName => {
                Primitive::consume_until(|b| b == b':' || is_line_end(b)).with_limit(limit)
            }
            Step::Colon => Primitive::match_byte(b':'),
            Step::AfterColon => Primitive::skip_linear_whitespace().with_limit(limit),
            Step::ReadValue => Primitive::consume_until(is_line_end).with_limit(limit),
            Step::Finish | Step::BlankLine => Primitive::crlf(self.line_ending),
        }
    }
}

impl Machine for HeaderLineMachine {
    type State = Primitive;
    type Output = HeaderLine;

    fn init(&mut self) -> Primitive {
        self.enter(Step::ReadName)
    }

    fn transition(
        &mut self,
        product: Product,
    ) -> Result<Transition<Primitive, HeaderLine>, DecodeFault> {
        let next = match self.step {
            Step::ReadName => {
                let token = product.into_token();
                if token.is_empty() {
                    Step::BlankLine
                } else {
                    self.used = token.len();
                    self.name = parse_field_name(token)?;
                    Step::Colon
                }
            }
            Step::Colon => {
                if !product.matched() {
                    return Err(DecodeFault::bad_request(
                        "invalid header line: missing colon",
                    ));
                }
                self.used += 1;
                Step::AfterColon
            }
            Step::AfterColon => {
                if let Product::Skipped(skipped) = product {
                    self.used += skipped;
                }
                Step::ReadValue
            }
            Step::ReadValue => {
                self.value = parse_field_value(product.into_token())?;
                Step::Finish
            }
            Step::Finish => {
                if !product.matched() {
                    return Err(DecodeFault::bad_request(
                        "expected CRLF at end of header line",
                    ));
                }
                return Ok(Transition::Done(HeaderLine::Field(
                    std::mem::take(&mut self.name),
                    std::mem::take(&mut self.value),
                )));
            }
            Step::BlankLine => {
                if !product.matched() {
                    return Err(DecodeFault::bad_request("invalid header line"));
                }
                return Ok(Transition::Done(HeaderLine::End));
            }
        };
        Ok(Transition::Next(self.enter(next)))
    }

    fn destroy(&mut self) {
        self.step = Step::ReadName;
        self.used = 0;
        self.name.clear();
        self.value.clear();
    }
}

/// ヘッダーブロックのステートマシン
///
/// 空行までヘッダー行を繰り返しデコードする。
/// 同名のヘッダーも受信順のまま保持する。
#[derive(Debug)]
pub struct HeadersMachine {
    config: DecoderConfig,
    headers: Vec<(String, String)>,
}

impl HeadersMachine {
    pub fn new(config: &DecoderConfig) -> Self {
        Self {
            config: config.clone(),
            headers: Vec::new(),
        }
    }

    fn line(&self) -> DecodingStateMachine<HeaderLineMachine> {
        DecodingStateMachine::new(HeaderLineMachine::new(&self.config))
    }
}

impl Machine for HeadersMachine {
    type State = DecodingStateMachine<HeaderLineMachine>;
    type Output = Vec<(String, String)>;

    fn init(&mut self) -> Self::State {
        self.line()
    }

    fn transition(
        &mut self,
        line: HeaderLine,
    ) -> Result<Transition<Self::State, Self::Output>, DecodeFault> {
        match line {
            HeaderLine::Field(name, value) => {
                let limit = self.config.limits.max_headers_count;
                if self.headers.len() >= limit {
                    return Err(DecodeFault::too_large(
                        "header count",
                        self.headers.len() + 1,
                        limit,
                        StatusCode::RequestHeaderFieldsTooLarge,
                    ));
                }
                trace!("header: {name} ({} bytes)", value.len());
                self.headers.push((name, value));
                Ok(Transition::Next(self.line()))
            }
            HeaderLine::End => Ok(Transition::Done(std::mem::take(&mut self.headers))),
        }
    }

    fn destroy(&mut self) {
        self.headers.clear();
    }
}

fn parse_field_name(token: Vec<u8>) -> Result<String, DecodeFault> {
    if token.first().copied().is_some_and(is_linear_whitespace) {
        return Err(DecodeFault::bad_request("invalid header line: obs-fold"));
    }
    if token.iter().copied().any(is_linear_whitespace) {
        return Err(DecodeFault::bad_request(
            "invalid header line: invalid name whitespace",
        ));
    }
    if !is_valid_header_name(&token) {
        return Err(DecodeFault::bad_request("invalid header line: invalid name"));
    }
    // token 文字は ASCII のみ
    String::from_utf8(token)
        .map_err(|e| DecodeFault::bad_request(format!("invalid header name: {e}")))
}

fn parse_field_value(mut token: Vec<u8>) -> Result<String, DecodeFault> {
    // 先頭の OWS は SkipLinearWhitespace が消費済み
    while token.last().copied().is_some_and(is_linear_whitespace) {
        token.pop();
    }
    if !token.iter().copied().all(is_field_vchar) {
        return Err(DecodeFault::bad_request(
            "invalid header line: invalid value (contains control characters)",
        ));
    }
    String::from_utf8(token)
        .map_err(|e| DecodeFault::bad_request(format!("invalid header value: invalid UTF-8: {e}")))
}

/// field-name = token (RFC 9110 Section 5.1)
pub(crate) fn is_valid_header_name(name: &[u8]) -> bool {
    !name.is_empty() && name.iter().copied().all(is_token_char)
}

/// tchar (RFC 9110 Section 5.6.2)
pub(crate) fn is_token_char(b: u8) -> bool {
    matches!(
        b,
        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' |
        b'0'..=b'9' | b'A'..=b'Z' | b'^' | b'_' | b'`' | b'a'..=b'z' | b'|' | b'~'
    )
}

/// field-vchar / SP / HTAB (RFC 9110 Section 5.5)
pub(crate) fn is_field_vchar(b: u8) -> bool {
    matches!(b, 0x09 | 0x20..=0x7E | 0x80..=0xFF)
}
