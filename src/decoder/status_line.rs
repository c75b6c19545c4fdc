//! ステータスラインデコーダー
//!
//! ```text
//! status-line = HTTP-version SP status-code SP [ reason-phrase ] CRLF
//! ```

use log::trace;

use crate::config::{DecoderConfig, LineEnding};
use crate::error::DecodeFault;
use crate::version::Version;

use super::head::StatusLine;
use super::machine::{Machine, Transition};
use super::primitive::{Primitive, Product, TokenLimit, is_field_delimiter, is_line_end};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    ReadVersion,
    AfterVersion,
    ReadStatus,
    AfterStatus,
    ReadReason,
    Finish,
}

/// ステータスラインのステートマシン
#[derive(Debug)]
pub struct StatusLineMachine {
    max_token_size: usize,
    line_ending: LineEnding,
    step: Step,
    version: Option<Version>,
    status_code: u16,
    reason_phrase: String,
}

impl StatusLineMachine {
    pub fn new(config: &DecoderConfig) -> Self {
        Self {
            max_token_size: config.limits.max_token_size,
            line_ending: config.line_ending,
            step: Step::ReadVersion,
            version: None,
            status_code: 0,
            reason_phrase: String::new(),
        }
    }

    fn enter(&mut self, step: Step) -> Primitive {
        self.step = step;
        let limit = TokenLimit::new("status line token", self.max_token_size, None);
        match step {
            Step::ReadVersion | Step::ReadStatus => {
                Primitive::consume_until(is_field_delimiter).with_limit(limit)
            }
            // reason-phrase は SP / HTAB を含む
            Step::ReadReason => Primitive::consume_until(is_line_end).with_limit(limit),
            Step::AfterVersion | Step::AfterStatus => Primitive::skip_linear_whitespace(),
            Step::Finish => Primitive::crlf(self.line_ending),
        }
    }
}

impl Machine for StatusLineMachine {
    type State = Primitive;
    type Output = StatusLine;

    fn init(&mut self) -> Primitive {
        self.enter(Step::ReadVersion)
    }

    fn transition(
        &mut self,
        product: Product,
    ) -> Result<Transition<Primitive, StatusLine>, DecodeFault> {
        let next = match self.step {
            Step::ReadVersion => {
                let token = product.into_token();
                if token.is_empty() {
                    return Err(DecodeFault::syntax(
                        "invalid status line: missing HTTP version",
                    ));
                }
                let version = Version::from_bytes(&token)
                    .ok_or_else(|| DecodeFault::unsupported("HTTP version", &token, None))?;
                self.version = Some(version);
                Step::AfterVersion
            }
            Step::AfterVersion => Step::ReadStatus,
            Step::ReadStatus => {
                self.status_code = parse_status_code(&product.into_token())?;
                trace!("status line: status {}", self.status_code);
                Step::AfterStatus
            }
            Step::AfterStatus => Step::ReadReason,
            Step::ReadReason => {
                let token = product.into_token();
                if !is_valid_reason_phrase(&token) {
                    return Err(DecodeFault::syntax(
                        "invalid status line: invalid reason-phrase",
                    ));
                }
                self.reason_phrase = String::from_utf8(token).map_err(|e| {
                    DecodeFault::syntax(format!("invalid reason-phrase: invalid UTF-8: {e}"))
                })?;
                Step::Finish
            }
            Step::Finish => {
                if !product.matched() {
                    return Err(DecodeFault::syntax("expected CRLF at end of status line"));
                }
                let version = self.version.take().ok_or_else(|| {
                    DecodeFault::syntax("invalid status line: missing HTTP version")
                })?;
                return Ok(Transition::Done(StatusLine {
                    version,
                    status_code: self.status_code,
                    reason_phrase: std::mem::take(&mut self.reason_phrase),
                }));
            }
        };
        Ok(Transition::Next(self.enter(next)))
    }

    fn destroy(&mut self) {
        self.step = Step::ReadVersion;
        self.version = None;
        self.status_code = 0;
        self.reason_phrase.clear();
    }
}

/// status-code = 3DIGIT (100-599)
fn parse_status_code(token: &[u8]) -> Result<u16, DecodeFault> {
    if token.len() != 3 || !token.iter().all(u8::is_ascii_digit) {
        return Err(DecodeFault::syntax(format!(
            "invalid status code: {:?}",
            String::from_utf8_lossy(token)
        )));
    }
    let code = token
        .iter()
        .fold(0u16, |acc, b| acc * 10 + u16::from(b - b'0'));
    if !(100..=599).contains(&code) {
        return Err(DecodeFault::syntax(format!("invalid status code: {code}")));
    }
    Ok(code)
}

/// reason-phrase = *( HTAB / SP / VCHAR / obs-text )
fn is_valid_reason_phrase(phrase: &[u8]) -> bool {
    phrase
        .iter()
        .all(|&b| matches!(b, 0x09 | 0x20..=0x7E | 0x80..=0xFF))
}
