//! HTTP リクエストデコーダー
//!
//! リクエストライン → ヘッダー → ボディ の順にステートマシンをつなぐ。

use log::debug;

use crate::config::DecoderConfig;
use crate::error::DecodeFault;
use crate::request::Request;

use super::body::request_body_kind;
use super::cursor::ByteCursor;
use super::head::RequestLine;
use super::headers::HeadersMachine;
use super::machine::{DecodingStateMachine, Machine, Transition};
use super::primitive::Primitive;
use super::request_line::RequestLineMachine;
use super::state::{DecodingState, Progress};

/// リクエストの各部分を読む子状態
#[derive(Debug)]
pub enum RequestPart {
    Line(DecodingStateMachine<RequestLineMachine>),
    Headers(DecodingStateMachine<HeadersMachine>),
    Body(Primitive),
}

/// [`RequestPart`] の生成値
#[derive(Debug)]
pub enum RequestPartOutput {
    Line(RequestLine),
    Headers(Vec<(String, String)>),
    Body(Vec<u8>),
}

impl DecodingState for RequestPart {
    type Output = RequestPartOutput;

    fn decode(
        &mut self,
        cursor: &mut ByteCursor<'_>,
    ) -> Result<Progress<RequestPartOutput>, DecodeFault> {
        Ok(match self {
            RequestPart::Line(state) => state.decode(cursor)?.map(RequestPartOutput::Line),
            RequestPart::Headers(state) => state.decode(cursor)?.map(RequestPartOutput::Headers),
            RequestPart::Body(state) => state
                .decode(cursor)?
                .map(|product| RequestPartOutput::Body(product.into_token())),
        })
    }
}

/// HTTP リクエスト全体のステートマシン
#[derive(Debug)]
pub struct RequestMachine {
    config: DecoderConfig,
    line: Option<RequestLine>,
    headers: Vec<(String, String)>,
}

impl RequestMachine {
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            config,
            line: None,
            headers: Vec::new(),
        }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    fn finish(&mut self, body: Vec<u8>) -> Result<Request, DecodeFault> {
        let line = self
            .line
            .take()
            .ok_or_else(|| DecodeFault::bad_request("missing request line"))?;
        let request = Request::from_parts(line, std::mem::take(&mut self.headers), body);
        debug!(
            "decoded request: {} {} {} ({} headers, {} body bytes)",
            request.method,
            request.target,
            request.version,
            request.headers.len(),
            request.body.len()
        );
        Ok(request)
    }
}

impl Machine for RequestMachine {
    type State = RequestPart;
    type Output = Request;

    fn init(&mut self) -> RequestPart {
        RequestPart::Line(DecodingStateMachine::new(RequestLineMachine::new(
            &self.config,
        )))
    }

    fn transition(
        &mut self,
        product: RequestPartOutput,
    ) -> Result<Transition<RequestPart, Request>, DecodeFault> {
        match product {
            RequestPartOutput::Line(line) => {
                self.line = Some(line);
                Ok(Transition::Next(RequestPart::Headers(
                    DecodingStateMachine::new(HeadersMachine::new(&self.config)),
                )))
            }
            RequestPartOutput::Headers(headers) => {
                let version = self
                    .line
                    .as_ref()
                    .ok_or_else(|| DecodeFault::bad_request("missing request line"))?
                    .version;
                let kind = request_body_kind(version, &headers, &self.config.limits)?;
                self.headers = headers;
                match kind.state(&self.config.limits) {
                    Some(body) => Ok(Transition::Next(RequestPart::Body(body))),
                    None => Ok(Transition::Done(self.finish(Vec::new())?)),
                }
            }
            RequestPartOutput::Body(body) => Ok(Transition::Done(self.finish(body)?)),
        }
    }

    fn destroy(&mut self) {
        self.line = None;
        self.headers.clear();
    }
}
