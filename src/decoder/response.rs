//! HTTP レスポンスデコーダー
//!
//! レスポンス側のデコード失敗はピアに応答しないため、ステータスを持たない。

use log::debug;

use crate::config::DecoderConfig;
use crate::error::DecodeFault;
use crate::response::Response;

use super::body::response_body_kind;
use super::cursor::ByteCursor;
use super::head::StatusLine;
use super::headers::HeadersMachine;
use super::machine::{DecodingStateMachine, Machine, Transition};
use super::primitive::Primitive;
use super::state::{DecodingState, Progress};
use super::status_line::StatusLineMachine;

/// レスポンスの各部分を読む子状態
#[derive(Debug)]
pub enum ResponsePart {
    Line(DecodingStateMachine<StatusLineMachine>),
    Headers(DecodingStateMachine<HeadersMachine>),
    Body(Primitive),
}

/// [`ResponsePart`] の生成値
#[derive(Debug)]
pub enum ResponsePartOutput {
    Line(StatusLine),
    Headers(Vec<(String, String)>),
    Body(Vec<u8>),
}

impl ResponsePart {
    fn step(
        &mut self,
        cursor: Option<&mut ByteCursor<'_>>,
    ) -> Result<Progress<ResponsePartOutput>, DecodeFault> {
        let progress = match (self, cursor) {
            (ResponsePart::Line(state), Some(cursor)) => {
                state.decode(cursor)?.map(ResponsePartOutput::Line)
            }
            (ResponsePart::Line(state), None) => state.close()?.map(ResponsePartOutput::Line),
            (ResponsePart::Headers(state), Some(cursor)) => {
                state.decode(cursor)?.map(ResponsePartOutput::Headers)
            }
            (ResponsePart::Headers(state), None) => {
                state.close()?.map(ResponsePartOutput::Headers)
            }
            (ResponsePart::Body(state), Some(cursor)) => state
                .decode(cursor)?
                .map(|product| ResponsePartOutput::Body(product.into_token())),
            (ResponsePart::Body(state), None) => state
                .close()?
                .map(|product| ResponsePartOutput::Body(product.into_token())),
        };
        Ok(progress)
    }
}

impl DecodingState for ResponsePart {
    type Output = ResponsePartOutput;

    fn decode(
        &mut self,
        cursor: &mut ByteCursor<'_>,
    ) -> Result<Progress<ResponsePartOutput>, DecodeFault> {
        self.step(Some(cursor)).map_err(DecodeFault::without_status)
    }

    fn close(&mut self) -> Result<Progress<ResponsePartOutput>, DecodeFault> {
        self.step(None).map_err(DecodeFault::without_status)
    }
}

/// HTTP レスポンス全体のステートマシン
#[derive(Debug)]
pub struct ResponseMachine {
    config: DecoderConfig,
    expect_no_body: bool,
    /// 完了したレスポンスが 1xx (中間レスポンス) だった
    interim: bool,
    line: Option<StatusLine>,
    headers: Vec<(String, String)>,
}

impl ResponseMachine {
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            config,
            expect_no_body: false,
            interim: false,
            line: None,
            headers: Vec::new(),
        }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// 次のレスポンスはボディを持たない (HEAD リクエストへの応答)
    ///
    /// 最終レスポンス (1xx 以外) のデコードが終わると解除される。
    pub fn set_expect_no_body(&mut self, expect_no_body: bool) {
        self.expect_no_body = expect_no_body;
    }

    fn finish(&mut self, body: Vec<u8>) -> Result<Response, DecodeFault> {
        let line = self
            .line
            .take()
            .ok_or_else(|| DecodeFault::syntax("missing status line"))?;
        let response = Response::from_parts(line, std::mem::take(&mut self.headers), body);
        self.interim = response.is_informational();
        debug!(
            "decoded response: {} {} ({} headers, {} body bytes)",
            response.version,
            response.status_code,
            response.headers.len(),
            response.body.len()
        );
        Ok(response)
    }
}

impl Machine for ResponseMachine {
    type State = ResponsePart;
    type Output = Response;

    fn init(&mut self) -> ResponsePart {
        ResponsePart::Line(DecodingStateMachine::new(StatusLineMachine::new(
            &self.config,
        )))
    }

    fn transition(
        &mut self,
        product: ResponsePartOutput,
    ) -> Result<Transition<ResponsePart, Response>, DecodeFault> {
        match product {
            ResponsePartOutput::Line(line) => {
                self.line = Some(line);
                Ok(Transition::Next(ResponsePart::Headers(
                    DecodingStateMachine::new(HeadersMachine::new(&self.config)),
                )))
            }
            ResponsePartOutput::Headers(headers) => {
                let status_code = self
                    .line
                    .as_ref()
                    .ok_or_else(|| DecodeFault::syntax("missing status line"))?
                    .status_code;
                let kind = response_body_kind(
                    status_code,
                    self.expect_no_body,
                    &headers,
                    &self.config.limits,
                )
                .map_err(DecodeFault::without_status)?;
                self.headers = headers;
                match kind.state(&self.config.limits) {
                    Some(body) => Ok(Transition::Next(ResponsePart::Body(body))),
                    None => Ok(Transition::Done(self.finish(Vec::new())?)),
                }
            }
            ResponsePartOutput::Body(body) => Ok(Transition::Done(self.finish(body)?)),
        }
    }

    fn destroy(&mut self) {
        // RFC 9110 Section 15.2: 1xx の後に最終レスポンスが続く
        if !std::mem::take(&mut self.interim) {
            self.expect_no_body = false;
        }
        self.line = None;
        self.headers.clear();
    }
}
