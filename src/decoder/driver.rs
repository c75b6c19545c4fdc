//! デコーダードライバー
//!
//! 接続ごとに 1 つ作成し、受信したチャンクを到着順に [`Decoder::feed`] に渡す。
//! I/O は行わない。

use std::fmt;

use log::{debug, trace, warn};

use crate::config::DecoderConfig;
use crate::error::DecodeFault;
use crate::request::Request;
use crate::response::Response;

use super::cursor::ByteCursor;
use super::head::RequestLine;
use super::machine::{DecodingStateMachine, Machine};
use super::request::RequestMachine;
use super::request_line::RequestLineMachine;
use super::response::ResponseMachine;
use super::state::{DecodingState, Progress};

/// デコード結果の受け取り先
pub trait MessageSink<T> {
    /// デコード済みメッセージ (到着順に 1 回ずつ)
    fn on_message(&mut self, message: T);

    /// デコード失敗 (メッセージごとに最大 1 回)
    fn on_decode_fault(&mut self, fault: DecodeFault);
}

/// [`MessageSink`] に渡されたイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<T> {
    Message(T),
    Fault(DecodeFault),
}

impl<T> MessageSink<T> for Vec<Event<T>> {
    fn on_message(&mut self, message: T) {
        self.push(Event::Message(message));
    }

    fn on_decode_fault(&mut self, fault: DecodeFault) {
        self.push(Event::Fault(fault));
    }
}

/// 接続クローズ時の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// メッセージの途中ではなかった
    Idle,
    /// close-delimited ボディのメッセージが完了した
    Completed,
    /// 途中のメッセージを破棄した
    Discarded,
    /// デコード失敗済み、またはクローズ時にデコード失敗した
    Faulted,
}

/// デコーダードライバー (Sans I/O)
///
/// トップレベルの [`Machine`] にチャンクを渡し、完了したメッセージを
/// [`MessageSink`] に渡す。1 つのチャンクに複数のメッセージが含まれていてもよい
/// (パイプライン)。
///
/// デコード失敗後は [`Decoder::reset`] が呼ばれるまで入力を無視する。
pub struct Decoder<M: Machine> {
    state: DecodingStateMachine<M>,
    in_message: bool,
    faulted: bool,
    decoded: u64,
}

impl<M> fmt::Debug for Decoder<M>
where
    M: Machine + fmt::Debug,
    M::State: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder")
            .field("state", &self.state)
            .field("in_message", &self.in_message)
            .field("faulted", &self.faulted)
            .field("decoded", &self.decoded)
            .finish()
    }
}

/// リクエストラインだけをデコードする
pub type RequestLineDecoder = Decoder<RequestLineMachine>;
/// HTTP リクエストをデコードする (サーバー側)
pub type RequestDecoder = Decoder<RequestMachine>;
/// HTTP レスポンスをデコードする (クライアント側)
pub type ResponseDecoder = Decoder<ResponseMachine>;

impl<M: Machine> Decoder<M> {
    pub fn from_machine(machine: M) -> Self {
        Self {
            state: DecodingStateMachine::new(machine),
            in_message: false,
            faulted: false,
            decoded: 0,
        }
    }

    pub fn machine(&self) -> &M {
        self.state.machine()
    }

    /// デコード失敗済みか
    pub fn is_faulted(&self) -> bool {
        self.faulted
    }

    /// メッセージの途中ではないか
    pub fn is_idle(&self) -> bool {
        !self.in_message && !self.faulted
    }

    /// これまでにデコードしたメッセージ数
    pub fn decoded(&self) -> u64 {
        self.decoded
    }

    /// 受信したチャンクを渡す
    ///
    /// 完了したメッセージはすべて `sink` に渡し、その数を返す。
    /// デコード失敗時は `sink` に 1 回だけ通知して以降の入力を無視する。
    pub fn feed<S: MessageSink<M::Output>>(&mut self, chunk: &[u8], sink: &mut S) -> usize {
        if self.faulted {
            debug!("ignoring {} bytes after decode fault", chunk.len());
            return 0;
        }

        let mut cursor = ByteCursor::new(chunk);
        let mut emitted = 0;
        loop {
            let before = cursor.position();
            match self.state.decode(&mut cursor) {
                Ok(Progress::Suspended) => {
                    if cursor.position() > before {
                        self.in_message = true;
                    }
                    trace!("suspended after {} bytes", cursor.position());
                    break;
                }
                Ok(Progress::Complete(message)) => {
                    self.in_message = false;
                    self.decoded += 1;
                    emitted += 1;
                    sink.on_message(message);
                    if cursor.is_empty() {
                        break;
                    }
                }
                Err(fault) => {
                    warn!("decode fault: {fault}");
                    self.in_message = false;
                    self.faulted = true;
                    sink.on_decode_fault(fault);
                    break;
                }
            }
        }
        emitted
    }

    /// 接続クローズを通知する
    ///
    /// close-delimited ボディを読んでいた場合はメッセージを完了する。
    /// それ以外の途中のメッセージは `sink` に渡さずに破棄する。
    pub fn close<S: MessageSink<M::Output>>(&mut self, sink: &mut S) -> CloseOutcome {
        if self.faulted {
            return CloseOutcome::Faulted;
        }

        match self.state.close() {
            Ok(Progress::Complete(message)) => {
                self.in_message = false;
                self.decoded += 1;
                sink.on_message(message);
                CloseOutcome::Completed
            }
            Ok(Progress::Suspended) => {
                self.state.reset();
                if std::mem::take(&mut self.in_message) {
                    debug!("discarding partial message on close");
                    CloseOutcome::Discarded
                } else {
                    CloseOutcome::Idle
                }
            }
            Err(fault) => {
                warn!("decode fault on close: {fault}");
                self.in_message = false;
                self.faulted = true;
                sink.on_decode_fault(fault);
                CloseOutcome::Faulted
            }
        }
    }

    /// デコーダーをリセット
    ///
    /// 途中のメッセージとデコード失敗状態を破棄する。
    pub fn reset(&mut self) {
        self.state.reset();
        self.in_message = false;
        self.faulted = false;
    }
}

impl Decoder<RequestLineMachine> {
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    pub fn with_config(config: DecoderConfig) -> Self {
        Self::from_machine(RequestLineMachine::new(&config))
    }
}

impl Default for Decoder<RequestLineMachine> {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder<RequestMachine> {
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    pub fn with_config(config: DecoderConfig) -> Self {
        Self::from_machine(RequestMachine::new(config))
    }

    pub fn config(&self) -> &DecoderConfig {
        self.machine().config()
    }
}

impl Default for Decoder<RequestMachine> {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder<ResponseMachine> {
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    pub fn with_config(config: DecoderConfig) -> Self {
        Self::from_machine(ResponseMachine::new(config))
    }

    pub fn config(&self) -> &DecoderConfig {
        self.machine().config()
    }

    /// 次のレスポンスを HEAD リクエストへの応答として扱う (ボディなし)
    pub fn expect_no_body(&mut self) {
        self.state.machine_mut().set_expect_no_body(true);
    }
}

impl Default for Decoder<ResponseMachine> {
    fn default() -> Self {
        Self::new()
    }
}

/// 1 つのチャンクからリクエストラインをすべてデコードする
///
/// テストやツール向けの補助関数。
pub fn decode_request_lines(input: &[u8]) -> Result<Vec<RequestLine>, DecodeFault> {
    collect(&mut RequestLineDecoder::new(), input)
}

/// 1 つのチャンクからリクエストをすべてデコードする
pub fn decode_requests(input: &[u8]) -> Result<Vec<Request>, DecodeFault> {
    collect(&mut RequestDecoder::new(), input)
}

/// 1 つのチャンクからレスポンスをすべてデコードし、接続クローズまで処理する
pub fn decode_responses(input: &[u8]) -> Result<Vec<Response>, DecodeFault> {
    let mut decoder = ResponseDecoder::new();
    let mut events = Vec::new();
    decoder.feed(input, &mut events);
    decoder.close(&mut events);
    into_messages(events)
}

fn collect<M: Machine>(decoder: &mut Decoder<M>, input: &[u8]) -> Result<Vec<M::Output>, DecodeFault> {
    let mut events = Vec::new();
    decoder.feed(input, &mut events);
    into_messages(events)
}

fn into_messages<T>(events: Vec<Event<T>>) -> Result<Vec<T>, DecodeFault> {
    events
        .into_iter()
        .map(|event| match event {
            Event::Message(message) => Ok(message),
            Event::Fault(fault) => Err(fault),
        })
        .collect()
}
