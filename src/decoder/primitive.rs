//! プリミティブ状態
//!
//! トークンの「区切りを見つける」部分だけを担当する。
//! トークンの解釈は親のステートマシンが遷移関数で行う。

use std::mem;

use crate::config::LineEnding;
use crate::error::DecodeFault;
use crate::status::StatusCode;

use super::cursor::ByteCursor;
use super::state::{DecodingState, Progress};

/// SP / HTAB
pub fn is_linear_whitespace(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

/// スタートラインのフィールド区切り (SP / HTAB / CR / LF)
pub fn is_field_delimiter(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

/// 行末 (CR / LF)
pub fn is_line_end(b: u8) -> bool {
    b == b'\r' || b == b'\n'
}

/// トークンの終端条件
#[derive(Debug, Clone, Copy)]
pub enum Terminator {
    /// 固定の 1 バイト
    Byte(u8),
    /// バイトごとに評価する述語
    Dynamic(fn(u8) -> bool),
}

impl Terminator {
    fn matches(self, b: u8) -> bool {
        match self {
            Terminator::Byte(t) => b == t,
            Terminator::Dynamic(is_terminator) => is_terminator(b),
        }
    }
}

/// 蓄積サイズの上限
///
/// `used` は同じ行の前の状態が消費済みのバイト数で、上限の判定に含める。
#[derive(Debug, Clone, Copy)]
pub struct TokenLimit {
    what: &'static str,
    max: usize,
    used: usize,
    status: Option<StatusCode>,
}

impl TokenLimit {
    pub const UNBOUNDED: TokenLimit = TokenLimit {
        what: "token",
        max: usize::MAX,
        used: 0,
        status: None,
    };

    pub fn new(what: &'static str, max: usize, status: impl Into<Option<StatusCode>>) -> Self {
        Self {
            what,
            max,
            used: 0,
            status: status.into(),
        }
    }

    /// 前の状態が `used` バイト消費済みの上限
    pub fn after(self, used: usize) -> Self {
        Self { used, ..self }
    }

    fn check(&self, size: usize) -> Result<(), DecodeFault> {
        let size = self.used.saturating_add(size);
        if size > self.max {
            return Err(DecodeFault::too_large(
                self.what,
                size,
                self.max,
                self.status,
            ));
        }
        Ok(())
    }
}

/// プリミティブ状態が生成する値
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Product {
    /// 区切りを含まないトークン
    Token(Vec<u8>),
    /// スキップしたバイト数
    Skipped(usize),
    /// 期待したバイト列が見つかったか
    Matched(bool),
}

impl Product {
    /// トークンを取り出す (トークン以外は空)
    pub fn into_token(self) -> Vec<u8> {
        match self {
            Product::Token(token) => token,
            Product::Skipped(_) | Product::Matched(_) => Vec::new(),
        }
    }

    pub fn matched(&self) -> bool {
        matches!(self, Product::Matched(true))
    }
}

/// プリミティブ状態
///
/// 各インスタンスは自分の部分トークンを専有する。
#[derive(Debug)]
pub enum Primitive {
    /// 終端が見つかるまで蓄積する
    ConsumeToTerminator {
        terminator: Terminator,
        /// true の場合は終端バイトも消費する
        consume_terminator: bool,
        limit: TokenLimit,
        buf: Vec<u8>,
    },
    /// SP / HTAB を読み飛ばす
    SkipLinearWhitespace { skipped: usize, limit: TokenLimit },
    /// 1 バイトの一致を確認する (不一致のバイトは消費しない)
    MatchByte { expected: u8 },
    /// CRLF を確認する
    Crlf { line_ending: LineEnding, cr_seen: bool },
    /// 固定長を読む
    FixedLength { remaining: usize, buf: Vec<u8> },
    /// 接続が閉じるまで読む
    ReadToClose { limit: TokenLimit, buf: Vec<u8> },
}

impl Primitive {
    /// 指定バイトまで読む (終端は消費してトークンには含めない)
    pub fn consume_to_byte(terminator: u8) -> Self {
        Primitive::ConsumeToTerminator {
            terminator: Terminator::Byte(terminator),
            consume_terminator: true,
            limit: TokenLimit::UNBOUNDED,
            buf: Vec::new(),
        }
    }

    /// 述語が真になるバイトまで読む (終端は消費してトークンには含めない)
    pub fn consume_to_dynamic(is_terminator: fn(u8) -> bool) -> Self {
        Primitive::ConsumeToTerminator {
            terminator: Terminator::Dynamic(is_terminator),
            consume_terminator: true,
            limit: TokenLimit::UNBOUNDED,
            buf: Vec::new(),
        }
    }

    /// 述語が真になるバイトの直前まで読む (終端は次の状態に残す)
    pub fn consume_until(is_terminator: fn(u8) -> bool) -> Self {
        Primitive::ConsumeToTerminator {
            terminator: Terminator::Dynamic(is_terminator),
            consume_terminator: false,
            limit: TokenLimit::UNBOUNDED,
            buf: Vec::new(),
        }
    }

    pub fn skip_linear_whitespace() -> Self {
        Primitive::SkipLinearWhitespace {
            skipped: 0,
            limit: TokenLimit::UNBOUNDED,
        }
    }

    pub fn match_byte(expected: u8) -> Self {
        Primitive::MatchByte { expected }
    }

    pub fn crlf(line_ending: LineEnding) -> Self {
        Primitive::Crlf {
            line_ending,
            cr_seen: false,
        }
    }

    pub fn fixed_length(len: usize) -> Self {
        Primitive::FixedLength {
            remaining: len,
            buf: Vec::new(),
        }
    }

    pub fn read_to_close(limit: TokenLimit) -> Self {
        Primitive::ReadToClose {
            limit,
            buf: Vec::new(),
        }
    }

    /// 蓄積サイズの上限を設定する
    ///
    /// 蓄積を行わない状態では何もしない。
    pub fn with_limit(mut self, new_limit: TokenLimit) -> Self {
        match &mut self {
            Primitive::ConsumeToTerminator { limit, .. }
            | Primitive::SkipLinearWhitespace { limit, .. }
            | Primitive::ReadToClose { limit, .. } => {
                *limit = new_limit;
            }
            Primitive::MatchByte { .. }
            | Primitive::Crlf { .. }
            | Primitive::FixedLength { .. } => {}
        }
        self
    }
}

impl DecodingState for Primitive {
    type Output = Product;

    fn decode(&mut self, cursor: &mut ByteCursor<'_>) -> Result<Progress<Product>, DecodeFault> {
        match self {
            Primitive::ConsumeToTerminator {
                terminator,
                consume_terminator,
                limit,
                buf,
            } => {
                // 新しく届いたバイトだけを走査する
                let chunk = cursor.remaining();
                match chunk.iter().position(|&b| terminator.matches(b)) {
                    Some(pos) => {
                        limit.check(buf.len() + pos)?;
                        buf.extend_from_slice(&chunk[..pos]);
                        cursor.advance(if *consume_terminator { pos + 1 } else { pos });
                        Ok(Progress::Complete(Product::Token(mem::take(buf))))
                    }
                    None => {
                        limit.check(buf.len() + chunk.len())?;
                        buf.extend_from_slice(chunk);
                        cursor.advance(chunk.len());
                        Ok(Progress::Suspended)
                    }
                }
            }
            Primitive::SkipLinearWhitespace { skipped, limit } => {
                while let Some(b) = cursor.peek() {
                    if !is_linear_whitespace(b) {
                        return Ok(Progress::Complete(Product::Skipped(mem::take(skipped))));
                    }
                    limit.check(*skipped + 1)?;
                    cursor.advance(1);
                    *skipped += 1;
                }
                Ok(Progress::Suspended)
            }
            Primitive::MatchByte { expected } => match cursor.peek() {
                None => Ok(Progress::Suspended),
                Some(b) if b == *expected => {
                    cursor.advance(1);
                    Ok(Progress::Complete(Product::Matched(true)))
                }
                Some(_) => Ok(Progress::Complete(Product::Matched(false))),
            },
            Primitive::Crlf {
                line_ending,
                cr_seen,
            } => {
                while let Some(b) = cursor.peek() {
                    if *cr_seen {
                        *cr_seen = false;
                        if b == b'\n' {
                            cursor.advance(1);
                            return Ok(Progress::Complete(Product::Matched(true)));
                        }
                        return Ok(Progress::Complete(Product::Matched(false)));
                    }
                    match b {
                        b'\r' => {
                            cursor.advance(1);
                            *cr_seen = true;
                        }
                        b'\n' if *line_ending == LineEnding::AllowBareLf => {
                            cursor.advance(1);
                            return Ok(Progress::Complete(Product::Matched(true)));
                        }
                        _ => return Ok(Progress::Complete(Product::Matched(false))),
                    }
                }
                Ok(Progress::Suspended)
            }
            Primitive::FixedLength { remaining, buf } => {
                let n = (*remaining).min(cursor.len());
                buf.extend_from_slice(&cursor.remaining()[..n]);
                cursor.advance(n);
                *remaining -= n;
                if *remaining == 0 {
                    return Ok(Progress::Complete(Product::Token(mem::take(buf))));
                }
                Ok(Progress::Suspended)
            }
            Primitive::ReadToClose { limit, buf } => {
                let chunk = cursor.remaining();
                limit.check(buf.len() + chunk.len())?;
                buf.extend_from_slice(chunk);
                cursor.advance(chunk.len());
                Ok(Progress::Suspended)
            }
        }
    }

    fn close(&mut self) -> Result<Progress<Product>, DecodeFault> {
        match self {
            Primitive::ReadToClose { buf, .. } => {
                Ok(Progress::Complete(Product::Token(mem::take(buf))))
            }
            _ => Ok(Progress::Suspended),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(state: &mut Primitive, chunk: &[u8]) -> (Progress<Product>, usize) {
        let mut cursor = ByteCursor::new(chunk);
        let progress = state.decode(&mut cursor).unwrap();
        (progress, cursor.position())
    }

    #[test]
    fn consume_to_byte_single_chunk() {
        let mut state = Primitive::consume_to_byte(b':');
        let (progress, consumed) = feed(&mut state, b"Host: example.com");
        assert_eq!(progress, Progress::Complete(Product::Token(b"Host".to_vec())));
        // 終端も消費する
        assert_eq!(consumed, 5);
    }

    #[test]
    fn consume_to_byte_split() {
        let mut state = Primitive::consume_to_byte(b':');
        assert_eq!(feed(&mut state, b"Ho"), (Progress::Suspended, 2));
        assert_eq!(feed(&mut state, b""), (Progress::Suspended, 0));
        assert_eq!(feed(&mut state, b"s"), (Progress::Suspended, 1));
        assert_eq!(
            feed(&mut state, b"t:x"),
            (Progress::Complete(Product::Token(b"Host".to_vec())), 2)
        );
    }

    #[test]
    fn consume_to_dynamic() {
        let mut state = Primitive::consume_to_dynamic(is_linear_whitespace);
        assert_eq!(feed(&mut state, b"GE"), (Progress::Suspended, 2));
        assert_eq!(
            feed(&mut state, b"T\t/"),
            (Progress::Complete(Product::Token(b"GET".to_vec())), 2)
        );
    }

    #[test]
    fn consume_until_keeps_terminator() {
        let mut state = Primitive::consume_until(is_field_delimiter);
        assert_eq!(
            feed(&mut state, b"HTTP/1.1\r\n"),
            (Progress::Complete(Product::Token(b"HTTP/1.1".to_vec())), 8)
        );
    }

    #[test]
    fn consume_to_terminator_empty_token() {
        let mut state = Primitive::consume_until(is_field_delimiter);
        assert_eq!(
            feed(&mut state, b"\r\n"),
            (Progress::Complete(Product::Token(Vec::new())), 0)
        );
    }

    #[test]
    fn consume_to_terminator_limit() {
        let limit = TokenLimit::new("request-target", 4, StatusCode::UriTooLong);
        let mut state = Primitive::consume_until(is_field_delimiter).with_limit(limit);
        assert_eq!(feed(&mut state, b"/abc"), (Progress::Suspended, 4));

        let mut cursor = ByteCursor::new(b"d ");
        let fault = state.decode(&mut cursor).unwrap_err();
        assert_eq!(fault.status(), Some(StatusCode::UriTooLong));
        assert!(matches!(
            fault,
            DecodeFault::TooLarge {
                size: 5,
                limit: 4,
                ..
            }
        ));
    }

    #[test]
    fn consume_to_terminator_limit_exact() {
        let limit = TokenLimit::new("method", 3, None);
        let mut state = Primitive::consume_until(is_field_delimiter).with_limit(limit);
        assert_eq!(
            feed(&mut state, b"GET "),
            (Progress::Complete(Product::Token(b"GET".to_vec())), 3)
        );
    }

    #[test]
    fn skip_linear_whitespace() {
        let mut state = Primitive::skip_linear_whitespace();
        assert_eq!(feed(&mut state, b" \t "), (Progress::Suspended, 3));
        assert_eq!(feed(&mut state, b""), (Progress::Suspended, 0));
        assert_eq!(
            feed(&mut state, b"  /"),
            (Progress::Complete(Product::Skipped(5)), 2)
        );
    }

    #[test]
    fn skip_linear_whitespace_limit() {
        let limit = TokenLimit::new("header field", 8, StatusCode::RequestHeaderFieldsTooLarge);
        let mut state = Primitive::skip_linear_whitespace().with_limit(limit.after(5));
        assert_eq!(feed(&mut state, b"  "), (Progress::Suspended, 2));

        let mut cursor = ByteCursor::new(b"  x");
        let fault = state.decode(&mut cursor).unwrap_err();
        assert!(matches!(
            fault,
            DecodeFault::TooLarge {
                size: 9,
                limit: 8,
                ..
            }
        ));
    }

    #[test]
    fn limit_counts_used_bytes() {
        let limit = TokenLimit::new("header field", 8, None).after(5);
        let mut state = Primitive::consume_until(is_line_end).with_limit(limit);
        assert_eq!(
            feed(&mut state, b"abc\r"),
            (Progress::Complete(Product::Token(b"abc".to_vec())), 3)
        );

        let mut state = Primitive::consume_until(is_line_end).with_limit(limit);
        let mut cursor = ByteCursor::new(b"abcd\r");
        assert!(matches!(
            state.decode(&mut cursor).unwrap_err(),
            DecodeFault::TooLarge { size: 9, .. }
        ));
    }

    #[test]
    fn skip_linear_whitespace_nothing_to_skip() {
        let mut state = Primitive::skip_linear_whitespace();
        assert_eq!(
            feed(&mut state, b"/"),
            (Progress::Complete(Product::Skipped(0)), 0)
        );
    }

    #[test]
    fn match_byte() {
        let mut state = Primitive::match_byte(b':');
        assert_eq!(feed(&mut state, b""), (Progress::Suspended, 0));
        assert_eq!(
            feed(&mut state, b": v"),
            (Progress::Complete(Product::Matched(true)), 1)
        );

        let mut state = Primitive::match_byte(b':');
        assert_eq!(
            feed(&mut state, b"\r\n"),
            (Progress::Complete(Product::Matched(false)), 0)
        );
    }

    #[test]
    fn crlf() {
        let mut state = Primitive::crlf(LineEnding::Strict);
        assert_eq!(
            feed(&mut state, b"\r\nGET"),
            (Progress::Complete(Product::Matched(true)), 2)
        );
    }

    #[test]
    fn crlf_split() {
        let mut state = Primitive::crlf(LineEnding::Strict);
        assert_eq!(feed(&mut state, b"\r"), (Progress::Suspended, 1));
        assert_eq!(feed(&mut state, b""), (Progress::Suspended, 0));
        assert_eq!(
            feed(&mut state, b"\n"),
            (Progress::Complete(Product::Matched(true)), 1)
        );
    }

    #[test]
    fn crlf_cr_without_lf() {
        let mut state = Primitive::crlf(LineEnding::Strict);
        assert_eq!(feed(&mut state, b"\r"), (Progress::Suspended, 1));
        assert_eq!(
            feed(&mut state, b"x"),
            (Progress::Complete(Product::Matched(false)), 0)
        );
    }

    #[test]
    fn crlf_other_byte() {
        let mut state = Primitive::crlf(LineEnding::Strict);
        assert_eq!(
            feed(&mut state, b"X\r\n"),
            (Progress::Complete(Product::Matched(false)), 0)
        );
    }

    #[test]
    fn crlf_bare_lf() {
        let mut state = Primitive::crlf(LineEnding::Strict);
        assert_eq!(
            feed(&mut state, b"\n"),
            (Progress::Complete(Product::Matched(false)), 0)
        );

        let mut state = Primitive::crlf(LineEnding::AllowBareLf);
        assert_eq!(
            feed(&mut state, b"\n"),
            (Progress::Complete(Product::Matched(true)), 1)
        );
    }

    #[test]
    fn fixed_length() {
        let mut state = Primitive::fixed_length(5);
        assert_eq!(feed(&mut state, b"he"), (Progress::Suspended, 2));
        assert_eq!(
            feed(&mut state, b"lloGET"),
            (Progress::Complete(Product::Token(b"hello".to_vec())), 3)
        );
    }

    #[test]
    fn fixed_length_zero() {
        let mut state = Primitive::fixed_length(0);
        assert_eq!(
            feed(&mut state, b""),
            (Progress::Complete(Product::Token(Vec::new())), 0)
        );
    }

    #[test]
    fn read_to_close() {
        let mut state = Primitive::read_to_close(TokenLimit::UNBOUNDED);
        assert_eq!(feed(&mut state, b"abc"), (Progress::Suspended, 3));
        assert_eq!(feed(&mut state, b"def"), (Progress::Suspended, 3));
        assert_eq!(
            state.close().unwrap(),
            Progress::Complete(Product::Token(b"abcdef".to_vec()))
        );
    }

    #[test]
    fn read_to_close_limit() {
        let limit = TokenLimit::new("body", 4, None);
        let mut state = Primitive::read_to_close(TokenLimit::UNBOUNDED).with_limit(limit);
        let mut cursor = ByteCursor::new(b"abcde");
        assert!(state.decode(&mut cursor).is_err());
    }

    #[test]
    fn close_does_not_complete_scanning_state() {
        let mut state = Primitive::consume_to_byte(b'\n');
        assert_eq!(feed(&mut state, b"abc"), (Progress::Suspended, 3));
        assert_eq!(state.close().unwrap(), Progress::Suspended);
    }

    #[test]
    fn idempotent_suspension() {
        let mut state = Primitive::consume_to_byte(b'\n');
        feed(&mut state, b"partial");
        for _ in 0..10 {
            assert_eq!(feed(&mut state, b""), (Progress::Suspended, 0));
        }
        match &state {
            Primitive::ConsumeToTerminator { buf, .. } => assert_eq!(buf, b"partial"),
            other => panic!("unexpected state: {other:?}"),
        }
    }
}
