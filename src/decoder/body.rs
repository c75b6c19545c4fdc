//! ボディの区切り方の決定

use crate::error::DecodeFault;
use crate::limits::DecoderLimits;
use crate::status::StatusCode;
use crate::version::Version;

use super::primitive::{Primitive, TokenLimit};

/// ボディの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// ボディなし
    None,
    /// Content-Length で指定された固定長
    ContentLength(usize),
    /// 接続が閉じるまでがボディ (close-delimited)
    ///
    /// RFC 9112: レスポンスで Transfer-Encoding も Content-Length もない場合、
    /// 接続が閉じられるまでをボディとして扱う
    CloseDelimited,
}

impl BodyKind {
    /// ボディを読む状態を作成する
    ///
    /// ボディがない場合は `None`
    pub(crate) fn state(self, limits: &DecoderLimits) -> Option<Primitive> {
        match self {
            BodyKind::None | BodyKind::ContentLength(0) => None,
            BodyKind::ContentLength(len) => Some(Primitive::fixed_length(len)),
            BodyKind::CloseDelimited => Some(Primitive::read_to_close(TokenLimit::new(
                "body",
                limits.max_body_size,
                StatusCode::ContentTooLarge,
            ))),
        }
    }
}

/// リクエストのボディ種別を決定する
///
/// RFC 9112 Section 6.3: リクエストは close-delimited を使わない。
/// 転送コーディングには対応しないため、Transfer-Encoding は 501 で拒否する。
pub(crate) fn request_body_kind(
    version: Version,
    headers: &[(String, String)],
    limits: &DecoderLimits,
) -> Result<BodyKind, DecodeFault> {
    let content_length = parse_content_length(headers)?;
    if let Some(coding) = transfer_encoding(headers) {
        if content_length.is_some() {
            return Err(DecodeFault::bad_request(
                "invalid message: both Transfer-Encoding and Content-Length",
            ));
        }
        // RFC 9112 Section 6.1: HTTP/1.0 では Transfer-Encoding は定義されていない
        if version == Version::Http10 {
            return Err(DecodeFault::bad_request(
                "Transfer-Encoding is not defined in HTTP/1.0",
            ));
        }
        return Err(DecodeFault::unsupported(
            "transfer-coding",
            coding.as_bytes(),
            StatusCode::NotImplemented,
        ));
    }

    match content_length {
        Some(len) => fixed_length(len, limits),
        None => Ok(BodyKind::None),
    }
}

/// レスポンスのボディ種別を決定する
///
/// RFC 9112 Section 6.3 の優先順位に従う:
/// 1. HEAD レスポンス、1xx/204/304 はボディなし
/// 2. Transfer-Encoding は非対応
/// 3. Content-Length がある場合は固定長
/// 4. それ以外は close-delimited
pub(crate) fn response_body_kind(
    status_code: u16,
    expect_no_body: bool,
    headers: &[(String, String)],
    limits: &DecoderLimits,
) -> Result<BodyKind, DecodeFault> {
    let content_length = parse_content_length(headers)?;
    let coding = transfer_encoding(headers);
    if coding.is_some() && content_length.is_some() {
        return Err(DecodeFault::syntax(
            "invalid message: both Transfer-Encoding and Content-Length",
        ));
    }

    if expect_no_body || !status_has_body(status_code) {
        return Ok(BodyKind::None);
    }

    if let Some(coding) = coding {
        return Err(DecodeFault::unsupported(
            "transfer-coding",
            coding.as_bytes(),
            None,
        ));
    }

    match content_length {
        Some(len) => fixed_length(len, limits),
        None => Ok(BodyKind::CloseDelimited),
    }
}

/// 1xx, 204, 304 はボディなし
fn status_has_body(status_code: u16) -> bool {
    !((100..200).contains(&status_code) || status_code == 204 || status_code == 304)
}

fn fixed_length(len: usize, limits: &DecoderLimits) -> Result<BodyKind, DecodeFault> {
    if len > limits.max_body_size {
        return Err(DecodeFault::too_large(
            "body",
            len,
            limits.max_body_size,
            StatusCode::ContentTooLarge,
        ));
    }
    Ok(BodyKind::ContentLength(len))
}

/// 最初の Transfer-Encoding ヘッダーの値
fn transfer_encoding(headers: &[(String, String)]) -> Option<&str> {
    headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("Transfer-Encoding"))
        .map(|(_, value)| value.as_str())
}

/// Content-Length を解析する
///
/// 複数ある場合はすべて同じ値でなければならない。
pub(crate) fn parse_content_length(
    headers: &[(String, String)],
) -> Result<Option<usize>, DecodeFault> {
    let mut value: Option<usize> = None;
    for (name, raw_value) in headers {
        if name.eq_ignore_ascii_case("Content-Length") {
            let parsed = parse_content_length_value(raw_value)?;
            if let Some(prev) = value {
                if prev != parsed {
                    return Err(DecodeFault::bad_request(
                        "invalid Content-Length: mismatched values",
                    ));
                }
            } else {
                value = Some(parsed);
            }
        }
    }
    Ok(value)
}

fn parse_content_length_value(input: &str) -> Result<usize, DecodeFault> {
    let input = input.trim();
    if input.is_empty() || !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DecodeFault::bad_request(
            "invalid Content-Length: not a number",
        ));
    }
    input
        .parse::<usize>()
        .map_err(|_| DecodeFault::bad_request("invalid Content-Length: overflow"))
}
