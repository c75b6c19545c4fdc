use thiserror::Error;

use crate::status::StatusCode;

/// デコード失敗
///
/// データ不足 (サスペンド) はエラーではなく `Progress::Suspended` で表現する。
/// このエラーはメッセージ単位で致命的で、デコーダーはリセットされるまで入力を受け付けない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeFault {
    /// 文法違反 (空のリクエストターゲット、CRLF がない等)
    #[error("syntax error: {message}")]
    Syntax {
        message: String,
        status: Option<StatusCode>,
    },
    /// トークンは存在するが既知の集合に含まれない (メソッド、バージョン等)
    #[error("unsupported {field}: {token:?}")]
    Unsupported {
        field: &'static str,
        token: String,
        status: Option<StatusCode>,
    },
    /// 制限超過
    #[error("{what} too large: {size} > {limit}")]
    TooLarge {
        what: &'static str,
        size: usize,
        limit: usize,
        status: Option<StatusCode>,
    },
}

impl DecodeFault {
    /// ステータスなしの文法エラー
    pub fn syntax(message: impl Into<String>) -> Self {
        DecodeFault::Syntax {
            message: message.into(),
            status: None,
        }
    }

    /// 400 Bad Request を伴う文法エラー
    pub fn bad_request(message: impl Into<String>) -> Self {
        DecodeFault::Syntax {
            message: message.into(),
            status: Some(StatusCode::BadRequest),
        }
    }

    pub fn unsupported(
        field: &'static str,
        token: &[u8],
        status: impl Into<Option<StatusCode>>,
    ) -> Self {
        DecodeFault::Unsupported {
            field,
            token: String::from_utf8_lossy(token).into_owned(),
            status: status.into(),
        }
    }

    pub fn too_large(
        what: &'static str,
        size: usize,
        limit: usize,
        status: impl Into<Option<StatusCode>>,
    ) -> Self {
        DecodeFault::TooLarge {
            what,
            size,
            limit,
            status: status.into(),
        }
    }

    /// ピアに返すべきステータスコード
    ///
    /// `None` の場合は応答せずに接続を閉じる。
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            DecodeFault::Syntax { status, .. }
            | DecodeFault::Unsupported { status, .. }
            | DecodeFault::TooLarge { status, .. } => *status,
        }
    }

    /// ステータスを取り除く
    ///
    /// レスポンス側のデコード失敗はピアに応答しない。
    pub(crate) fn without_status(self) -> Self {
        match self {
            DecodeFault::Syntax { message, .. } => DecodeFault::Syntax {
                message,
                status: None,
            },
            DecodeFault::Unsupported { field, token, .. } => DecodeFault::Unsupported {
                field,
                token,
                status: None,
            },
            DecodeFault::TooLarge {
                what, size, limit, ..
            } => DecodeFault::TooLarge {
                what,
                size,
                limit,
                status: None,
            },
        }
    }
}
