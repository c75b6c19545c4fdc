use std::fmt;

/// デコード失敗時にピアへ返すステータスコード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// 400
    BadRequest,
    /// 413
    ContentTooLarge,
    /// 414
    UriTooLong,
    /// 431
    RequestHeaderFieldsTooLarge,
    /// 501
    NotImplemented,
    /// 505
    HttpVersionNotSupported,
}

impl StatusCode {
    pub fn code(self) -> u16 {
        match self {
            StatusCode::BadRequest => 400,
            StatusCode::ContentTooLarge => 413,
            StatusCode::UriTooLong => 414,
            StatusCode::RequestHeaderFieldsTooLarge => 431,
            StatusCode::NotImplemented => 501,
            StatusCode::HttpVersionNotSupported => 505,
        }
    }

    /// RFC 9110 Section 15 の reason-phrase
    pub fn reason_phrase(self) -> &'static str {
        match self {
            StatusCode::BadRequest => "Bad Request",
            StatusCode::ContentTooLarge => "Content Too Large",
            StatusCode::UriTooLong => "URI Too Long",
            StatusCode::RequestHeaderFieldsTooLarge => "Request Header Fields Too Large",
            StatusCode::NotImplemented => "Not Implemented",
            StatusCode::HttpVersionNotSupported => "HTTP Version Not Supported",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.reason_phrase())
    }
}
