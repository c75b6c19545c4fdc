//! デコード状態の定義

use crate::error::DecodeFault;

use super::cursor::ByteCursor;

/// デコードの進捗
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress<T> {
    /// データ不足
    ///
    /// カーソルのバイトはすべて消費済みで、途中までのトークンは状態が保持している。
    /// 次のチャンクで同じ状態をもう一度呼ぶ。
    Suspended,
    /// 完了
    ///
    /// 後続のバイトはカーソルに残っている。
    Complete(T),
}

impl<T> Progress<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Progress<U> {
        match self {
            Progress::Suspended => Progress::Suspended,
            Progress::Complete(value) => Progress::Complete(f(value)),
        }
    }
}

/// デコード状態
///
/// 状態はチャンクをまたいで部分トークンを所有する。
/// I/O は行わず、サスペンドは戻り値で表現する。
pub trait DecodingState {
    type Output;

    /// カーソルのバイトを消費する
    fn decode(&mut self, cursor: &mut ByteCursor<'_>) -> Result<Progress<Self::Output>, DecodeFault>;

    /// 入力の終端 (接続クローズ) を通知する
    ///
    /// デフォルトでは完了しない。
    fn close(&mut self) -> Result<Progress<Self::Output>, DecodeFault> {
        Ok(Progress::Suspended)
    }
}
