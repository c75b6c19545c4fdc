//! 合成ステートマシン
//!
//! 子状態を遷移関数でつなぎ、全体を 1 つの [`DecodingState`] として扱う。
//! 子状態にはプリミティブ状態だけでなく他のステートマシンも使えるため、
//! ヘッダー行デコーダーをヘッダーブロックデコーダーに、
//! ヘッダーブロックデコーダーをメッセージデコーダーに入れ子にできる。

use crate::error::DecodeFault;

use super::cursor::ByteCursor;
use super::state::{DecodingState, Progress};

/// 遷移先
#[derive(Debug)]
pub enum Transition<S, T> {
    /// 次の子状態
    Next(S),
    /// ステートマシン完了
    Done(T),
}

/// ステートマシンの定義
///
/// 現在どの子状態にいるかは実装側が保持する。
/// `transition` は子状態の生成値を受け取り、次の子状態を選ぶ (分岐も可能)。
pub trait Machine {
    type State: DecodingState;
    type Output;

    /// 最初の子状態
    fn init(&mut self) -> Self::State;

    /// 子状態の完了を受けて次の遷移先を決める
    fn transition(
        &mut self,
        product: <Self::State as DecodingState>::Output,
    ) -> Result<Transition<Self::State, Self::Output>, DecodeFault>;

    /// 完了またはデコード失敗時に 1 回だけ呼ばれる
    ///
    /// メッセージ単位の作業領域を解放する。
    fn destroy(&mut self) {}
}

/// [`Machine`] を駆動する状態
///
/// 子状態を 1 つだけ所有する。完了またはデコード失敗の後は
/// `init()` からやり直すため、次のメッセージに前のメッセージの状態は残らない。
#[derive(Debug)]
pub struct DecodingStateMachine<M: Machine> {
    machine: M,
    current: Option<M::State>,
}

impl<M: Machine> DecodingStateMachine<M> {
    pub fn new(machine: M) -> Self {
        Self {
            machine,
            current: None,
        }
    }

    pub fn machine(&self) -> &M {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut M {
        &mut self.machine
    }

    /// 子状態が生成済みか (メッセージの途中か)
    pub fn is_started(&self) -> bool {
        self.current.is_some()
    }

    /// 途中の状態を破棄して `init()` に戻す
    pub fn reset(&mut self) {
        if self.current.take().is_some() {
            self.machine.destroy();
        }
    }

    /// 子状態の完了を遷移関数に渡す
    ///
    /// 完了した場合は `Some` を返す
    fn advance(
        &mut self,
        product: <M::State as DecodingState>::Output,
    ) -> Result<Option<M::Output>, DecodeFault> {
        match self.machine.transition(product) {
            Ok(Transition::Next(next)) => {
                self.current = Some(next);
                Ok(None)
            }
            Ok(Transition::Done(output)) => {
                self.current = None;
                self.machine.destroy();
                Ok(Some(output))
            }
            Err(fault) => {
                self.current = None;
                self.machine.destroy();
                Err(fault)
            }
        }
    }

    fn fail(&mut self, fault: DecodeFault) -> DecodeFault {
        self.current = None;
        self.machine.destroy();
        fault
    }
}

impl<M: Machine> DecodingState for DecodingStateMachine<M> {
    type Output = M::Output;

    fn decode(&mut self, cursor: &mut ByteCursor<'_>) -> Result<Progress<M::Output>, DecodeFault> {
        loop {
            let machine = &mut self.machine;
            let child = self.current.get_or_insert_with(|| machine.init());
            let product = match child.decode(cursor) {
                Ok(Progress::Suspended) => return Ok(Progress::Suspended),
                Ok(Progress::Complete(product)) => product,
                Err(fault) => return Err(self.fail(fault)),
            };
            // 残りのバイトは同じ呼び出しのまま次の子状態に渡す
            if let Some(output) = self.advance(product)? {
                return Ok(Progress::Complete(output));
            }
        }
    }

    fn close(&mut self) -> Result<Progress<M::Output>, DecodeFault> {
        loop {
            let Some(child) = self.current.as_mut() else {
                return Ok(Progress::Suspended);
            };
            let product = match child.close() {
                Ok(Progress::Suspended) => return Ok(Progress::Suspended),
                Ok(Progress::Complete(product)) => product,
                Err(fault) => return Err(self.fail(fault)),
            };
            if let Some(output) = self.advance(product)? {
                return Ok(Progress::Complete(output));
            }
        }
    }
}
