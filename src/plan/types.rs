use alloy_primitives::{Address, U256};
use serde::Serialize;
use smallvec::SmallVec;

/// 值槽类型标签，防止把金额喂进期待地址的参数位。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueTag {
    Amount,
    Address,
}

/// Handle into a plan's value table: "the result of call N, known only at
/// execution time". Valid as an argument only for calls appended after the
/// producing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SymbolicValue {
    index: u32,
    tag: ValueTag,
}

impl SymbolicValue {
    pub(crate) fn new(index: u32, tag: ValueTag) -> Self {
        Self { index, tag }
    }

    pub fn index(&self) -> u32 {
        self.index
    }
}

/// One argument of a call descriptor: a literal, or a reference to a value
/// produced earlier in the same plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallArg {
    Address(Address),
    Uint(U256),
    Int(i128),
    Bool(bool),
    Array(Vec<CallArg>),
    Value {
        value: SymbolicValue,
        expects: ValueTag,
    },
}

impl CallArg {
    /// Reference a previously produced value, declaring the tag the
    /// argument position expects.
    pub fn value(value: SymbolicValue, expects: ValueTag) -> Self {
        CallArg::Value { value, expects }
    }

    pub fn amount(value: SymbolicValue) -> Self {
        CallArg::value(value, ValueTag::Amount)
    }
}

impl From<Address> for CallArg {
    fn from(value: Address) -> Self {
        CallArg::Address(value)
    }
}

impl From<U256> for CallArg {
    fn from(value: U256) -> Self {
        CallArg::Uint(value)
    }
}

impl From<bool> for CallArg {
    fn from(value: bool) -> Self {
        CallArg::Bool(value)
    }
}

pub type CallArgs = SmallVec<[CallArg; 4]>;

/// 单条底层调用：目标合约、函数签名与参数元组。编码为具体链上调用格式
/// 由外部编码器负责，这里只描述形状。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallDescriptor {
    pub target: Address,
    pub signature: &'static str,
    pub args: CallArgs,
}

impl CallDescriptor {
    pub fn new(target: Address, signature: &'static str) -> Self {
        Self {
            target,
            signature,
            args: CallArgs::new(),
        }
    }

    pub fn with_arg(mut self, arg: impl Into<CallArg>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// One slot of the plan's value table: which call produced it and what it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValueSlot {
    pub producer: u32,
    pub tag: ValueTag,
}

/// 编译完成、不可再变的执行计划。调用严格按追加顺序执行。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    calls: Vec<CallDescriptor>,
    values: Vec<ValueSlot>,
}

impl Plan {
    pub(crate) fn new(calls: Vec<CallDescriptor>, values: Vec<ValueSlot>) -> Self {
        Self { calls, values }
    }

    pub fn calls(&self) -> &[CallDescriptor] {
        &self.calls
    }

    pub fn values(&self) -> &[ValueSlot] {
        &self.values
    }

    pub fn call_count(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// The call that produced a given symbolic value.
    pub fn producer_of(&self, value: SymbolicValue) -> Option<&CallDescriptor> {
        let slot = self.values.get(value.index() as usize)?;
        self.calls.get(slot.producer as usize)
    }
}
