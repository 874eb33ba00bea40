use super::error::{PlanError, PlanResult};
use super::types::{CallArg, CallDescriptor, Plan, SymbolicValue, ValueSlot, ValueTag};

/// Forward-only plan accumulator.
///
/// Calls are appended in execution order; appending a result-producing call
/// returns a [`SymbolicValue`] that later calls may consume as an argument.
/// The builder never inspects call semantics; it only enforces the single
/// ordering invariant: a value may be referenced only by calls appended
/// after its producer. Violations are adapter bugs and abort the build
/// rather than yielding a partially valid plan.
#[derive(Debug, Default)]
pub struct PlanBuilder {
    calls: Vec<CallDescriptor>,
    values: Vec<ValueSlot>,
}

impl PlanBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.len()
    }

    /// Append a call executed only for effect.
    pub fn append_void(&mut self, call: CallDescriptor) -> PlanResult<()> {
        self.check_args(&call.args)?;
        self.calls.push(call);
        Ok(())
    }

    /// Append a result-producing call and obtain the handle to its eventual
    /// return value. Values are assigned in strictly increasing append order.
    pub fn append(&mut self, call: CallDescriptor, tag: ValueTag) -> PlanResult<SymbolicValue> {
        self.check_args(&call.args)?;
        let producer = self.calls.len() as u32;
        self.calls.push(call);
        let index = self.values.len() as u32;
        self.values.push(ValueSlot { producer, tag });
        Ok(SymbolicValue::new(index, tag))
    }

    pub fn finish(self) -> Plan {
        Plan::new(self.calls, self.values)
    }

    fn check_args(&self, args: &[CallArg]) -> PlanResult<()> {
        let call = self.calls.len();
        for arg in args {
            match arg {
                CallArg::Value { value, expects } => {
                    let Some(slot) = self.values.get(value.index() as usize) else {
                        return Err(PlanError::ForwardReference {
                            call,
                            value: value.index(),
                        });
                    };
                    if slot.tag != *expects {
                        return Err(PlanError::TagMismatch {
                            call,
                            value: value.index(),
                            expected: *expects,
                            actual: slot.tag,
                        });
                    }
                }
                CallArg::Array(inner) => self.check_args(inner)?,
                _ => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{Address, U256};

    use super::*;

    fn query(target: Address) -> CallDescriptor {
        CallDescriptor::new(target, "balanceOf(address)").with_arg(Address::ZERO)
    }

    #[test]
    fn append_assigns_values_in_order() {
        let mut builder = PlanBuilder::new();
        let first = builder
            .append(query(Address::ZERO), ValueTag::Amount)
            .expect("first append");
        let second = builder
            .append(query(Address::ZERO), ValueTag::Amount)
            .expect("second append");
        assert_eq!(first.index(), 0);
        assert_eq!(second.index(), 1);

        let plan = builder.finish();
        assert_eq!(plan.call_count(), 2);
        assert_eq!(plan.values()[1].producer, 1);
    }

    #[test]
    fn consuming_an_earlier_value_is_accepted() {
        let mut builder = PlanBuilder::new();
        let balance = builder
            .append(query(Address::ZERO), ValueTag::Amount)
            .expect("balance query");
        builder
            .append_void(
                CallDescriptor::new(Address::ZERO, "deposit(uint256)")
                    .with_arg(CallArg::amount(balance)),
            )
            .expect("deposit consumes balance");
    }

    #[test]
    fn forward_reference_is_rejected() {
        let mut builder = PlanBuilder::new();
        let foreign = SymbolicValue::new(3, ValueTag::Amount);
        let err = builder
            .append_void(
                CallDescriptor::new(Address::ZERO, "deposit(uint256)")
                    .with_arg(CallArg::amount(foreign)),
            )
            .expect_err("unproduced value must be rejected");
        assert_eq!(err, PlanError::ForwardReference { call: 0, value: 3 });
    }

    #[test]
    fn tag_mismatch_is_rejected() {
        let mut builder = PlanBuilder::new();
        let asset = builder
            .append(
                CallDescriptor::new(Address::ZERO, "asset()"),
                ValueTag::Address,
            )
            .expect("asset query");
        let err = builder
            .append_void(
                CallDescriptor::new(Address::ZERO, "deposit(uint256)")
                    .with_arg(CallArg::amount(asset)),
            )
            .expect_err("address value in amount slot must be rejected");
        assert!(matches!(err, PlanError::TagMismatch { .. }));
    }

    #[test]
    fn nested_array_args_are_checked() {
        let mut builder = PlanBuilder::new();
        let foreign = SymbolicValue::new(9, ValueTag::Amount);
        let err = builder
            .append_void(
                CallDescriptor::new(Address::ZERO, "add_liquidity(uint256[],uint256)")
                    .with_arg(CallArg::Array(vec![
                        CallArg::Uint(U256::ZERO),
                        CallArg::amount(foreign),
                    ]))
                    .with_arg(U256::ZERO),
            )
            .expect_err("forward reference inside array must be rejected");
        assert!(matches!(err, PlanError::ForwardReference { .. }));
    }

    #[test]
    fn producer_lookup_resolves_the_originating_call() {
        let mut builder = PlanBuilder::new();
        let token = Address::repeat_byte(0x11);
        let balance = builder
            .append(query(token), ValueTag::Amount)
            .expect("balance query");
        let plan = builder.finish();
        let producer = plan.producer_of(balance).expect("producer present");
        assert_eq!(producer.target, token);
        assert_eq!(producer.signature, "balanceOf(address)");
    }
}
