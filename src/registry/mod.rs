pub mod error;
pub mod types;

pub use error::{RegistryError, RegistryResult};
pub use types::{PoolMeta, ProtocolFamily};

use std::collections::HashMap;

use alloy_primitives::Address;

/// Static `pool → metadata` table, built once at manager construction and
/// never mutated afterwards. Per-family required fields are validated here
/// so adapters can rely on the shape of the metadata they receive.
#[derive(Debug, Default)]
pub struct PoolRegistry {
    pools: HashMap<Address, PoolMeta>,
}

impl PoolRegistry {
    pub fn new(entries: Vec<(Address, PoolMeta)>) -> RegistryResult<Self> {
        let mut pools = HashMap::with_capacity(entries.len());
        for (pool, meta) in entries {
            validate_meta(pool, &meta)?;
            if pools.insert(pool, meta).is_some() {
                return Err(RegistryError::DuplicatePool(pool));
            }
        }
        Ok(Self { pools })
    }

    pub fn meta(&self, pool: Address) -> Option<&PoolMeta> {
        self.pools.get(&pool)
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }
}

fn validate_meta(pool: Address, meta: &PoolMeta) -> RegistryResult<()> {
    if !(5..=100).contains(&meta.tolerance_bp) {
        return Err(RegistryError::ToleranceOutOfRange {
            pool,
            tolerance_bp: meta.tolerance_bp,
        });
    }
    match meta.family {
        ProtocolFamily::StableSwap => {
            if meta.tokens.len() < 2 {
                return Err(RegistryError::MissingField {
                    pool,
                    field: "tokens",
                });
            }
        }
        ProtocolFamily::Booster => {
            if meta.staking_id.is_none() {
                return Err(RegistryError::MissingField {
                    pool,
                    field: "staking_id",
                });
            }
            if meta.reward_contract.is_none() {
                return Err(RegistryError::MissingField {
                    pool,
                    field: "reward_contract",
                });
            }
        }
        ProtocolFamily::Lending | ProtocolFamily::Gauge => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lending_meta() -> PoolMeta {
        PoolMeta {
            family: ProtocolFamily::Lending,
            tokens: Vec::new(),
            staking_id: None,
            reward_contract: None,
            reward_tokens: Vec::new(),
            tolerance_bp: 10,
        }
    }

    #[test]
    fn lookup_returns_registered_meta() {
        let pool = Address::repeat_byte(0x01);
        let registry = PoolRegistry::new(vec![(pool, lending_meta())]).expect("valid registry");
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.meta(pool).expect("registered pool").family,
            ProtocolFamily::Lending
        );
        assert!(registry.meta(Address::repeat_byte(0x02)).is_none());
    }

    #[test]
    fn duplicate_pool_is_rejected() {
        let pool = Address::repeat_byte(0x01);
        let err = PoolRegistry::new(vec![(pool, lending_meta()), (pool, lending_meta())])
            .expect_err("duplicate must fail");
        assert_eq!(err, RegistryError::DuplicatePool(pool));
    }

    #[test]
    fn booster_without_staking_id_is_rejected() {
        let pool = Address::repeat_byte(0x03);
        let meta = PoolMeta {
            family: ProtocolFamily::Booster,
            reward_contract: Some(Address::repeat_byte(0x04)),
            ..lending_meta()
        };
        let err = PoolRegistry::new(vec![(pool, meta)]).expect_err("missing pid must fail");
        assert_eq!(
            err,
            RegistryError::MissingField {
                pool,
                field: "staking_id"
            }
        );
    }

    #[test]
    fn stable_swap_needs_at_least_two_coins() {
        let pool = Address::repeat_byte(0x05);
        let meta = PoolMeta {
            family: ProtocolFamily::StableSwap,
            tokens: vec![Address::repeat_byte(0x06)],
            ..lending_meta()
        };
        let err = PoolRegistry::new(vec![(pool, meta)]).expect_err("single coin must fail");
        assert_eq!(
            err,
            RegistryError::MissingField {
                pool,
                field: "tokens"
            }
        );
    }

    #[test]
    fn tolerance_outside_curated_range_is_rejected() {
        let pool = Address::repeat_byte(0x07);
        let meta = PoolMeta {
            tolerance_bp: 250,
            ..lending_meta()
        };
        let err = PoolRegistry::new(vec![(pool, meta)]).expect_err("tolerance must fail");
        assert_eq!(
            err,
            RegistryError::ToleranceOutOfRange {
                pool,
                tolerance_bp: 250
            }
        );
    }
}
