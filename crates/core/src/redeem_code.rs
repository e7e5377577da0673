//! Redeem code value object and generator.

use core::fmt;

use rand::{Rng, distr::Alphanumeric};
use serde::{Deserialize, Serialize};

/// Public identifier of an airdrop job.
///
/// Opaque short string; uniqueness is enforced by the store at create time,
/// not by the generator (see [`RedeemCode::generate`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RedeemCode(String);

impl RedeemCode {
    /// Code length issued by the service.
    pub const LENGTH: usize = 6;

    /// Wrap an existing code (e.g. one taken from a request path).
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Draw `len` characters uniformly, with replacement, from the
    /// 62-character alphanumeric alphabet.
    ///
    /// Not globally unique: at length 6 the space is ~5.7e10, so callers
    /// inserting at volume must re-check against the store and retry on
    /// collision. `len == 0` yields the empty code.
    pub fn generate(len: usize) -> Self {
        let code = rand::rng()
            .sample_iter(Alphanumeric)
            .take(len)
            .map(char::from)
            .collect();
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RedeemCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RedeemCode {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn generates_requested_length() {
        assert_eq!(RedeemCode::generate(RedeemCode::LENGTH).as_str().len(), 6);
        assert_eq!(RedeemCode::generate(10).as_str().len(), 10);
    }

    #[test]
    fn zero_length_yields_empty_code() {
        assert_eq!(RedeemCode::generate(0).as_str(), "");
    }

    proptest! {
        #[test]
        fn alphabet_is_alphanumeric(len in 0usize..64) {
            let code = RedeemCode::generate(len);
            prop_assert_eq!(code.as_str().len(), len);
            prop_assert!(code.as_str().chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }
}
