//! Kinds of addresses and public keys.

/// Human readable part used when none is configured.
pub const DEFAULT_BECH32_HRP: &str = "link";

/// The role an address or public key plays, encoded in its bech32 prefix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyType {
    /// Regular account, no suffix.
    #[default]
    Account,
    /// Validator operator, `valoper` suffix.
    ValidatorOperator,
    /// Validator consensus key, `valcons` suffix.
    ValidatorConsensus,
}

impl KeyType {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 3] = [
        Self::Account,
        Self::ValidatorOperator,
        Self::ValidatorConsensus,
    ];

    /// Suffix appended to the base human readable part.
    pub const fn hrp_suffix(self) -> &'static str {
        match self {
            Self::Account => "",
            Self::ValidatorOperator => "valoper",
            Self::ValidatorConsensus => "valcons",
        }
    }

    /// Looks up the kind for a human readable part suffix.
    pub fn from_hrp_suffix(suffix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.hrp_suffix() == suffix)
    }

    /// Full human readable part for this kind under `hrp`.
    pub fn hrp(self, hrp: &str) -> String {
        format!("{hrp}{}", self.hrp_suffix())
    }
}
