//! Accounts, addresses and wallets for the Finschia chain.
//!
//! ```rust,ignore
//! use finschia_account::{HdWallet, Wallet};
//!
//! finschia_crypto::init()?;
//! let hd = HdWallet::from_mnemonic(phrase);
//! let wallet = hd.key_wallet(0, 0)?;
//! println!("{}", wallet.address());
//! let signature = wallet.sign(&digest)?;
//! ```

pub mod address;
pub mod config;
pub mod errors;
pub mod hd_wallet;
pub mod key_type;
pub mod pub_key;
pub mod wallet;


pub use address::Address;
pub use config::SdkConfig;
pub use errors::ConfigError;
pub use finschia_crypto::KeyError;
pub use hd_wallet::HdWallet;
pub use key_type::{KeyType, DEFAULT_BECH32_HRP};
pub use pub_key::{PubKey, TypedValue};
pub use wallet::{KeyWallet, Wallet};
