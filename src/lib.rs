//! This library resolves the claims an OpenID Connect identity provider may
//! assert about a subject, from an administrator supplied [ClaimConfig] and
//! the result of a verifiable credential presentation ([SIOP]) or of an NFT
//! ownership verification.
//!
//! [ClaimConfig]: crate::config::ClaimConfig
//! [SIOP]: <https://openid.net/specs/openid-connect-self-issued-v2-1_0.html>
//!
//! # Usage
//!
//! ```ignore
//! use idp_claims::config::ClaimConfig;
//! use idp_claims::core::claim_mapping::AuthorizationMode;
//! use serde_json::Map;
//!
//! let config = ClaimConfig::load("config/claim-config.json")?;
//!
//! // Decide which challenge to issue for the granted scope.
//! let modes = config.authorization_modes_for_scope("profile");
//! if modes.contains(&AuthorizationMode::Siop) {
//!     let credential_types = config.credential_types_for_scope("profile");
//!     // Request a presentation of `credential_types` from the wallet.
//! }
//!
//! // Once the wallet response is verified, fill the ID token claims.
//! let mut claims = Map::new();
//! for mapping in config.mappings_for_scope("profile") {
//!     mapping.fill_claims(&verification_result, &mut claims)?;
//! }
//! ```
//!
//! # Claim Mappings
//!
//! - [VcClaimMapping] requires a presented credential of a given type and
//!   reads the claim value with one or more JSONPath expressions.
//! - [NftClaimMapping] reads a metadata trait of the verified NFT. Each chain
//!   ecosystem (EVM, Tezos, NEAR, Polkadot) has its own metadata schema,
//!   see [core::ecosystem].
//!
//! Both are exposed through the closed [ClaimMapping] enum. Claim mapping
//! performs no I/O and no cryptography.
//!
//! [VcClaimMapping]: crate::core::claim_mapping::VcClaimMapping
//! [NftClaimMapping]: crate::core::claim_mapping::NftClaimMapping
//! [ClaimMapping]: crate::core::claim_mapping::ClaimMapping
//! [core::ecosystem]: crate::core::ecosystem

pub mod config;
pub mod core;
pub mod utils;
pub use serde_json_path::JsonPath;
