pub mod claim_mapping;
pub mod claims;
pub mod ecosystem;
pub mod query;
pub mod role;
pub mod verification;
