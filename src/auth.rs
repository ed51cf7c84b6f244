//! Auth-domain models: bearer tokens, audiences, and token review results.

pub mod audience;
pub mod review;
pub mod token;

pub use audience::*;
pub use review::*;
pub use token::*;
