//! # Attack Simulations
//!
//! A dishonest peer speaks the exchange protocol by hand and offers
//! transactions an honest wallet would never build.

pub mod double_spend;
