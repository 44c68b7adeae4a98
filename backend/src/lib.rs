//! Signup and referral state engine for the Subx waitlist.
//!
//! The crate follows a hexagonal layout: `domain` owns the registrant model,
//! validation rules, referral codes, and the registration store; `outbound`
//! implements the ports the domain declares; `inbound` hosts the CLI that
//! drives the engine.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;
