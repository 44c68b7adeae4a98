//! Inbound adapters that translate external requests into waitlist service
//! calls while keeping transport details at the edge.
//!
//! The command-line interface lives under [`cli`].

pub mod cli;
