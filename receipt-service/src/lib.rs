//! receipt-service: payment-receipt issuance and verification for the
//! booking platform.
//!
//! Receipts carry two human-readable codes (a receipt code and a
//! verification code shared with the fulfilling provider) and an integrity
//! hash binding the receipt's identity to its total. Verification by code is
//! public and read-only; status moves through an explicit transition table
//! (`pending -> paid -> verified`, or rejection from the non-terminal
//! states).

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
