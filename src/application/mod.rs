//! Application layer containing the checkout orchestration.
//!
//! This module defines the `PaymentFacade`, the single entry point the
//! checkout flow uses to start, reconcile, capture and refund transactions.

pub mod facade;
