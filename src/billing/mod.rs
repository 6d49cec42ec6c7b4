//! Billing previews for the Rate Cascade Engine.
//!
//! Turns the worklogs of a billing period into priced line items using the
//! rate cascade. Rendering, taxes and invoice storage are left to callers.

mod preview;

pub use preview::{UNASSIGNED_CLIENT, ZERO_DEFAULT_RATE_WARNING, compute_billing_preview};
