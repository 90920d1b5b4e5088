//! Reconciliation tests against in-memory stores and runtimes.

mod support;
