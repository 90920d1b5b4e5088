//! Deployment service tests against the in-memory stores and adapters.

mod support;
