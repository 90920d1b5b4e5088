//! Application services: catalog resolution and platform reconciliation.

mod reconciler;
mod resolver;
mod side_files;

pub use reconciler::{
    ApplyError, ReconcileError, ReconcileReport, ReconcileResult, Reconciler,
};
pub use resolver::{ResolveError, ResolveResult, RunRequestResolver};
pub use side_files::{SideFileEntry, render_side_files, side_file_entries, side_file_path};
