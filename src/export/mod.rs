//! Export pipeline
//!
//! The driver walks the documentation model in a fixed category order and
//! hands every entity to its emitter. Emitters resolve identities through
//! the registry, defer re-observed members to the merge resolver, and emit
//! relation edges once both endpoints exist. Everything runs inside one
//! transaction owned by the session.

pub mod schema;
pub mod session;
pub mod identity;
pub mod merge;
pub mod relations;
pub mod compound;
pub mod member;
pub mod driver;

pub use driver::Exporter;
pub use identity::{RefId, Resolution};
pub use session::{ExportSession, SessionState};

use crate::render::TextRenderer;
use tracing::warn;

/// The fixed statement set, prepared one-shot before traversal begins
pub(crate) fn statement_set() -> Vec<&'static str> {
    let mut set = Vec::new();
    set.extend_from_slice(identity::STATEMENTS);
    set.extend_from_slice(merge::STATEMENTS);
    set.extend_from_slice(relations::STATEMENTS);
    set.extend_from_slice(compound::STATEMENTS);
    set.extend_from_slice(member::STATEMENTS);
    set.extend_from_slice(driver::STATEMENTS);
    set
}

/// Shared emitter context for one export run.
pub(crate) struct EmitContext<'a> {
    pub session: &'a ExportSession,
    pub renderer: &'a dyn TextRenderer,
}

impl EmitContext<'_> {
    /// Render an optional text field for storage
    pub fn render_opt(&self, scope_key: &str, text: &Option<String>) -> Option<crate::render::Rendered> {
        text.as_deref().map(|t| self.renderer.render(scope_key, t))
    }
}

/// Row-scoped failures are logged and skipped; the export continues with the
/// remaining entities.
pub(crate) fn best_effort(what: &str, key: &str, result: crate::Result<()>) {
    if let Err(e) = result {
        warn!(entity = key, error = %e, "skipping {}", what);
    }
}
