//! Export driver - sequences one full export run
//!
//! Schema creation and statement preparation are one-shot and must both
//! succeed before traversal begins. The traversal itself visits entity
//! categories in a fixed order; identities are created lazily on demand, so
//! the order only decides which category first creates a shared id. The
//! whole run lives inside one transaction: it either commits completely or
//! leaves nothing behind.

use std::path::Path;
use tracing::info;

use super::compound;
use super::schema::SCHEMA_VERSION;
use super::session::ExportSession;
use super::{best_effort, EmitContext};
use crate::model::DocModel;
use crate::render::TextRenderer;
use crate::Result;

pub(crate) const META_INSERT: &str = "INSERT OR REPLACE INTO meta \
     (rowid, generator, generator_version, schema_version, generated_at, project) \
     VALUES (1, 'docgraph', ?1, ?2, ?3, ?4)";

pub(crate) const STATEMENTS: &[&str] = &[META_INSERT];

/// Drives one export of a documentation model into one database.
pub struct Exporter<'a> {
    session: ExportSession,
    renderer: &'a dyn TextRenderer,
}

impl<'a> Exporter<'a> {
    pub fn new(session: ExportSession, renderer: &'a dyn TextRenderer) -> Self {
        Self { session, renderer }
    }

    /// Open a database file and wrap it in an exporter
    pub fn open(path: &Path, renderer: &'a dyn TextRenderer) -> Result<Self> {
        Ok(Self::new(ExportSession::open(path)?, renderer))
    }

    /// Run the full export. On success the returned session is committed;
    /// on failure the transaction is rolled back and nothing was published.
    pub fn export(mut self, model: &DocModel) -> Result<ExportSession> {
        match self.run(model) {
            Ok(()) => Ok(self.session),
            Err(e) => {
                self.session.fail();
                Err(e)
            }
        }
    }

    fn run(&mut self, model: &DocModel) -> Result<()> {
        self.session.create_schema()?;
        self.session.prepare_statements()?;
        self.session.begin()?;
        self.session.begin_traversal()?;
        self.traverse(model);
        self.write_meta(model)?;
        self.session.create_views()?;
        self.session.commit()?;
        info!(project = %model.project, "export committed");
        Ok(())
    }

    /// Fixed category order: classes, namespaces, files, groups, pages,
    /// directories, examples, main page.
    fn traverse(&self, model: &DocModel) {
        use crate::kinds::CompoundKind::*;

        let ctx = EmitContext { session: &self.session, renderer: self.renderer };

        for cd in model.compounds_of(|k| k.is_class_like()) {
            info!("exporting class {}", cd.name);
            best_effort("compound", &cd.key, compound::emit_compound(&ctx, cd));
        }
        for cd in model.compounds_of(|k| k == Namespace) {
            info!("exporting namespace {}", cd.name);
            best_effort("compound", &cd.key, compound::emit_compound(&ctx, cd));
        }
        for cd in model.compounds_of(|k| k == File) {
            info!("exporting file {}", cd.name);
            best_effort("compound", &cd.key, compound::emit_compound(&ctx, cd));
        }
        for cd in model.compounds_of(|k| k == Group) {
            info!("exporting group {}", cd.name);
            best_effort("compound", &cd.key, compound::emit_compound(&ctx, cd));
        }
        for cd in model.compounds_of(|k| k == Page) {
            info!("exporting page {}", cd.name);
            best_effort("compound", &cd.key, compound::emit_compound(&ctx, cd));
        }
        for cd in model.compounds_of(|k| k == Dir) {
            info!("exporting dir {}", cd.name);
            best_effort("compound", &cd.key, compound::emit_compound(&ctx, cd));
        }
        for cd in model.compounds_of(|k| k == Example) {
            info!("exporting example {}", cd.name);
            best_effort("compound", &cd.key, compound::emit_compound(&ctx, cd));
        }
        if let Some(main) = &model.main_page {
            info!("exporting the main page");
            best_effort("compound", &main.key, compound::emit_compound(&ctx, main));
        }
    }

    fn write_meta(&self, model: &DocModel) -> Result<()> {
        self.session.stmt(META_INSERT)?.execute(rusqlite::params![
            env!("CARGO_PKG_VERSION"),
            SCHEMA_VERSION,
            chrono::Utc::now().to_rfc3339(),
            model.project,
        ])?;
        Ok(())
    }
}
