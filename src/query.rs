//! Query engine - read-side helpers over an exported database
//!
//! Everything here goes through the derived views where one exists, so the
//! answers stay stable even if the table layout gains columns.

use rusqlite::Connection;

use crate::kinds::XrefContext;
use crate::Result;

/// One row of the unified compound/member summary view
#[derive(Debug, Clone)]
pub struct SummaryRow {
    pub refid: String,
    pub category: String,
    pub name: String,
    pub brief: Option<String>,
}

/// One cross-reference edge with its endpoint keys resolved
#[derive(Debug, Clone)]
pub struct XrefRow {
    pub src_refid: String,
    pub dst_refid: String,
}

/// Query engine over an exported documentation graph
pub struct QueryEngine<'a> {
    conn: &'a Connection,
}

impl<'a> QueryEngine<'a> {
    /// Create a new query engine
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// List entities, optionally filtered by a name pattern (SQL LIKE)
    pub fn summary(&self, pattern: Option<&str>, limit: usize) -> Result<Vec<SummaryRow>> {
        let like = pattern
            .map(|p| if p.contains('%') { p.to_string() } else { format!("%{}%", p) })
            .unwrap_or_else(|| "%".to_string());

        let mut stmt = self.conn.prepare(
            "SELECT refid, category, name, briefdescription FROM summary \
             WHERE name LIKE ?1 ORDER BY name LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(rusqlite::params![like, limit as i64], |row| {
                Ok(SummaryRow {
                    refid: row.get(0)?,
                    category: row.get(1)?,
                    name: row.get(2)?,
                    brief: row.get(3)?,
                })
            })?
            .filter_map(|r| r.ok())
            .collect();
        Ok(rows)
    }

    /// Cross-references leaving a symbol, in one context
    pub fn xrefs_from(&self, refid: &str, context: XrefContext) -> Result<Vec<XrefRow>> {
        let sql = format!(
            "SELECT src_refid, dst_refid FROM xref_{} WHERE src_refid = ?1",
            context.as_str()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([refid], |row| {
                Ok(XrefRow { src_refid: row.get(0)?, dst_refid: row.get(1)? })
            })?
            .filter_map(|r| r.ok())
            .collect();
        Ok(rows)
    }

    /// Names of the compounds directly nested inside the given one
    pub fn contained_in(&self, outer_refid: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT ct.inner_name FROM containment ct \
             JOIN refid r ON r.rowid = ct.outer_id WHERE r.refid = ?1 \
             ORDER BY ct.inner_name",
        )?;
        let names = stmt
            .query_map([outer_refid], |row| row.get(0))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(names)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<GraphStats> {
        Ok(GraphStats {
            identities: self.count("refid")?,
            compounds: self.count("compound")?,
            members: self.count("member")?,
            files: self.count("file")?,
            includes: self.count("includes")?,
            contains: self.count("contains")?,
            inherits: self.count("inherits")?,
            reimplements: self.count("reimplements")?,
            xrefs: self.count("xrefs")?,
            memberships: self.count("member_scope")?,
            params: self.count("param")?,
        })
    }

    fn count(&self, table: &str) -> Result<i64> {
        let count: i64 =
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
        Ok(count)
    }
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct GraphStats {
    pub identities: i64,
    pub compounds: i64,
    pub members: i64,
    pub files: i64,
    pub includes: i64,
    pub contains: i64,
    pub inherits: i64,
    pub reimplements: i64,
    pub xrefs: i64,
    pub memberships: i64,
    pub params: i64,
}

impl std::fmt::Display for GraphStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Graph Statistics:")?;
        writeln!(f, "  Identities: {}", self.identities)?;
        writeln!(f, "  Compounds: {}", self.compounds)?;
        writeln!(f, "  Members: {}", self.members)?;
        writeln!(f, "  Files: {}", self.files)?;
        writeln!(f, "  Includes: {}", self.includes)?;
        writeln!(f, "  Containment: {}", self.contains)?;
        writeln!(f, "  Inheritance: {}", self.inherits)?;
        writeln!(f, "  Reimplementations: {}", self.reimplements)?;
        writeln!(f, "  Cross-references: {}", self.xrefs)?;
        writeln!(f, "  Memberships: {}", self.memberships)?;
        writeln!(f, "  Parameters: {}", self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{ExportSession, Exporter};
    use crate::kinds::{CompoundKind, MemberKind, Protection};
    use crate::model::*;
    use crate::render::PlainRenderer;

    fn small_model() -> DocModel {
        let mut demo = Compound {
            key: "classDemo".into(),
            name: "Demo".into(),
            kind: CompoundKind::Class,
            title: None,
            protection: Some(Protection::Public),
            location: None,
            brief: Some("a class".into()),
            detailed: None,
            members: vec![],
            inner: vec![],
            bases: vec![],
            derived: vec![],
            includes: vec![],
            included_by: vec![],
            include_info: None,
            template_parameters: vec![],
            is_external: false,
            is_hidden: false,
            is_template_instance: false,
        };
        demo.members = vec![Member {
            key: "classDemo_1a01".into(),
            name: "run".into(),
            kind: MemberKind::Function,
            protection: Protection::Public,
            is_static: false,
            traits: Default::default(),
            type_text: Some("void".into()),
            definition: None,
            args_string: None,
            scope: Some("Demo".into()),
            initializer: None,
            location: Some(Location { file: "demo.h".into(), line: 3, column: 1 }),
            body: None,
            brief: None,
            detailed: None,
            inbody: None,
            parameters: vec![],
            template_parameters: vec![],
            references: vec!["classOther_1a02".into()],
            referenced_by: vec![],
            reimplements: vec![],
            reimplemented_by: vec![],
            enum_values: vec![],
            ambiguity_scope: None,
            is_hidden: false,
            is_external: false,
        }];

        let mut ns = Compound {
            key: "namespaceN".into(),
            name: "N".into(),
            kind: CompoundKind::Namespace,
            ..demo.clone()
        };
        ns.members = vec![];
        ns.inner = vec![InnerRef { key: "classDemo".into(), name: "Demo".into(), is_hidden: false }];

        DocModel { project: "q".into(), compounds: vec![demo, ns], main_page: None }
    }

    fn exported_conn() -> rusqlite::Connection {
        let renderer = PlainRenderer;
        let exporter = Exporter::new(ExportSession::open_in_memory().unwrap(), &renderer);
        exporter.export(&small_model()).unwrap().into_connection()
    }

    #[test]
    fn test_summary_and_stats() {
        let conn = exported_conn();
        let engine = QueryEngine::new(&conn);

        let stats = engine.stats().unwrap();
        assert_eq!(stats.compounds, 2);
        assert_eq!(stats.members, 1);
        assert_eq!(stats.xrefs, 1);

        let rows = engine.summary(Some("Demo"), 10).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].category, "compound");

        let all = engine.summary(None, 10).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_xrefs_from() {
        let conn = exported_conn();
        let engine = QueryEngine::new(&conn);

        let refs = engine.xrefs_from("classDemo_1a01", XrefContext::Inline).unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].dst_refid, "classOther_1a02");
        assert!(engine.xrefs_from("classDemo_1a01", XrefContext::Argument).unwrap().is_empty());
    }

    #[test]
    fn test_contained_in() {
        let conn = exported_conn();
        let engine = QueryEngine::new(&conn);
        let inner = engine.contained_in("namespaceN").unwrap();
        assert_eq!(inner, vec!["Demo".to_string()]);
    }
}
