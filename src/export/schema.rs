//! Database schema definitions
//!
//! Tables hold authoritative data and are written exactly once, inside the
//! export transaction. Views are derived conveniences built after data load
//! and can be rebuilt at any time without loss.

/// Bumped whenever a table shape changes incompatibly
pub const SCHEMA_VERSION: &str = "1";

/// SQL to create the identity table.
/// One row per symbolic reference key; ids are never reused or reassigned.
pub const CREATE_REFID_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS refid (
    rowid INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    refid TEXT NOT NULL UNIQUE
)
"#;

/// SQL to create the file path pool, deduplicated by exact path
pub const CREATE_FILE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS file (
    rowid INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    name  TEXT NOT NULL UNIQUE
)
"#;

/// SQL to create the compound attribute table.
/// One row per compound id, all categories share it.
pub const CREATE_COMPOUND_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS compound (
    rowid               INTEGER PRIMARY KEY NOT NULL,
    name                TEXT NOT NULL,
    title               TEXT,
    kind                TEXT NOT NULL,
    prot                INTEGER,
    file_id             INTEGER,
    line                INTEGER,
    column              INTEGER,
    briefdescription    TEXT,
    detaileddescription TEXT,
    FOREIGN KEY (rowid) REFERENCES refid (rowid)
)
"#;

/// SQL to create the member attribute table.
///
/// completeness: 1 declaration half seen, 2 definition half seen, 3 both.
/// Declaration location columns are nullable so a definition-first member
/// can be completed by a later merge.
pub const CREATE_MEMBER_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS member (
    rowid               INTEGER PRIMARY KEY NOT NULL,
    name                TEXT NOT NULL,
    kind                INTEGER NOT NULL,
    prot                INTEGER DEFAULT 0,
    static              INTEGER DEFAULT 0,
    const               INTEGER DEFAULT 0,
    explicit            INTEGER DEFAULT 0,
    inline              INTEGER DEFAULT 0,
    final               INTEGER DEFAULT 0,
    sealed              INTEGER DEFAULT 0,
    new                 INTEGER DEFAULT 0,
    optional            INTEGER DEFAULT 0,
    required            INTEGER DEFAULT 0,
    volatile            INTEGER DEFAULT 0,
    virt                INTEGER DEFAULT 0,
    mutable             INTEGER DEFAULT 0,
    initonly            INTEGER DEFAULT 0,
    attribute           INTEGER DEFAULT 0,
    property            INTEGER DEFAULT 0,
    readonly            INTEGER DEFAULT 0,
    bound               INTEGER DEFAULT 0,
    constrained         INTEGER DEFAULT 0,
    transient           INTEGER DEFAULT 0,
    maybevoid           INTEGER DEFAULT 0,
    maybedefault        INTEGER DEFAULT 0,
    maybeambiguous      INTEGER DEFAULT 0,
    readable            INTEGER DEFAULT 0,
    writable            INTEGER DEFAULT 0,
    gettable            INTEGER DEFAULT 0,
    privategettable     INTEGER DEFAULT 0,
    protectedgettable   INTEGER DEFAULT 0,
    settable            INTEGER DEFAULT 0,
    privatesettable     INTEGER DEFAULT 0,
    protectedsettable   INTEGER DEFAULT 0,
    accessor            INTEGER DEFAULT 0,
    addable             INTEGER DEFAULT 0,
    removable           INTEGER DEFAULT 0,
    raisable            INTEGER DEFAULT 0,
    definition          TEXT,
    type                TEXT,
    argsstring          TEXT,
    scope               TEXT,
    initializer         TEXT,
    bitfield            TEXT,
    read                TEXT,
    write               TEXT,
    bodystart           INTEGER,
    bodyend             INTEGER,
    bodyfile_id         INTEGER,
    file_id             INTEGER,
    line                INTEGER,
    column              INTEGER,
    briefdescription    TEXT,
    detaileddescription TEXT,
    inbodydescription   TEXT,
    completeness        INTEGER NOT NULL,
    FOREIGN KEY (rowid) REFERENCES refid (rowid)
)
"#;

/// SQL to create the inclusion graph
pub const CREATE_INCLUDES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS includes (
    rowid  INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    local  INTEGER NOT NULL,
    src_id INTEGER NOT NULL,
    dst_id INTEGER NOT NULL,
    UNIQUE(local, src_id, dst_id) ON CONFLICT IGNORE
)
"#;

/// SQL to create the containment graph.
/// Generalizes all inner/outer nesting; the endpoint kinds are recovered by
/// joining to the compound table.
pub const CREATE_CONTAINS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS contains (
    rowid    INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    inner_id INTEGER NOT NULL REFERENCES refid,
    outer_id INTEGER NOT NULL REFERENCES refid,
    UNIQUE(inner_id, outer_id) ON CONFLICT IGNORE
)
"#;

/// SQL to create the inheritance graph.
/// Both traversal directions emit the same logical edge; the pair constraint
/// keeps one row.
pub const CREATE_INHERITS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS inherits (
    rowid        INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    base_id      INTEGER NOT NULL REFERENCES refid,
    derived_id   INTEGER NOT NULL REFERENCES refid,
    base_name    TEXT NOT NULL,
    derived_name TEXT NOT NULL,
    prot         INTEGER NOT NULL,
    virt         INTEGER NOT NULL,
    UNIQUE(base_id, derived_id) ON CONFLICT IGNORE
)
"#;

/// SQL to create the reimplementation graph
pub const CREATE_REIMPLEMENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS reimplements (
    rowid            INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    member_id        INTEGER NOT NULL REFERENCES refid,
    reimplemented_id INTEGER NOT NULL REFERENCES refid,
    UNIQUE(member_id, reimplemented_id) ON CONFLICT IGNORE
)
"#;

/// SQL to create the cross-reference graph.
/// The same pair may be linked once per context.
pub const CREATE_XREFS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS xrefs (
    rowid   INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    src_id  INTEGER NOT NULL REFERENCES refid,
    dst_id  INTEGER NOT NULL REFERENCES refid,
    context TEXT NOT NULL,
    UNIQUE(src_id, dst_id, context) ON CONFLICT IGNORE
)
"#;

/// SQL to create the membership graph: every scope a member is documented in
pub const CREATE_MEMBER_SCOPE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS member_scope (
    rowid           INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    scope_id        INTEGER NOT NULL REFERENCES refid,
    member_id       INTEGER NOT NULL REFERENCES refid,
    prot            INTEGER NOT NULL,
    virt            INTEGER NOT NULL,
    ambiguity_scope TEXT,
    UNIQUE(scope_id, member_id) ON CONFLICT IGNORE
)
"#;

/// SQL to create the shared parameter pool
pub const CREATE_PARAM_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS param (
    rowid            INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    attributes       TEXT,
    type             TEXT,
    declname         TEXT,
    defname          TEXT,
    array            TEXT,
    defval           TEXT,
    briefdescription TEXT
)
"#;

/// SQL to create the member/parameter junction table
pub const CREATE_MEMBER_PARAM_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS member_param (
    rowid     INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    member_id INTEGER NOT NULL,
    param_id  INTEGER NOT NULL,
    UNIQUE(member_id, param_id) ON CONFLICT IGNORE
)
"#;

/// SQL to create the metadata table, a single row per database
pub const CREATE_META_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS meta (
    rowid             INTEGER PRIMARY KEY NOT NULL,
    generator         TEXT NOT NULL,
    generator_version TEXT NOT NULL,
    schema_version    TEXT NOT NULL,
    generated_at      TEXT NOT NULL,
    project           TEXT NOT NULL
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_param ON param(type, defname)",
    "CREATE INDEX IF NOT EXISTS idx_compound_name ON compound(name)",
    "CREATE INDEX IF NOT EXISTS idx_compound_kind ON compound(kind)",
    "CREATE INDEX IF NOT EXISTS idx_member_name ON member(name)",
    "CREATE INDEX IF NOT EXISTS idx_member_kind ON member(kind)",
    "CREATE INDEX IF NOT EXISTS idx_member_file ON member(file_id)",
    "CREATE INDEX IF NOT EXISTS idx_xrefs_src ON xrefs(src_id)",
    "CREATE INDEX IF NOT EXISTS idx_xrefs_dst ON xrefs(dst_id)",
    "CREATE INDEX IF NOT EXISTS idx_contains_outer ON contains(outer_id)",
    "CREATE INDEX IF NOT EXISTS idx_member_scope_scope ON member_scope(scope_id)",
];

/// SQL to create the summary view: compounds and members unified
pub const CREATE_SUMMARY_VIEW: &str = r#"
CREATE VIEW IF NOT EXISTS summary AS
SELECT c.rowid AS rowid, r.refid AS refid, 'compound' AS category,
       c.kind AS kind, c.name AS name, c.file_id AS file_id,
       c.line AS line, c.briefdescription AS briefdescription
  FROM compound c JOIN refid r ON r.rowid = c.rowid
UNION ALL
SELECT m.rowid, r.refid, 'member',
       m.kind, m.name, m.file_id, m.line, m.briefdescription
  FROM member m JOIN refid r ON r.rowid = m.rowid
"#;

/// SQL to create the per-context cross-reference views
pub const CREATE_XREF_VIEWS: &[&str] = &[
    r#"
CREATE VIEW IF NOT EXISTS xref_inline AS
SELECT x.rowid AS rowid, src.refid AS src_refid, dst.refid AS dst_refid
  FROM xrefs x
  JOIN refid src ON src.rowid = x.src_id
  JOIN refid dst ON dst.rowid = x.dst_id
 WHERE x.context = 'inline'
"#,
    r#"
CREATE VIEW IF NOT EXISTS xref_argument AS
SELECT x.rowid AS rowid, src.refid AS src_refid, dst.refid AS dst_refid
  FROM xrefs x
  JOIN refid src ON src.rowid = x.src_id
  JOIN refid dst ON dst.rowid = x.dst_id
 WHERE x.context = 'argument'
"#,
    r#"
CREATE VIEW IF NOT EXISTS xref_initializer AS
SELECT x.rowid AS rowid, src.refid AS src_refid, dst.refid AS dst_refid
  FROM xrefs x
  JOIN refid src ON src.rowid = x.src_id
  JOIN refid dst ON dst.rowid = x.dst_id
 WHERE x.context = 'initializer'
"#,
];

/// SQL to create the containment convenience view
pub const CREATE_CONTAINMENT_VIEW: &str = r#"
CREATE VIEW IF NOT EXISTS containment AS
SELECT co.inner_id AS inner_id, ic.name AS inner_name, ic.kind AS inner_kind,
       co.outer_id AS outer_id, oc.name AS outer_name, oc.kind AS outer_kind
  FROM contains co
  JOIN compound ic ON ic.rowid = co.inner_id
  JOIN compound oc ON oc.rowid = co.outer_id
"#;

/// All table and index creation statements, in dependency order
pub fn all_table_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_REFID_TABLE,
        CREATE_FILE_TABLE,
        CREATE_COMPOUND_TABLE,
        CREATE_MEMBER_TABLE,
        CREATE_INCLUDES_TABLE,
        CREATE_CONTAINS_TABLE,
        CREATE_INHERITS_TABLE,
        CREATE_REIMPLEMENTS_TABLE,
        CREATE_XREFS_TABLE,
        CREATE_MEMBER_SCOPE_TABLE,
        CREATE_PARAM_TABLE,
        CREATE_MEMBER_PARAM_TABLE,
        CREATE_META_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}

/// All view creation statements
pub fn all_view_statements() -> Vec<&'static str> {
    let mut stmts = vec![CREATE_SUMMARY_VIEW];
    stmts.extend(CREATE_XREF_VIEWS.iter().copied());
    stmts.push(CREATE_CONTAINMENT_VIEW);
    stmts
}
