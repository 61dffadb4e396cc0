//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the search index.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Every URL seen, as a crawl target or a link endpoint
CREATE TABLE IF NOT EXISTS url (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE
);

CREATE INDEX IF NOT EXISTS idx_url_url ON url(url);

-- Every lower-cased term seen in page text or anchor text
CREATE TABLE IF NOT EXISTS word (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    word TEXT NOT NULL UNIQUE
);

CREATE INDEX IF NOT EXISTS idx_word_word ON word(word);

-- Postings: one row per term occurrence
CREATE TABLE IF NOT EXISTS word_location (
    url_id INTEGER NOT NULL REFERENCES url(id),
    word_id INTEGER NOT NULL REFERENCES word(id),
    position INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_word_location_word ON word_location(word_id);
CREATE INDEX IF NOT EXISTS idx_word_location_url ON word_location(url_id);

-- Link graph; duplicate edges are allowed
CREATE TABLE IF NOT EXISTS link (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    from_id INTEGER NOT NULL REFERENCES url(id),
    to_id INTEGER NOT NULL REFERENCES url(id)
);

CREATE INDEX IF NOT EXISTS idx_link_from ON link(from_id);
CREATE INDEX IF NOT EXISTS idx_link_to ON link(to_id);

-- Anchor text words per edge
CREATE TABLE IF NOT EXISTS link_words (
    link_id INTEGER NOT NULL REFERENCES link(id),
    word_id INTEGER NOT NULL REFERENCES word(id)
);

CREATE INDEX IF NOT EXISTS idx_link_words_link ON link_words(link_id);

-- Steady-state PageRank per URL, rewritten on every computation
CREATE TABLE IF NOT EXISTS page_rank (
    url_id INTEGER PRIMARY KEY REFERENCES url(id),
    score REAL NOT NULL
);

-- Crawl run bookkeeping
CREATE TABLE IF NOT EXISTS crawl_runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    seeds TEXT NOT NULL,
    depth INTEGER NOT NULL,
    config_hash TEXT NOT NULL,
    pages_indexed INTEGER NOT NULL DEFAULT 0,
    fetch_failures INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL
);
"#;

/// Drops every index table, children first
const DROP_SQL: &str = r#"
DROP TABLE IF EXISTS crawl_runs;
DROP TABLE IF EXISTS page_rank;
DROP TABLE IF EXISTS link_words;
DROP TABLE IF EXISTS link;
DROP TABLE IF EXISTS word_location;
DROP TABLE IF EXISTS word;
DROP TABLE IF EXISTS url;
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

/// Drops all tables and recreates an empty schema
pub fn reset_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(DROP_SQL)?;
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

/// Gets the current schema version
pub fn get_schema_version() -> u32 {
    1
}
