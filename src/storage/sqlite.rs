//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the IndexStore trait.
//! Statement-level helpers take a plain `&Connection` so the same code runs
//! inside a single-operation transaction or inside a whole-page commit.

use crate::storage::schema::{initialize_schema, reset_schema};
use crate::storage::traits::{IndexStore, StorageError, StorageResult};
use crate::storage::{
    CrawlRunRecord, IndexCounts, LinkEdge, LinkGraph, Match, PageCommit, PageUpdate, RunStatus,
};
use crate::SearchError;
use chrono::Utc;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::collections::HashSet;
use std::path::Path;

/// SQLite index backend
pub struct SqliteIndex {
    conn: Connection,
}

impl SqliteIndex {
    /// Opens or creates an index database
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteIndex)` - Successfully opened/created database
    /// * `Err(SearchError)` - Failed to open database
    pub fn open(path: &Path) -> Result<Self, SearchError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
            PRAGMA mmap_size = 268435456;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Opens the database at `path` and leaves it with an empty schema
    ///
    /// With `force`, existing tables and their rows are dropped first.
    pub fn build(path: &Path, force: bool) -> Result<Self, SearchError> {
        let index = Self::open(path)?;
        if force {
            reset_schema(&index.conn)?;
        }
        Ok(index)
    }

    /// Creates an in-memory index (for tests and throwaway runs)
    pub fn new_in_memory() -> Result<Self, SearchError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

// ===== Statement helpers =====

fn url_id_in(conn: &Connection, url: &str) -> StorageResult<Option<i64>> {
    let id = conn
        .prepare_cached("SELECT id FROM url WHERE url = ?1")?
        .query_row(params![url], |row| row.get(0))
        .optional()?;
    Ok(id)
}

fn word_id_in(conn: &Connection, term: &str) -> StorageResult<Option<i64>> {
    let id = conn
        .prepare_cached("SELECT id FROM word WHERE word = ?1")?
        .query_row(params![term], |row| row.get(0))
        .optional()?;
    Ok(id)
}

fn get_or_create_url_in(conn: &Connection, url: &str) -> StorageResult<i64> {
    if let Some(id) = url_id_in(conn, url)? {
        return Ok(id);
    }
    conn.prepare_cached("INSERT INTO url (url) VALUES (?1)")?
        .execute(params![url])?;
    Ok(conn.last_insert_rowid())
}

fn get_or_create_word_in(conn: &Connection, term: &str) -> StorageResult<i64> {
    if let Some(id) = word_id_in(conn, term)? {
        return Ok(id);
    }
    conn.prepare_cached("INSERT INTO word (word) VALUES (?1)")?
        .execute(params![term])?;
    Ok(conn.last_insert_rowid())
}

fn is_indexed_in(conn: &Connection, url_id: i64) -> StorageResult<bool> {
    let exists: bool = conn
        .prepare_cached("SELECT EXISTS(SELECT 1 FROM word_location WHERE url_id = ?1)")?
        .query_row(params![url_id], |row| row.get(0))?;
    Ok(exists)
}

fn insert_postings_in(
    conn: &Connection,
    url_id: i64,
    terms: &[String],
    ignored_words: &HashSet<String>,
) -> StorageResult<usize> {
    let mut position: i64 = 0;

    for term in terms.iter().filter(|t| !ignored_words.contains(t.as_str())) {
        let word_id = get_or_create_word_in(conn, term)?;
        conn.prepare_cached(
            "INSERT INTO word_location (url_id, word_id, position) VALUES (?1, ?2, ?3)",
        )?
        .execute(params![url_id, word_id, position])?;
        tracing::trace!("posting url={} word={} position={}", url_id, term, position);
        position = position
            .checked_add(1)
            .ok_or(StorageError::PositionOverflow(url_id))?;
    }

    Ok(position as usize)
}

fn insert_link_in(
    conn: &Connection,
    from_id: i64,
    to_id: i64,
    anchor_terms: &[String],
) -> StorageResult<i64> {
    conn.prepare_cached("INSERT INTO link (from_id, to_id) VALUES (?1, ?2)")?
        .execute(params![from_id, to_id])?;
    let link_id = conn.last_insert_rowid();

    for term in anchor_terms {
        let word_id = get_or_create_word_in(conn, term)?;
        conn.prepare_cached("INSERT INTO link_words (link_id, word_id) VALUES (?1, ?2)")?
            .execute(params![link_id, word_id])?;
    }

    Ok(link_id)
}

fn delete_outbound_in(conn: &Connection, from_id: i64) -> StorageResult<usize> {
    conn.execute(
        "DELETE FROM link_words WHERE link_id IN (SELECT id FROM link WHERE from_id = ?1)",
        params![from_id],
    )?;
    let removed = conn.execute("DELETE FROM link WHERE from_id = ?1", params![from_id])?;
    Ok(removed)
}

fn count(conn: &Connection, sql: &str) -> StorageResult<u64> {
    let n: i64 = conn.query_row(sql, [], |row| row.get(0))?;
    Ok(n as u64)
}

fn crawl_run_from_row(row: &Row<'_>) -> rusqlite::Result<CrawlRunRecord> {
    let seeds: String = row.get(3)?;
    Ok(CrawlRunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        seeds: seeds.lines().map(str::to_string).collect(),
        depth: row.get(4)?,
        config_hash: row.get(5)?,
        pages_indexed: row.get::<_, i64>(6)? as u64,
        fetch_failures: row.get::<_, i64>(7)? as u64,
        status: RunStatus::from_db_string(&row.get::<_, String>(8)?)
            .unwrap_or(RunStatus::Failed),
    })
}

/// Builds the self-join for a conjunctive query over `terms` postings
fn conjunctive_sql(terms: usize) -> String {
    let mut columns = vec!["w0.url_id".to_string()];
    let mut tables = Vec::with_capacity(terms);
    let mut predicates = Vec::with_capacity(terms * 2);

    for i in 0..terms {
        columns.push(format!("w{i}.position"));
        tables.push(format!("word_location w{i}"));
        predicates.push(format!("w{i}.word_id = ?{}", i + 1));
        if i > 0 {
            predicates.push(format!("w{}.url_id = w{i}.url_id", i - 1));
        }
    }

    format!(
        "SELECT {} FROM {} WHERE {} ORDER BY w0.url_id",
        columns.join(", "),
        tables.join(", "),
        predicates.join(" AND ")
    )
}

impl IndexStore for SqliteIndex {
    // ===== URLs and Words =====

    fn get_or_create_url(&mut self, url: &str) -> StorageResult<i64> {
        get_or_create_url_in(&self.conn, url)
    }

    fn get_or_create_word(&mut self, term: &str) -> StorageResult<i64> {
        get_or_create_word_in(&self.conn, term)
    }

    fn url_id(&self, url: &str) -> StorageResult<Option<i64>> {
        url_id_in(&self.conn, url)
    }

    fn word_id(&self, term: &str) -> StorageResult<Option<i64>> {
        word_id_in(&self.conn, term)
    }

    fn url_for_id(&self, url_id: i64) -> StorageResult<String> {
        self.conn
            .prepare_cached("SELECT url FROM url WHERE id = ?1")?
            .query_row(params![url_id], |row| row.get(0))
            .optional()?
            .ok_or(StorageError::UrlNotFound(url_id))
    }

    // ===== Postings =====

    fn is_indexed(&self, url_id: i64) -> StorageResult<bool> {
        is_indexed_in(&self.conn, url_id)
    }

    fn add_postings(
        &mut self,
        url_id: i64,
        terms: &[String],
        ignored_words: &HashSet<String>,
    ) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;
        if is_indexed_in(&tx, url_id)? {
            return Ok(0);
        }
        let written = insert_postings_in(&tx, url_id, terms, ignored_words)?;
        tx.commit()?;
        Ok(written)
    }

    fn count_postings_for(&self, url_id: i64) -> StorageResult<u64> {
        let n: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM word_location WHERE url_id = ?1",
            params![url_id],
            |row| row.get(0),
        )?;
        Ok(n as u64)
    }

    // ===== Link Graph =====

    fn add_link(
        &mut self,
        from_url: &str,
        to_url: &str,
        anchor_terms: &[String],
    ) -> StorageResult<i64> {
        let tx = self.conn.transaction()?;
        let from_id = get_or_create_url_in(&tx, from_url)?;
        let to_id = get_or_create_url_in(&tx, to_url)?;
        let link_id = insert_link_in(&tx, from_id, to_id, anchor_terms)?;
        tx.commit()?;
        Ok(link_id)
    }

    fn inbound_count(&self, url_id: i64) -> StorageResult<u64> {
        let n: i64 = self
            .conn
            .prepare_cached("SELECT COUNT(*) FROM link WHERE to_id = ?1")?
            .query_row(params![url_id], |row| row.get(0))?;
        Ok(n as u64)
    }

    fn outbound_count(&self, url_id: i64) -> StorageResult<u64> {
        let n: i64 = self
            .conn
            .prepare_cached(
                "SELECT COUNT(DISTINCT to_id) FROM link WHERE from_id = ?1 AND from_id <> to_id",
            )?
            .query_row(params![url_id], |row| row.get(0))?;
        Ok(n as u64)
    }

    fn outgoing_links(&self, url_id: i64) -> StorageResult<Vec<LinkEdge>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, from_id, to_id FROM link WHERE from_id = ?1 ORDER BY id")?;

        let links = stmt
            .query_map(params![url_id], |row| {
                Ok(LinkEdge {
                    id: row.get(0)?,
                    from_id: row.get(1)?,
                    to_id: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(links)
    }

    fn link_words(&self, link_id: i64) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT w.word FROM link_words lw JOIN word w ON w.id = lw.word_id
             WHERE lw.link_id = ?1 ORDER BY lw.rowid",
        )?;

        let words = stmt
            .query_map(params![link_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(words)
    }

    fn link_graph(&self) -> StorageResult<LinkGraph> {
        let url_ids = self
            .conn
            .prepare("SELECT id FROM url ORDER BY id")?
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<i64>, _>>()?;

        let edges = self
            .conn
            .prepare("SELECT DISTINCT from_id, to_id FROM link")?
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<(i64, i64)>, _>>()?;

        Ok(LinkGraph::from_edges(url_ids, edges))
    }

    // ===== Page Commit =====

    fn commit_page(
        &mut self,
        update: &PageUpdate,
        ignored_words: &HashSet<String>,
    ) -> StorageResult<PageCommit> {
        let tx = self.conn.transaction()?;
        let url_id = get_or_create_url_in(&tx, &update.url)?;

        if is_indexed_in(&tx, url_id)? {
            tx.commit()?;
            return Ok(PageCommit::Skipped { url_id });
        }

        let replaced = delete_outbound_in(&tx, url_id)?;
        if replaced > 0 {
            tracing::debug!("Replacing {} earlier edges from {}", replaced, update.url);
        }

        for link in &update.links {
            let to_id = get_or_create_url_in(&tx, &link.url)?;
            insert_link_in(&tx, url_id, to_id, &link.anchor_terms)?;
        }

        let postings = insert_postings_in(&tx, url_id, &update.terms, ignored_words)?;
        tx.commit()?;

        Ok(PageCommit::Indexed {
            url_id,
            postings,
            links: update.links.len(),
        })
    }

    // ===== PageRank =====

    fn write_page_rank(&mut self, url_id: i64, score: f64) -> StorageResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO page_rank (url_id, score) VALUES (?1, ?2)",
            params![url_id, score],
        )?;
        Ok(())
    }

    fn read_page_rank(&self, url_id: i64) -> StorageResult<f64> {
        let score: Option<f64> = self
            .conn
            .prepare_cached("SELECT score FROM page_rank WHERE url_id = ?1")?
            .query_row(params![url_id], |row| row.get(0))
            .optional()?;
        Ok(score.unwrap_or(0.0))
    }

    fn replace_page_ranks(&mut self, scores: &[(i64, f64)]) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM page_rank", [])?;
        {
            let mut stmt = tx.prepare("INSERT INTO page_rank (url_id, score) VALUES (?1, ?2)")?;
            for (url_id, score) in scores {
                stmt.execute(params![url_id, score])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    // ===== Queries =====

    fn find_matches(&self, word_ids: &[i64]) -> StorageResult<Vec<Match>> {
        if word_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = conjunctive_sql(word_ids.len());
        let mut stmt = self.conn.prepare(&sql)?;
        let terms = word_ids.len();

        let matches = stmt
            .query_map(params_from_iter(word_ids.iter()), |row| {
                let positions = (1..=terms)
                    .map(|column| row.get(column))
                    .collect::<Result<Vec<i64>, _>>()?;
                Ok(Match {
                    url_id: row.get(0)?,
                    positions,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(matches)
    }

    // ===== Crawl Runs =====

    fn start_crawl_run(
        &mut self,
        seeds: &[String],
        depth: u32,
        config_hash: &str,
    ) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO crawl_runs (started_at, seeds, depth, config_hash, status)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                now,
                seeds.join("\n"),
                depth,
                config_hash,
                RunStatus::Running.to_db_string()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_crawl_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        pages_indexed: u64,
        fetch_failures: u64,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE crawl_runs SET status = ?1, finished_at = ?2, pages_indexed = ?3,
             fetch_failures = ?4 WHERE id = ?5",
            params![
                status.to_db_string(),
                now,
                pages_indexed as i64,
                fetch_failures as i64,
                run_id
            ],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_crawl_run(&self, run_id: i64) -> StorageResult<CrawlRunRecord> {
        self.conn
            .query_row(
                "SELECT id, started_at, finished_at, seeds, depth, config_hash,
                 pages_indexed, fetch_failures, status FROM crawl_runs WHERE id = ?1",
                params![run_id],
                crawl_run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn recent_crawl_runs(&self, limit: usize) -> StorageResult<Vec<CrawlRunRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, started_at, finished_at, seeds, depth, config_hash,
             pages_indexed, fetch_failures, status FROM crawl_runs ORDER BY id DESC LIMIT ?1",
        )?;

        let runs = stmt
            .query_map(params![limit as i64], crawl_run_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(runs)
    }

    // ===== Statistics =====

    fn counts(&self) -> StorageResult<IndexCounts> {
        Ok(IndexCounts {
            urls: count(&self.conn, "SELECT COUNT(*) FROM url")?,
            indexed_urls: count(
                &self.conn,
                "SELECT COUNT(DISTINCT url_id) FROM word_location",
            )?,
            words: count(&self.conn, "SELECT COUNT(*) FROM word")?,
            postings: count(&self.conn, "SELECT COUNT(*) FROM word_location")?,
            links: count(&self.conn, "SELECT COUNT(*) FROM link")?,
            ranked_urls: count(&self.conn, "SELECT COUNT(*) FROM page_rank")?,
        })
    }
}
