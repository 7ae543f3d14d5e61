//! Persistent local store, the authoritative home of news articles.
//!
//! News never touches the remote backend: articles are created, updated and
//! deleted here, and the in-memory news cache is populated by reading this
//! store in full.

use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

use crate::error::Result;
use crate::models::NewsItem;

/// Schema for the news collection, keyed by the client-generated identifier.
const NEWS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS news (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    category TEXT NOT NULL,
    image TEXT,
    date TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_news_date ON news(date);
"#;

/// SQLite-backed news store behind a connection mutex.
pub struct NewsStore {
  conn: Mutex<Connection>,
}

impl NewsStore {
  /// Open or create the store inside `dir`.
  pub fn open(dir: &Path) -> Result<Self> {
    std::fs::create_dir_all(dir)
      .map_err(|e| crate::error::Error::Config(format!("failed to create data directory: {}", e)))?;

    let conn = Connection::open(dir.join("news.db"))?;
    let store = Self {
      conn: Mutex::new(conn),
    };
    store.run_migrations()?;
    Ok(store)
  }

  /// In-memory store for tests.
  pub fn open_in_memory() -> Result<Self> {
    let store = Self {
      conn: Mutex::new(Connection::open_in_memory()?),
    };
    store.run_migrations()?;
    Ok(store)
  }

  fn run_migrations(&self) -> Result<()> {
    self.lock().execute_batch(NEWS_SCHEMA)?;
    Ok(())
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
    self.conn.lock().unwrap_or_else(|e| e.into_inner())
  }

  /// Full collection, newest first (publication date descending, id as the
  /// tiebreak) so repeated reads are stable regardless of insertion order.
  pub fn list_all(&self) -> Result<Vec<NewsItem>> {
    let conn = self.lock();
    let mut stmt = conn.prepare(
      "SELECT id, title, content, category, image, date FROM news
       ORDER BY date DESC, id",
    )?;

    let items = stmt
      .query_map([], |row| {
        Ok(NewsItem {
          id: row.get(0)?,
          title: row.get(1)?,
          content: row.get(2)?,
          category: row.get(3)?,
          image: row.get(4)?,
          date: row.get(5)?,
        })
      })?
      .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(items)
  }

  pub fn insert(&self, item: &NewsItem) -> Result<()> {
    self.lock().execute(
      "INSERT INTO news (id, title, content, category, image, date)
       VALUES (?, ?, ?, ?, ?, ?)",
      params![
        item.id,
        item.title,
        item.content,
        item.category,
        item.image,
        item.date
      ],
    )?;
    Ok(())
  }

  /// Replace the stored row for `item.id`. Updating an absent id is a no-op,
  /// matching the forgiving write semantics of the original object store.
  pub fn update(&self, item: &NewsItem) -> Result<()> {
    self.lock().execute(
      "UPDATE news SET title = ?, content = ?, category = ?, image = ?, date = ?
       WHERE id = ?",
      params![
        item.title,
        item.content,
        item.category,
        item.image,
        item.date,
        item.id
      ],
    )?;
    Ok(())
  }

  pub fn delete_by_id(&self, id: &str) -> Result<()> {
    self.lock().execute("DELETE FROM news WHERE id = ?", params![id])?;
    Ok(())
  }
}
