use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::error::Error;
use std::str::FromStr;
use std::time::Duration;

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(url: &str) -> Result<Self, Box<dyn Error>> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true)
            // WAL permite leituras concorrentes com um escritor
            .journal_mode(SqliteJournalMode::Wal)
            // Escritores concorrentes esperam em vez de falhar com SQLITE_BUSY
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(20)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await?;

        let database = Self { pool };
        database.ensure_schema().await?;

        Ok(database)
    }

    /// Creates tables and indexes if they do not exist yet
    async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        log::info!("🔧 Initializing database schema...");

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                name TEXT NOT NULL,
                role TEXT NOT NULL CHECK (role IN ('mentor', 'mentee')),
                bio TEXT,
                profile_image BLOB,
                skills TEXT,
                is_matched INTEGER DEFAULT 0,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
        )
        .execute(&self.pool)
        .await?;
        log::info!("   ✅ Table ready: users");

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS match_requests (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                mentor_id INTEGER NOT NULL,
                mentee_id INTEGER NOT NULL,
                message TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending' CHECK (status IN ('pending', 'accepted', 'rejected', 'cancelled')),
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (mentor_id) REFERENCES users(id),
                FOREIGN KEY (mentee_id) REFERENCES users(id),
                UNIQUE(mentor_id, mentee_id)
            )",
        )
        .execute(&self.pool)
        .await?;
        log::info!("   ✅ Table ready: match_requests");

        let indexes = [
            "CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)",
            "CREATE INDEX IF NOT EXISTS idx_users_role ON users(role)",
            "CREATE INDEX IF NOT EXISTS idx_match_requests_mentor ON match_requests(mentor_id)",
            "CREATE INDEX IF NOT EXISTS idx_match_requests_mentee ON match_requests(mentee_id)",
            "CREATE INDEX IF NOT EXISTS idx_match_requests_status ON match_requests(status)",
        ];

        for statement in indexes {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        log::info!("   ✅ Indexes ready");

        log::info!("✅ Database schema ready");

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Banco em memória com conexão única, para testes
    #[cfg(test)]
    pub async fn open_in_memory() -> Result<Self, Box<dyn Error>> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let database = Self { pool };
        database.ensure_schema().await?;

        Ok(database)
    }
}
