use duckdb::{AccessMode, Config, Connection};
use r2d2::ManageConnection;

/// Pools read-only DuckDB connections. The chat path only ever reads, so
/// the database file is opened with write access disabled outright.
pub struct ReadOnlyDuckDbManager {
    connection_string: String,
}

impl ReadOnlyDuckDbManager {
    pub fn new(connection_string: String) -> Self {
        Self { connection_string }
    }
}

impl ManageConnection for ReadOnlyDuckDbManager {
    type Connection = Connection;
    type Error = duckdb::Error;

    fn connect(&self) -> Result<Self::Connection, Self::Error> {
        let config = Config::default().access_mode(AccessMode::ReadOnly)?;
        Connection::open_with_flags(&self.connection_string, config)
    }

    fn is_valid(&self, conn: &mut Self::Connection) -> Result<(), Self::Error> {
        conn.execute("SELECT 1", [])?;
        Ok(())
    }

    fn has_broken(&self, _conn: &mut Self::Connection) -> bool {
        false
    }
}
