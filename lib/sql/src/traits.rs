use crate::error::SQLError;

/// A dynamically-typed SQL parameter value.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

/// A row returned from a SQL query — column name to value.
#[derive(Debug, Clone)]
pub struct Row {
    pub columns: Vec<(String, Value)>,
}

impl Row {
    /// Get a column value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Get a text column value by name.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(Value::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Get an integer column value by name.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.get(name) {
            Some(Value::Integer(i)) => Some(*i),
            _ => None,
        }
    }
}

/// Statement execution surface shared by a store and an open transaction.
///
/// Inside [`SQLStore::with_tx`] the closure receives a `&dyn SQLConn`
/// whose statements all belong to the same transaction. A statement
/// failing with [`SQLError::Constraint`] leaves the transaction usable;
/// the caller may branch on the conflict and keep going.
pub trait SQLConn {
    /// Execute a query and return rows.
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, SQLError>;

    /// Execute a statement (INSERT/UPDATE/DELETE) and return affected row count.
    fn exec(&self, sql: &str, params: &[Value]) -> Result<u64, SQLError>;
}

/// SQLStore provides a SQL execution interface backed by an embedded database.
///
/// Single statements run through `query`/`exec` in autocommit mode.
/// Multi-statement mutations go through `with_tx`: the closure's
/// statements commit together, or roll back together if it returns an
/// error. Partial application is not possible.
pub trait SQLStore: Send + Sync {
    /// Execute a query and return rows.
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, SQLError>;

    /// Execute a statement (INSERT/UPDATE/DELETE) and return affected row count.
    fn exec(&self, sql: &str, params: &[Value]) -> Result<u64, SQLError>;

    /// Run `f` inside a single transaction.
    ///
    /// Commits if `f` returns `Ok`, rolls back everything otherwise
    /// (including when the caller unwinds mid-way). The transaction takes
    /// a write lock up front, so concurrent `with_tx` calls from other
    /// processes serialize at the storage layer rather than racing.
    fn with_tx(
        &self,
        f: &mut dyn FnMut(&dyn SQLConn) -> Result<(), SQLError>,
    ) -> Result<(), SQLError>;
}
