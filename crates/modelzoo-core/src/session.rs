//! Caller session
//!
//! Carries the connection string used to reach the table-blob backend.
//! The credential fields ride along for backends that need them; none of
//! the backends in this workspace read them.

use modelzoo_core_types::Sensitive;

#[derive(Debug, Clone, Default)]
pub struct Session {
    /// e.g. `sqlite3:///var/lib/modelzoo/models.db`
    pub db_conn_str: String,
    pub user_id: String,
    pub token: Sensitive<String>,
}

impl Session {
    pub fn new(db_conn_str: impl Into<String>) -> Self {
        Self {
            db_conn_str: db_conn_str.into(),
            ..Self::default()
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Sensitive::new(token.into());
        self
    }
}
