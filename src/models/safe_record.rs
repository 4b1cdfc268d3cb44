//! Password-safe export model

/// A normalized record from the password-safe export
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SafeRecord {
    /// Login / user name
    pub login: String,

    /// The secret itself
    pub password: String,

    /// Site address
    pub url: String,

    /// Contact email stored with the entry
    pub email: String,

    /// Free-form notes
    pub notes: String,

    /// Revision counter (0 when the export has none)
    pub version: u32,

    /// Entry title, if the export carries one
    pub title: String,

    /// Dotted group path, if the export carries one
    pub group: String,
}

impl SafeRecord {
    /// Create a record with login and password
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
            ..Default::default()
        }
    }

    /// A short label for log lines (never includes the password)
    pub fn label(&self) -> String {
        match (self.group.is_empty(), self.title.is_empty()) {
            (_, true) => self.login.clone(),
            (true, false) => self.title.clone(),
            (false, false) => format!("{}.{}", self.group, self.title),
        }
    }
}
