//! Password-store entry model
//!
//! A decrypted entry from the encrypted password store, normalized into
//! named fields.

/// A normalized password-store entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassRecord {
    /// Path segments from the store root to the entry (the last one is the name)
    pub path: Vec<String>,

    /// Login / user name
    pub login: String,

    /// The secret itself
    pub password: String,

    /// Site address
    pub url: String,

    /// Free-form description
    pub description: String,

    /// Everything else in the entry, line order preserved
    pub notes: String,
}

impl PassRecord {
    /// Create a record for `path` with the given password
    pub fn new<I, S>(path: I, password: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into_iter().map(Into::into).collect(),
            password: password.into(),
            ..Default::default()
        }
    }

    /// Set the login
    pub fn with_login(mut self, login: impl Into<String>) -> Self {
        self.login = login.into();
        self
    }

    /// Set the URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Entry name (last path segment)
    pub fn name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or("")
    }

    /// Full path joined with `/`
    pub fn full_path(&self) -> String {
        self.path.join("/")
    }

    /// Description and notes as one column
    ///
    /// The two are separated by a newline only when both are present.
    pub fn comment(&self) -> String {
        match (self.description.is_empty(), self.notes.is_empty()) {
            (true, _) => self.notes.clone(),
            (false, true) => self.description.clone(),
            (false, false) => format!("{}\n{}", self.description, self.notes),
        }
    }

    /// Parse decrypted entry text in the pass convention
    ///
    /// The first line is the password. Later `key: value` lines for known
    /// keys fill login, url and description; every other line goes to notes.
    pub fn parse_entry(path: Vec<String>, text: &str) -> Self {
        let mut lines = text.lines();
        let mut record = Self {
            path,
            password: lines.next().unwrap_or("").trim_end_matches('\r').to_string(),
            ..Default::default()
        };

        let mut notes: Vec<&str> = Vec::new();
        for raw in lines {
            let line = raw.trim_end_matches('\r');
            let slot = match line.split_once(':') {
                Some((key, value)) => match key.trim().to_ascii_lowercase().as_str() {
                    "login" | "user" | "username" => Some((&mut record.login, value)),
                    "url" | "website" => Some((&mut record.url, value)),
                    "description" => Some((&mut record.description, value)),
                    _ => None,
                },
                None => None,
            };

            match slot {
                // First occurrence wins; repeats are kept in notes
                Some((field, value)) if field.is_empty() => *field = value.trim().to_string(),
                _ => notes.push(line),
            }
        }

        while notes.last().is_some_and(|l| l.trim().is_empty()) {
            notes.pop();
        }
        record.notes = notes.join("\n");
        record
    }
}
