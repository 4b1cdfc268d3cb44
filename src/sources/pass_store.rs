//! Reader for an age-encrypted password store
//!
//! Each entry is a `<name>.age` file somewhere under the store root,
//! encrypted to the owner's x25519 identity. The decrypted text follows the
//! pass convention (password on the first line, then optional metadata).

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::crypto::{decrypt_with_identity, Keyring};
use crate::error::{BackupError, BackupResult};
use crate::models::PassRecord;

use super::{Credential, PassSource};

const ENTRY_EXT: &str = "age";

/// An age-encrypted password store on disk
#[derive(Debug, Clone)]
pub struct PassStore {
    root: PathBuf,
    keyring: Keyring,
}

impl PassStore {
    /// Open the store at `root`, unlocking identities from `keyring`
    pub fn new(root: impl Into<PathBuf>, keyring: Keyring) -> Self {
        Self {
            root: root.into(),
            keyring,
        }
    }

    /// Store root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a `/`-separated prefix to a location inside the store
    fn resolve_prefix(&self, prefix: &str) -> BackupResult<PathBuf> {
        let mut dir = self.root.clone();
        for component in Path::new(prefix.trim_start_matches('/')).components() {
            match component {
                Component::Normal(segment) => dir.push(segment),
                Component::CurDir => {}
                _ => {
                    return Err(BackupError::Store(format!(
                        "Prefix '{}' escapes the password store",
                        prefix
                    )))
                }
            }
        }
        Ok(dir)
    }

    /// Entry files under `start`, depth-first with names sorted
    fn entry_files(&self, start: &Path) -> BackupResult<Vec<PathBuf>> {
        if start.is_dir() {
            let mut files = Vec::new();
            let walker = WalkDir::new(start)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

            for entry in walker {
                match entry {
                    Ok(entry) if entry.file_type().is_file() && is_entry_file(entry.path()) => {
                        files.push(entry.into_path())
                    }
                    Ok(_) => {}
                    Err(e) => warn!(error = %e, "skipping unreadable store path"),
                }
            }
            return Ok(files);
        }

        // A prefix may also name a single entry
        let mut single = start.as_os_str().to_owned();
        single.push(".age");
        let single = PathBuf::from(single);
        if single.is_file() {
            return Ok(vec![single]);
        }

        Err(BackupError::Store(format!(
            "No such directory in password store: {}",
            start.display()
        )))
    }

    /// Path segments of an entry relative to the store root, without `.age`
    fn entry_path(&self, file: &Path) -> BackupResult<Vec<String>> {
        let relative = file.strip_prefix(&self.root).map_err(|_| {
            BackupError::Store(format!("{} is outside the store", file.display()))
        })?;

        let mut segments: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();

        if let Some(last) = segments.last_mut() {
            if let Some(stem) = last.strip_suffix(".age") {
                *last = stem.to_string();
            }
        }
        Ok(segments)
    }
}

impl PassSource for PassStore {
    fn read_records(
        &self,
        prefix: &str,
        credential: Credential<'_>,
    ) -> BackupResult<Vec<PassRecord>> {
        if !self.root.is_dir() {
            return Err(BackupError::Store(format!(
                "Password store not found: {}",
                self.root.display()
            )));
        }

        let start = self.resolve_prefix(prefix)?;
        let files = self.entry_files(&start)?;
        let identity = self
            .keyring
            .unlock_identity(credential.identity, credential.passphrase)?;

        let mut records = Vec::with_capacity(files.len());
        for file in files {
            let path = self.entry_path(&file)?;
            let name = path.join("/");

            let text = fs::read(&file)
                .map_err(BackupError::from)
                .and_then(|sealed| decrypt_with_identity(&sealed, &identity))
                .and_then(|plain| {
                    String::from_utf8(plain)
                        .map_err(|_| BackupError::Store("entry is not valid UTF-8".into()))
                });

            match text {
                Ok(text) => {
                    debug!(entry = %name, "decrypted store entry");
                    records.push(PassRecord::parse_entry(path, &text));
                }
                Err(e) => warn!(entry = %name, error = %e, "skipping store entry"),
            }
        }

        info!(count = records.len(), prefix, "read password store");
        Ok(records)
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn is_entry_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == ENTRY_EXT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{encrypt_to_recipient, SecureString};
    use age::x25519;
    use tempfile::TempDir;

    const IDENTITY: &str = "alice@example.com";
    const PASSPHRASE: &str = "open sesame";

    struct Fixture {
        _temp_dir: TempDir,
        store: PassStore,
        recipient: x25519::Recipient,
        passphrase: SecureString,
    }

    impl Fixture {
        fn new() -> Self {
            let temp_dir = TempDir::new().unwrap();
            let keyring = Keyring::new(temp_dir.path().join("keyring"));
            let passphrase = SecureString::new(PASSPHRASE);
            let recipient = keyring.generate(IDENTITY, &passphrase).unwrap();
            let store = PassStore::new(temp_dir.path().join("store"), keyring);
            fs::create_dir_all(store.root()).unwrap();

            Self {
                _temp_dir: temp_dir,
                store,
                recipient,
                passphrase,
            }
        }

        fn add(&self, relative: &str, text: &str) {
            let path = self.store.root().join(format!("{}.age", relative));
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, encrypt_to_recipient(text.as_bytes(), &self.recipient).unwrap())
                .unwrap();
        }

        fn read(&self, prefix: &str) -> BackupResult<Vec<PassRecord>> {
            self.store
                .read_records(prefix, Credential::new(IDENTITY, &self.passphrase))
        }
    }

    #[test]
    fn test_reads_whole_store_in_order() {
        let fixture = Fixture::new();
        fixture.add("web/example", "s3cr3t\nlogin: alice");
        fixture.add("bank", "money");
        fixture.add("web/another", "pw2");

        let records = fixture.read("/").unwrap();
        let paths: Vec<String> = records.iter().map(PassRecord::full_path).collect();
        assert_eq!(paths, vec!["bank", "web/another", "web/example"]);

        let example = &records[2];
        assert_eq!(example.path, vec!["web", "example"]);
        assert_eq!(example.login, "alice");
        assert_eq!(example.password, "s3cr3t");
    }

    #[test]
    fn test_prefix_scopes_entries() {
        let fixture = Fixture::new();
        fixture.add("web/example", "pw1");
        fixture.add("bank", "pw2");

        let records = fixture.read("/web").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].full_path(), "web/example");
    }

    #[test]
    fn test_prefix_naming_single_entry() {
        let fixture = Fixture::new();
        fixture.add("web/example", "pw1");

        let records = fixture.read("web/example").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name(), "example");
    }

    #[test]
    fn test_skips_hidden_and_foreign_files() {
        let fixture = Fixture::new();
        fixture.add("mail", "pw");
        fs::write(fixture.store.root().join(".age-recipients"), "age1xyz").unwrap();
        fs::create_dir_all(fixture.store.root().join(".git")).unwrap();
        fs::write(fixture.store.root().join(".git/HEAD.age"), "junk").unwrap();
        fs::write(fixture.store.root().join("README.txt"), "hello").unwrap();

        let records = fixture.read("/").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name(), "mail");
    }

    #[test]
    fn test_corrupt_entry_is_skipped() {
        let fixture = Fixture::new();
        fixture.add("good", "pw");
        fs::write(fixture.store.root().join("bad.age"), "not age data").unwrap();

        let records = fixture.read("/").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name(), "good");
    }

    #[test]
    fn test_wrong_passphrase_fails_source() {
        let fixture = Fixture::new();
        fixture.add("mail", "pw");

        let wrong = SecureString::new("nope");
        let result = fixture
            .store
            .read_records("/", Credential::new(IDENTITY, &wrong));
        assert!(matches!(result, Err(BackupError::Keyring(_))));
    }

    #[test]
    fn test_missing_prefix_fails() {
        let fixture = Fixture::new();
        assert!(matches!(fixture.read("/nothing"), Err(BackupError::Store(_))));
    }

    #[test]
    fn test_prefix_cannot_escape_store() {
        let fixture = Fixture::new();
        assert!(matches!(fixture.read("/../keyring"), Err(BackupError::Store(_))));
    }

    #[test]
    fn test_missing_store_fails() {
        let temp_dir = TempDir::new().unwrap();
        let store = PassStore::new(temp_dir.path().join("absent"), Keyring::new(temp_dir.path()));
        let passphrase = SecureString::new("x");
        assert!(store
            .read_records("/", Credential::new(IDENTITY, &passphrase))
            .is_err());
    }
}
