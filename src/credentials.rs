//! Admin credential file
//!
//! The file holds a JSON array of `{"user", "Password"}` entries with
//! plaintext passwords. Only the first entry is managed; authentication
//! accepts any entry that matches.

use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use crate::database::{read_json_or_init, write_json};
use crate::error::StoreError;
use crate::model::Credential;

pub struct CredentialStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn list(&self) -> Result<Vec<Credential>, StoreError> {
        let _guard = self.write_lock.lock().await;
        read_json_or_init(&self.path).await
    }

    /// Returns true if some entry matches both user and password exactly
    pub async fn authenticate(&self, user: &str, password: &str) -> Result<bool, StoreError> {
        let entries = self.list().await?;
        Ok(entries
            .iter()
            .any(|entry| entry.user == user && entry.password == password))
    }

    /// Replaces the first entry, or creates it when the file is empty
    pub async fn replace_admin(&self, credential: Credential) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut entries: Vec<Credential> = read_json_or_init(&self.path).await?;
        match entries.first_mut() {
            Some(first) => *first = credential,
            None => entries.push(credential),
        }
        write_json(&self.path, &entries).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cred(user: &str, password: &str) -> Credential {
        Credential {
            user: user.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_missing_file_rejects_everyone() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path().join("users.json"));
        assert!(!store.authenticate("admin", "admin").await.unwrap());
    }

    #[tokio::test]
    async fn test_replace_admin_overwrites_first_entry() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path().join("users.json"));

        store.replace_admin(cred("admin", "old")).await.unwrap();
        store.replace_admin(cred("root", "new")).await.unwrap();

        let entries = store.list().await.unwrap();
        assert_eq!(entries, vec![cred("root", "new")]);
        assert!(store.authenticate("root", "new").await.unwrap());
        assert!(!store.authenticate("admin", "old").await.unwrap());
    }

    #[tokio::test]
    async fn test_authenticate_is_exact() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, r#"[{"user":"admin","Password":"Secret"}]"#).unwrap();

        let store = CredentialStore::new(path);
        assert!(store.authenticate("admin", "Secret").await.unwrap());
        assert!(!store.authenticate("admin", "secret").await.unwrap());
        assert!(!store.authenticate("Admin", "Secret").await.unwrap());
    }
}
