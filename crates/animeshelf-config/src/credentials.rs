use anyhow::Result;
use animeshelf_models::UserProfile;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use toml;

const TOKEN_KEY: &str = "anime_token";
const USER_KEY: &str = "anime_user";

#[derive(Debug, Serialize, Deserialize, Default)]
struct CredentialsData {
    #[serde(flatten)]
    data: HashMap<String, String>,
}

/// Session storage: the API token and the signed-in user
pub struct CredentialStore {
    path: PathBuf,
    credentials: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            credentials: HashMap::new(),
        }
    }

    pub fn load(&mut self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            let creds_data: CredentialsData = toml::from_str(&content)?;
            self.credentials = creds_data.data;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let creds_data = CredentialsData {
            data: self.credentials.clone(),
        };
        let content = toml::to_string_pretty(&creds_data)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.credentials.get(key)
    }

    pub fn set(&mut self, key: String, value: String) {
        self.credentials.insert(key, value);
    }

    pub fn remove(&mut self, key: &str) {
        self.credentials.remove(key);
    }

    pub fn get_token(&self) -> Option<&String> {
        self.get(TOKEN_KEY)
    }

    pub fn set_token(&mut self, token: String) {
        self.set(TOKEN_KEY.to_string(), token);
    }

    /// The stored user, or None when absent or unreadable
    pub fn get_user(&self) -> Option<UserProfile> {
        self.get(USER_KEY)
            .and_then(|json| serde_json::from_str(json).ok())
    }

    pub fn set_user(&mut self, user: &UserProfile) -> Result<()> {
        let json = serde_json::to_string(user)?;
        self.set(USER_KEY.to_string(), json);
        Ok(())
    }

    /// Signed in means both a token and a user are present
    pub fn is_logged_in(&self) -> bool {
        self.get_token().is_some() && self.get_user().is_some()
    }

    pub fn login(&mut self, token: String, user: &UserProfile) -> Result<()> {
        self.set_token(token);
        self.set_user(user)
    }

    /// Drop the session (token and user); other keys are kept
    pub fn logout(&mut self) {
        self.remove(TOKEN_KEY);
        self.remove(USER_KEY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn test_user() -> UserProfile {
        UserProfile {
            id: 1,
            username: "haruhi".to_string(),
            email: "haruhi@example.com".to_string(),
            ..UserProfile::default()
        }
    }

    #[test]
    fn test_credential_store_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();

        let mut store = CredentialStore::new(path.clone());
        store.login("test_token".to_string(), &test_user()).unwrap();
        store.save().unwrap();

        let mut loaded_store = CredentialStore::new(path);
        loaded_store.load().unwrap();
        assert_eq!(loaded_store.get_token(), Some(&"test_token".to_string()));
        assert_eq!(loaded_store.get_user().unwrap().username, "haruhi");
        assert!(loaded_store.is_logged_in());
    }

    #[test]
    fn test_logout_clears_session_only() {
        let mut store = CredentialStore::new(PathBuf::from("/tmp/test"));
        store.login("token".to_string(), &test_user()).unwrap();
        store.set("anime_theme".to_string(), "dark".to_string());

        store.logout();
        assert!(!store.is_logged_in());
        assert_eq!(store.get_token(), None);
        assert_eq!(store.get("anime_theme"), Some(&"dark".to_string()));
    }

    #[test]
    fn test_token_without_user_is_not_logged_in() {
        let mut store = CredentialStore::new(PathBuf::from("/tmp/test"));
        store.set_token("token".to_string());
        assert!(!store.is_logged_in());

        store.set(USER_KEY.to_string(), "{not json".to_string());
        assert!(store.get_user().is_none());
    }
}
