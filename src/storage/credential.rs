use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use crate::error::{AppError, AppResult};

/// File name of the persisted bearer token
pub const CREDENTIAL_KEY: &str = "access_token";

/// Opaque bearer token identifying an authenticated session
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a token returned by the service; blank tokens are rejected
    pub fn new(token: impl Into<String>) -> AppResult<Self> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            return Err(AppError::Validation(
                "Credential token cannot be empty".to_string(),
            ));
        }
        Ok(Self(token))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Durable holder of the current session credential.
///
/// `set` and `clear` are durable when they return.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialStore: Send + Sync {
    fn get(&self) -> Option<Credential>;

    fn set(&self, credential: Credential) -> AppResult<()>;

    fn clear(&self) -> AppResult<()>;
}

/// Credential store persisted to a single file that survives restarts
pub struct FileCredentialStore {
    path: PathBuf,
    current: RwLock<Option<Credential>>,
}

impl FileCredentialStore {
    /// Opens the store, restoring any credential persisted by an earlier process
    pub fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        let current = Self::read_from_disk(&path)?;

        tracing::debug!(
            path = %path.display(),
            restored = current.is_some(),
            "Opened credential store"
        );

        Ok(Self {
            path,
            current: RwLock::new(current),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_from_disk(path: &Path) -> AppResult<Option<Credential>> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(Credential::new(contents).ok()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Storage(e)),
        }
    }

    fn write_to_disk(&self, credential: &Credential) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::File::create(&self.path)?;
        file.write_all(credential.expose().as_bytes())?;
        file.sync_all()
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Option<Credential> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, credential: Credential) -> AppResult<()> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        self.write_to_disk(&credential)?;
        *current = Some(credential);
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = None;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(e)),
        }
    }
}

/// In-process credential store for tests and embedders without durable storage
#[derive(Default)]
pub struct MemoryCredentialStore {
    current: RwLock<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self {
            current: RwLock::new(Some(credential)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Option<Credential> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, credential: Credential) -> AppResult<()> {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(credential);
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
