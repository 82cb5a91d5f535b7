pub mod credential;

pub use credential::{
    Credential, CredentialStore, FileCredentialStore, MemoryCredentialStore, CREDENTIAL_KEY,
};
