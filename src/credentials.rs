use crate::errors::AppError;
use std::collections::HashMap;
use subtle::ConstantTimeEq;
use tracing::warn;

/// Upstream access for one tracked user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub identity: String,
    pub api_key: String,
    pub access_secret: Option<String>,
}

/// Immutable identity -> credential table, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct CredentialDirectory {
    entries: HashMap<String, Credential>,
}

impl CredentialDirectory {
    /// Parses `identity:apiKey` and `identity:accessSecret:apiKey` entries
    /// separated by commas. Malformed entries are skipped.
    pub fn parse(raw: &str) -> Self {
        let mut entries = HashMap::new();

        for (index, entry) in raw.split(',').enumerate() {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }

            let Some(credential) = parse_entry(entry) else {
                warn!(entry = index, "skipping malformed credential entry");
                continue;
            };

            if entries.contains_key(&credential.identity) {
                warn!(identity = %credential.identity, "duplicate credential entry ignored");
                continue;
            }
            entries.insert(credential.identity.clone(), credential);
        }

        Self { entries }
    }

    pub fn get(&self, identity: &str) -> Result<&Credential, AppError> {
        self.entries
            .get(identity)
            .ok_or_else(|| AppError::Credential(identity.to_string()))
    }

    /// Unknown identities never validate; identities without a configured
    /// secret are ungated.
    pub fn validate_access(&self, identity: &str, candidate: &str) -> bool {
        match self.entries.get(identity) {
            None => false,
            Some(Credential {
                access_secret: None,
                ..
            }) => true,
            Some(Credential {
                access_secret: Some(secret),
                ..
            }) => secret.as_bytes().ct_eq(candidate.as_bytes()).into(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_entry(entry: &str) -> Option<Credential> {
    let parts: Vec<&str> = entry.split(':').map(str::trim).collect();
    if parts.iter().any(|part| part.is_empty()) {
        return None;
    }

    let (identity, access_secret, api_key) = match parts.as_slice() {
        [identity, api_key] => (*identity, None, *api_key),
        [identity, secret, api_key] => (*identity, Some(secret.to_string()), *api_key),
        _ => return None,
    };

    Some(Credential {
        identity: identity.to_string(),
        api_key: api_key.to_string(),
        access_secret,
    })
}
