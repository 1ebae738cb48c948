//! Transaction scripts.
//!
//! Scripts are opaque bytes to this crate. The defaults are embedded at
//! build time; a configured directory can override them by file name.

use std::path::PathBuf;

use crate::error::{LifecycleError, LifecycleResult};

/// Creates an account with one encoded public key (`publicKey: String`).
pub const CREATE_ACCOUNT: &str = "create_account.cdc";

/// Moves FLOW from the signer to a recipient (`amount: UFix64, to: Address`).
pub const TRANSFER_FLOW: &str = "transfer_flow.cdc";

const EMBEDDED: &[(&str, &[u8])] = &[
    (CREATE_ACCOUNT, include_bytes!("../scripts/create_account.cdc")),
    (TRANSFER_FLOW, include_bytes!("../scripts/transfer_flow.cdc")),
];

/// Named script lookup.
#[derive(Debug, Clone, Default)]
pub struct ScriptBundle {
    override_dir: Option<PathBuf>,
}

impl ScriptBundle {
    /// Embedded scripts only.
    pub fn embedded() -> Self {
        Self::default()
    }

    /// Prefer files in `dir`, falling back to the embedded scripts.
    pub fn with_override_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            override_dir: Some(dir.into()),
        }
    }

    /// Load the script called `name`.
    ///
    /// # Errors
    ///
    /// `NotFound` when neither the override directory nor the embedded set
    /// has it; `Access` when an override file exists but cannot be read.
    pub fn load(&self, name: &str) -> LifecycleResult<Vec<u8>> {
        if let Some(dir) = &self.override_dir {
            let path = dir.join(name);
            if path.is_file() {
                tracing::debug!(script = name, path = %path.display(), "Loading script override");
                return std::fs::read(&path).map_err(|e| {
                    LifecycleError::Access(format!(
                        "Failed to read script {}: {}",
                        path.display(),
                        e
                    ))
                });
            }
        }

        EMBEDDED
            .iter()
            .find(|(embedded, _)| *embedded == name)
            .map(|(_, bytes)| bytes.to_vec())
            .ok_or_else(|| LifecycleError::NotFound(format!("Unknown script '{}'", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_scripts() {
        let bundle = ScriptBundle::embedded();
        let create = String::from_utf8(bundle.load(CREATE_ACCOUNT).unwrap()).unwrap();
        assert!(create.contains("transaction(publicKey: String)"));

        let transfer = String::from_utf8(bundle.load(TRANSFER_FLOW).unwrap()).unwrap();
        assert!(transfer.contains("amount: UFix64, to: Address"));
    }

    #[test]
    fn test_unknown_script() {
        let err = ScriptBundle::embedded().load("mint.cdc").unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound(_)));
    }

    #[test]
    fn test_override_directory() {
        let dir = std::env::temp_dir().join(format!("flow-scripts-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(TRANSFER_FLOW), b"transaction {}").unwrap();

        let bundle = ScriptBundle::with_override_dir(&dir);
        assert_eq!(bundle.load(TRANSFER_FLOW).unwrap(), b"transaction {}");
        // Missing overrides fall back to the embedded copy.
        assert!(bundle.load(CREATE_ACCOUNT).unwrap().starts_with(b"transaction("));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
