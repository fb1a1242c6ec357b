use std::{
    fs, io,
    path::{Path, PathBuf},
};
use warikan_application::{Ledger, LedgerSource, LedgerSourceError};

/// Reads one JSON ledger per group from `<root>/<group>.json`.
#[derive(Clone, Debug)]
pub struct JsonLedgerSource {
    root: PathBuf,
}

impl JsonLedgerSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reads a ledger from an explicit file, reporting failures under `group`.
    pub fn read_path(path: &Path, group: &str) -> Result<Ledger, LedgerSourceError> {
        let source = fs::read_to_string(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => LedgerSourceError::NotFound(group.to_string()),
            _ => unreadable(group, err),
        })?;
        let ledger: Ledger =
            serde_json::from_str(&source).map_err(|err| unreadable(group, err))?;

        tracing::debug!(
            group,
            path = %path.display(),
            member_count = ledger.members.len(),
            expense_count = ledger.expenses.len(),
            settlement_count = ledger.settlements.len(),
            "Ledger loaded"
        );
        Ok(ledger)
    }

    fn path_for(&self, group: &str) -> Option<PathBuf> {
        let valid = !group.is_empty()
            && group
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        valid.then(|| self.root.join(format!("{group}.json")))
    }
}

impl LedgerSource for JsonLedgerSource {
    fn load(&self, group: &str) -> Result<Ledger, LedgerSourceError> {
        let Some(path) = self.path_for(group) else {
            tracing::warn!(group, "Rejected group name");
            return Err(LedgerSourceError::NotFound(group.to_string()));
        };
        Self::read_path(&path, group)
    }
}

fn unreadable(
    group: &str,
    err: impl std::error::Error + Send + Sync + 'static,
) -> LedgerSourceError {
    LedgerSourceError::Unreadable {
        group: group.to_string(),
        source: Box::new(err),
    }
}
