use super::domain::{CardId, CardSnapshot, Conversion, MetaValue, PointsSystem};

/// Card attribute store. Keys are flat strings following the
/// `{txn}_{channel}_{kind}` naming scheme; values are plain text or numbers.
pub trait CardRepository: Send + Sync {
    fn get_meta(&self, card: CardId, key: &str) -> Result<Option<MetaValue>, RepositoryError>;
    fn set_meta(&self, card: CardId, key: &str, value: MetaValue)
        -> Result<(), RepositoryError>;
    /// Every stored card as an in-memory snapshot, in stable id order, for
    /// listing and ranking passes.
    fn snapshots(&self) -> Result<Vec<CardSnapshot>, RepositoryError>;
}

/// Points-system store: systems and their conversion tables.
pub trait PointsSystemRepository: Send + Sync {
    fn get_system(&self, id: u64) -> Result<Option<PointsSystem>, RepositoryError>;
    /// Conversion rows for a system; an unknown system simply has none.
    fn list_conversions(&self, system_id: u64) -> Result<Vec<Conversion>, RepositoryError>;
}

/// Error enumeration for repository failures. Degenerate data (missing meta,
/// empty conversion tables) is not a failure; only genuine storage problems
/// surface here.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
