use thiserror::Error;

#[derive(Error, Debug)]
pub enum BinderError {
    #[error("Invalid layout: {0} (a layout must be a grid size from 1 to {max})", max = crate::layout::MAX_LAYOUT)]
    InvalidLayout(i64),

    #[error("Select a layout first")]
    NoLayout,

    #[error("Need 2+ cards to sort (found {found})")]
    InsufficientCards { found: usize },

    #[error("Reducing capacity to {requested} will remove some of your {cards} cards")]
    CapacityReductionRequiresConfirmation { requested: usize, cards: usize },

    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("Loading cancelled")]
    LoadCancelled,

    #[error("Saved state is unreadable: {0}")]
    PersistenceRead(String),

    #[error("Slot {index} is out of range (binder has {len} slots)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("A binder holds at most {max} slots ({requested} requested)")]
    TooManySlots { requested: usize, max: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Lookup error: {0}")]
    Lookup(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, BinderError>;
