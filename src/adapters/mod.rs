// Adapters layer: concrete implementations of the domain ports (storage, roster files, export, notification).

pub mod export;
pub mod notify;
pub mod roster_store;
pub mod storage;
