use csds::RecordKey;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("record `{0}` is already stored")]
    DuplicateKey(RecordKey),

    #[error("record `{0}` is not an O instance")]
    NotAnOInstance(RecordKey),
}
