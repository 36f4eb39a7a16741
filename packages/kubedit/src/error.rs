#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("merging values into a JSON manifest is not implemented")]
    JsonMergeUnimplemented,

    #[error("failed to convert value: {0}")]
    ValueConversion(#[from] serde_json::Error),
}
