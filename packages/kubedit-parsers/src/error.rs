#[derive(thiserror::Error, Clone, Debug)]
pub enum Error {
    #[error("Utf8 conversion error: {0}")]
    Utf8Conversion(#[from] std::str::Utf8Error),

    #[error("Invalid syntax: {0}")]
    InvalidSyntax(String),
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Error::Utf8Conversion(err.utf8_error())
    }
}
