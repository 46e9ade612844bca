use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    InvalidCategory(String),
    InvalidFileType(String),
    InvalidName(String),
    Malformed(String),
    EmptyFile,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::InvalidCategory(ref s) => write!(f, "invalid category: {}", s),
            Error::InvalidFileType(ref s) => {
                write!(f, "invalid file type: {}, please upload a .csv", s)
            }
            Error::InvalidName(ref s) => write!(f, "cannot derive an index name from {}", s),
            Error::Malformed(ref s) => write!(f, "malformed csv: {}", s),
            Error::EmptyFile => f.write_str("no valid tickers found in file"),
        }
    }
}

impl std::error::Error for Error {}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Error {
        Error::Malformed(format!("{}", err))
    }
}
