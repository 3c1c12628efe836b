use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("invalid configuration")]
    Config,
    #[display("could not open the mapping store")]
    Database,
    #[display("invalid link name template")]
    Template,
    #[display("could not start watching the source tree")]
    Watch,
}
