use thiserror::Error;

/// Client-facing failures a hook can raise. These are expected, non-fatal
/// outcomes that the frontend maps to a protocol-appropriate error response
/// — never a reason to log at error severity or terminate anything.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("invalid query")]
    InvalidQuery,
    #[error("malformed info_hash")]
    MalformedInfoHash,
    #[error("unapproved client")]
    UnapprovedClient,
    #[error("invalid jwt")]
    InvalidJwt,
    #[error("invalid ip")]
    InvalidIp,
    #[error("resource does not exist")]
    ResourceDoesNotExist,
}
