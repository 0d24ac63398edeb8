//! The production backend: [XConn][crate::x::XConn] and
//! [Draw][crate::bar::Draw] implemented over an x11rb connection.
use crate::Error;

pub mod draw;
pub mod xconn;

pub use xconn::X11rbConn;

/// The ways the x11rb backend can fail.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Unable to establish a connection to the X server
    #[error(transparent)]
    Connect(#[from] ::x11rb::errors::ConnectError),

    /// The X11 connection broke
    #[error(transparent)]
    Connection(#[from] ::x11rb::errors::ConnectionError),

    /// Could not get an X11 request reply
    #[error(transparent)]
    Reply(#[from] ::x11rb::errors::ReplyError),

    /// Could not get an X11 request reply or generate a resource id
    #[error(transparent)]
    ReplyOrId(#[from] ::x11rb::errors::ReplyOrIdError),
}

impl From<::x11rb::errors::ConnectError> for Error {
    fn from(e: ::x11rb::errors::ConnectError) -> Self {
        Error::Backend(BackendError::Connect(e))
    }
}

impl From<::x11rb::errors::ConnectionError> for Error {
    fn from(e: ::x11rb::errors::ConnectionError) -> Self {
        Error::Backend(BackendError::Connection(e))
    }
}

impl From<::x11rb::errors::ReplyError> for Error {
    fn from(e: ::x11rb::errors::ReplyError) -> Self {
        Error::Backend(BackendError::Reply(e))
    }
}

impl From<::x11rb::errors::ReplyOrIdError> for Error {
    fn from(e: ::x11rb::errors::ReplyOrIdError) -> Self {
        Error::Backend(BackendError::ReplyOrId(e))
    }
}
