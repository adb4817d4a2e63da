//! Pure access and redaction rules shared by the services and route handlers.
//! Nothing in here touches the database or the network.

pub mod documents;
pub mod tags;
pub mod visibility;
