//! JSON API over a single explorer session

pub mod handler;
pub mod server;

pub use handler::SharedSession;
pub use server::{router, HttpServer};
