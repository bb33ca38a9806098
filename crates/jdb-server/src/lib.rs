//! HTTP server for jdb.
//!
//! Exposes a JSON document over plain HTTP verbs. Request paths address the
//! document as `/<collection>/<id>/<collection>/<id>/...`:
//!
//! | Verb     | Effect                                             | Success |
//! |----------|----------------------------------------------------|---------|
//! | `GET`    | return the addressed node (root: empty body)       | 200     |
//! | `POST`   | append the body as a record to the collection      | 200     |
//! | `PATCH`  | merge the body into the addressed record           | 200     |
//! | `PUT`    | replace the addressed record, keeping its id       | 200     |
//! | `DELETE` | remove the addressed record                        | 204     |
//!
//! Anything unresolvable answers 404.

pub mod api;
pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use api::{Outcome, Reply, Verb};
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::AppState;
pub use server::JdbServer;
