//! Response envelope.
//!
//! Resource endpoints answer `{ "data": ... }`; building the envelope
//! through [`DataResponse`] keeps the shape typed instead of scattering
//! `json!({ "data": ... })` through the handlers. The auth endpoints are
//! the one exception and return their token payload bare.

use serde::Serialize;

/// `{ "data": T }` wrapper for handler responses.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
