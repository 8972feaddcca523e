//! JSON bodies shared by the services and their clients.

use serde::{Deserialize, Serialize};

/// `{"id": <int>}`: returned by `POST /resources` and `POST /songs`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdResponse {
    pub id: i64,
}

/// `{"ids": [<int>, ...]}`: returned by the bulk delete endpoints.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdsResponse {
    pub ids: Vec<i64>,
}
