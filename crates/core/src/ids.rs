//! Resource id parsing.
//!
//! Ids are store-assigned positive integers. They reach the services either as
//! a single path segment (`/resources/{id}`) or as a comma separated list in a
//! `?id=` query parameter. Both forms share one strict grammar: ASCII digits
//! only, no sign, no decimal point, no leading zero and a value greater than
//! zero that fits in an `i64`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Maximum length (in characters) of a CSV id list.
pub const MAX_ID_LIST_LENGTH: usize = 200;

/// Parse a single id token.
pub fn parse_positive_id(token: &str) -> Result<i64> {
    let bytes = token.as_bytes();
    let well_formed = !bytes.is_empty()
        && bytes.iter().all(u8::is_ascii_digit)
        && bytes[0] != b'0';
    if !well_formed {
        return Err(Error::InvalidId(token.to_string()));
    }

    // Digits only, so the only possible failure left is overflow.
    token
        .parse::<i64>()
        .map_err(|_| Error::InvalidId(token.to_string()))
}

/// Parse a CSV id list into a deduplicated set, preserving first-seen order.
pub fn parse_id_set(csv: &str) -> Result<IdSet> {
    if csv.trim().is_empty() {
        return Err(Error::EmptyIdList);
    }

    let len = csv.chars().count();
    if len > MAX_ID_LIST_LENGTH {
        return Err(Error::IdListTooLong {
            len,
            max: MAX_ID_LIST_LENGTH,
        });
    }

    let mut ids = IdSet::default();
    for token in csv.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        ids.insert(parse_positive_id(token)?);
    }
    Ok(ids)
}

/// An ordered set of resource ids.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<i64>", into = "Vec<i64>")]
pub struct IdSet {
    ids: Vec<i64>,
    seen: HashSet<i64>,
}

impl IdSet {
    /// Insert an id, returning false if it was already present.
    pub fn insert(&mut self, id: i64) -> bool {
        if self.seen.insert(id) {
            self.ids.push(id);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, id: i64) -> bool {
        self.seen.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.ids.iter().copied()
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.ids
    }

    pub fn into_vec(self) -> Vec<i64> {
        self.ids
    }

    /// Render as a CSV list suitable for an `?id=` query parameter.
    pub fn to_csv(&self) -> String {
        self.ids
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl FromIterator<i64> for IdSet {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        let mut set = Self::default();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

impl From<Vec<i64>> for IdSet {
    fn from(ids: Vec<i64>) -> Self {
        ids.into_iter().collect()
    }
}

impl From<IdSet> for Vec<i64> {
    fn from(set: IdSet) -> Self {
        set.ids
    }
}

impl fmt::Debug for IdSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.ids).finish()
    }
}
