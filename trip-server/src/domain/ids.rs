//! Identifier newtypes for the trip domain.
//!
//! Every entity carries a UUID-backed id. Distinct wrapper types keep a
//! stop id from being handed to something expecting a stint id.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Mint a fresh random id.
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<Uuid> for $name {
            fn from(raw: Uuid) -> Self {
                Self(raw)
            }
        }
    };
}

entity_id!(
    /// Identifies a [`Trip`](super::Trip).
    TripId
);

entity_id!(
    /// Identifies a [`Stint`](super::Stint).
    StintId
);

entity_id!(
    /// Identifies a [`Stop`](super::Stop).
    StopId
);

entity_id!(
    /// Identifies a [`Leg`](super::Leg).
    LegId
);

entity_id!(
    /// Identifies a [`Location`](super::Location).
    LocationId
);

entity_id!(
    /// Identifies a user account. Accounts themselves live outside this
    /// service; the engine only compares ids for ownership checks.
    UserId
);
