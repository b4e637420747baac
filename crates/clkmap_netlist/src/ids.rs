//! Opaque ID newtypes for netlist objects.
//!
//! IDs are ordered so that [`SigBit`](crate::SigBit) has a total order on
//! (wire identity, bit index).

use crate::arena::ArenaId;
use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl ArenaId for $name {
            fn from_raw(index: u32) -> Self {
                Self(index)
            }

            fn as_raw(self) -> u32 {
                self.0
            }
        }
    };
}

define_id!(
    /// ID of a module in a [`Design`](crate::Design).
    ModuleId
);

define_id!(
    /// ID of a wire within its module.
    WireId
);

define_id!(
    /// ID of a cell within its module.
    CellId
);
