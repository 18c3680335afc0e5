//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  Ordering is allocation order, which
//! the registry and stores rely on for deterministic iteration.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty) => $label:literal;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        $vis struct $name(pub $inner);

        impl $name {
            /// The first ID handed out by a store.  IDs start at 1 so that
            /// `0` never appears in logs or exported rows.
            pub const FIRST: $name = $name(1);

            /// The ID that follows `self` in allocation order.
            #[inline]
            pub fn next(self) -> $name {
                $name(self.0 + 1)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", $label, self.0)
            }
        }

        impl From<$inner> for $name {
            #[inline]
            fn from(raw: $inner) -> $name {
                $name(raw)
            }
        }
    };
}

typed_id! {
    /// Identity of a drone in the registry.  Fleets are small; `u32` is ample.
    pub struct DroneId(u32) => "drone";
}

typed_id! {
    /// Identity of a submitted order.  Equality of orders is by this ID only.
    pub struct OrderId(u64) => "order";
}

typed_id! {
    /// Identity of a planned delivery route (one per dispatched batch).
    pub struct RouteId(u64) => "route";
}
