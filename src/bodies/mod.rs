mod rigid_body;
mod material;
mod collision_model;

pub use self::rigid_body::{RigidBody, RigidBodySnapshot};
pub use self::material::Material;
pub use self::collision_model::CollisionModel;
pub use self::body_flags::BodyFlags;

/// Flags tracking per-body simulation state
pub mod body_flags {
    use bitflags::bitflags;

    bitflags! {
        /// State flags of a rigid body
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        #[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
        pub struct BodyFlags: u32 {
            /// Body can go to sleep when its motion drops low enough
            const CAN_SLEEP = 0x01;

            /// Body is currently sleeping
            const SLEEPING = 0x02;

            /// World inverse inertia tensor is current for this frame
            const INERTIA_CACHED = 0x04;

            /// Accumulated influences were already integrated this frame
            const INFLUENCES_CACHED = 0x08;
        }
    }
}
