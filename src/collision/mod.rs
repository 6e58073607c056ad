mod contact;
mod contact_solver;
mod collision_detector;
mod broad_phase;
mod narrow_phase;
mod box_box;
mod landscape;

pub use self::contact::{contact_basis, Contact, PositionChange, VelocityChange};
pub use self::contact_solver::{
    CoarseResolver, ContactResolver, IterativeResolver, ResolutionContext, ResolutionStats, Solver, SolverState,
};
pub use self::collision_detector::{Collider, CollisionDetector, ContactBodies};
pub use self::broad_phase::{BoundingSphereBroadPhase, BroadPhase};
pub use self::narrow_phase::{box_and_sphere, sphere_and_sphere};
pub use self::box_box::box_and_box;
pub use self::landscape::{box_and_landscape, sphere_and_landscape, MAX_CORNER_CONTACTS};
