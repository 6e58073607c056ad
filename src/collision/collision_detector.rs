use crate::bodies::CollisionModel;
use crate::collision::box_box::box_and_box;
use crate::collision::landscape::{box_and_landscape, sphere_and_landscape};
use crate::collision::narrow_phase::{box_and_sphere, sphere_and_sphere};
use crate::core::{ContactPoint, Target};
use crate::shapes::{BoxShape, Sphere};

/// Which of the two tested bodies a detected contact involves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactBodies {
    /// Both bodies, first one first
    Both,

    /// The first body against the static world
    FirstAgainstWorld,

    /// The second body against the static world
    SecondAgainstWorld,
}

/// A body as seen by the narrow phase
#[derive(Debug, Clone, Copy)]
pub struct Collider<'a> {
    pub model: CollisionModel,
    pub target: &'a Target,
}

impl<'a> Collider<'a> {
    pub fn new(model: CollisionModel, target: &'a Target) -> Self {
        Self { model, target }
    }

    fn sphere(&self) -> Sphere {
        Sphere::new(self.target.radius())
    }

    fn cuboid(&self) -> BoxShape {
        BoxShape::new(self.target.half_extents())
    }
}

/// Narrow-phase dispatch over every ordered pair of collision models
#[derive(Debug, Default, Clone, Copy)]
pub struct CollisionDetector;

impl CollisionDetector {
    pub fn new() -> Self {
        Self
    }

    /// Tests two bodies and returns at most one contact. The normal points
    /// from the second participant (or the world) towards the first.
    pub fn detect(&self, a: &Collider, b: &Collider) -> Option<(ContactBodies, ContactPoint)> {
        let ta = a.target.transform();
        let tb = b.target.transform();

        match (a.model, b.model) {
            (CollisionModel::Landscape, CollisionModel::Landscape) => None,

            (CollisionModel::Sphere, CollisionModel::Sphere) => sphere_and_sphere(&a.sphere(), ta, &b.sphere(), tb)
                .map(|contact| (ContactBodies::Both, contact)),

            (CollisionModel::Box, CollisionModel::Sphere) => box_and_sphere(&a.cuboid(), ta, &b.sphere(), tb)
                .map(|contact| (ContactBodies::Both, contact)),

            (CollisionModel::Sphere, CollisionModel::Box) => box_and_sphere(&b.cuboid(), tb, &a.sphere(), ta)
                .map(|contact| (ContactBodies::Both, flipped(contact))),

            (CollisionModel::Box, CollisionModel::Box) => box_and_box(&a.cuboid(), ta, &b.cuboid(), tb)
                .map(|contact| (ContactBodies::Both, contact)),

            (CollisionModel::Sphere, CollisionModel::Landscape) => {
                let mesh = b.target.mesh()?;
                sphere_and_landscape(&a.sphere(), ta, mesh, tb)
                    .map(|contact| (ContactBodies::FirstAgainstWorld, contact))
            }

            (CollisionModel::Box, CollisionModel::Landscape) => {
                let mesh = b.target.mesh()?;
                box_and_landscape(&a.cuboid(), ta, mesh, tb)
                    .map(|contact| (ContactBodies::FirstAgainstWorld, contact))
            }

            (CollisionModel::Landscape, CollisionModel::Sphere) => {
                let mesh = a.target.mesh()?;
                sphere_and_landscape(&b.sphere(), tb, mesh, ta)
                    .map(|contact| (ContactBodies::SecondAgainstWorld, contact))
            }

            (CollisionModel::Landscape, CollisionModel::Box) => {
                let mesh = a.target.mesh()?;
                box_and_landscape(&b.cuboid(), tb, mesh, ta)
                    .map(|contact| (ContactBodies::SecondAgainstWorld, contact))
            }
        }
    }
}

fn flipped(contact: ContactPoint) -> ContactPoint {
    ContactPoint {
        normal: -contact.normal,
        ..contact
    }
}
