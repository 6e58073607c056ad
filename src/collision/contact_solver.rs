use crate::bodies::RigidBody;
use crate::collision::broad_phase::{BoundingSphereBroadPhase, BroadPhase};
use crate::collision::collision_detector::{Collider, CollisionDetector, ContactBodies};
use crate::collision::contact::Contact;
use crate::core::{BodyHandle, BodyStorage, ResolutionStrategy, SolverConfig, Storage, Target, TargetStorage};
use crate::Result;

/// Phase of the per-step detect and resolve cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverState {
    /// No contacts pending
    #[default]
    Idle,

    /// Contacts were detected and wait for resolution
    DetectContacts,

    ResolvePositions,

    ResolveImpulses,
}

/// Everything a resolver may touch while working through the contacts
pub struct ResolutionContext<'a> {
    pub bodies: &'a mut BodyStorage<RigidBody>,
    pub targets: &'a mut TargetStorage<Target>,
    pub config: &'a SolverConfig,
    pub quantum: f32,
}

/// Iterations spent by the last resolution
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionStats {
    pub position_iterations: usize,
    pub velocity_iterations: usize,
}

/// Trait for contact resolution strategies
pub trait ContactResolver {
    /// Removes interpenetration. Runs before `resolve_velocities`.
    fn resolve_positions(&mut self, contacts: &mut [Contact], ctx: &mut ResolutionContext<'_>);

    /// Applies impulses to the contact velocities
    fn resolve_velocities(&mut self, contacts: &mut [Contact], ctx: &mut ResolutionContext<'_>);

    fn stats(&self) -> ResolutionStats;
}

/// Resolves every contact once, in queue order. Each contact gets its
/// position correction and then its impulse before the next one is touched,
/// so the whole pass runs in `resolve_positions`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CoarseResolver {
    resolved: usize,
}

impl ContactResolver for CoarseResolver {
    fn resolve_positions(&mut self, contacts: &mut [Contact], ctx: &mut ResolutionContext<'_>) {
        self.resolved = 0;

        for contact in contacts.iter_mut() {
            contact.match_awake_state(ctx.bodies);

            let penetration = contact.penetration();
            if penetration > 0.0 {
                let change = contact.resolve_interpenetration(
                    penetration,
                    ctx.bodies,
                    ctx.targets,
                    ctx.config.angular_move_limit,
                );
                let moved = contact.bodies();
                for (index, handle) in moved.iter().enumerate() {
                    if let Some(handle) = handle {
                        contact.propagate_position_change(*handle, &change, index);
                    }
                }
            }

            contact.prepare(
                ctx.bodies,
                ctx.targets,
                ctx.quantum,
                ctx.config.restitution_speed_threshold,
            );
            if contact.desired_delta_velocity() > 0.0 {
                contact.resolve_impulse(ctx.bodies);
            }

            self.resolved += 1;
        }
    }

    fn resolve_velocities(&mut self, _contacts: &mut [Contact], _ctx: &mut ResolutionContext<'_>) {}

    fn stats(&self) -> ResolutionStats {
        ResolutionStats {
            position_iterations: self.resolved,
            velocity_iterations: self.resolved,
        }
    }
}

/// Repeatedly resolves the worst contact and carries the change over to
/// every contact sharing one of its bodies
#[derive(Debug, Default, Clone, Copy)]
pub struct IterativeResolver {
    position_iterations: usize,
    velocity_iterations: usize,
}

/// Index of the first contact whose measure exceeds `threshold` by the most
fn worst_contact(contacts: &[Contact], threshold: f32, measure: impl Fn(&Contact) -> f32) -> Option<usize> {
    let mut max = threshold;
    let mut worst = None;

    for (index, contact) in contacts.iter().enumerate() {
        let value = measure(contact);
        if value > max {
            max = value;
            worst = Some(index);
        }
    }

    worst
}

impl ContactResolver for IterativeResolver {
    fn resolve_positions(&mut self, contacts: &mut [Contact], ctx: &mut ResolutionContext<'_>) {
        let limit = contacts.len() * ctx.config.iteration_factor;
        self.position_iterations = 0;

        while self.position_iterations < limit {
            let Some(index) = worst_contact(contacts, ctx.config.position_epsilon, Contact::penetration) else {
                break;
            };

            let contact = &mut contacts[index];
            contact.match_awake_state(ctx.bodies);
            let penetration = contact.penetration();
            let change = contact.resolve_interpenetration(
                penetration,
                ctx.bodies,
                ctx.targets,
                ctx.config.angular_move_limit,
            );
            let moved = contact.bodies();

            for other in contacts.iter_mut() {
                for (d, handle) in moved.iter().enumerate() {
                    if let Some(handle) = handle {
                        other.propagate_position_change(*handle, &change, d);
                    }
                }
            }

            self.position_iterations += 1;
        }

        tracing::trace!(iterations = self.position_iterations, limit, "position pass");
    }

    fn resolve_velocities(&mut self, contacts: &mut [Contact], ctx: &mut ResolutionContext<'_>) {
        let limit = contacts.len() * ctx.config.iteration_factor;
        self.velocity_iterations = 0;

        while self.velocity_iterations < limit {
            let Some(index) =
                worst_contact(contacts, ctx.config.velocity_epsilon, Contact::desired_delta_velocity)
            else {
                break;
            };

            let contact = &mut contacts[index];
            contact.match_awake_state(ctx.bodies);
            let change = contact.resolve_impulse(ctx.bodies);
            let moved = contact.bodies();

            for other in contacts.iter_mut() {
                let mut touched = false;
                for (d, handle) in moved.iter().enumerate() {
                    if let Some(handle) = handle {
                        touched |= other.propagate_velocity_change(*handle, &change, d);
                    }
                }
                if touched {
                    other.update_desired_delta_velocity(
                        ctx.bodies,
                        ctx.quantum,
                        ctx.config.restitution_speed_threshold,
                    );
                }
            }

            self.velocity_iterations += 1;
        }

        tracing::trace!(iterations = self.velocity_iterations, limit, "velocity pass");
    }

    fn stats(&self) -> ResolutionStats {
        ResolutionStats {
            position_iterations: self.position_iterations,
            velocity_iterations: self.velocity_iterations,
        }
    }
}

fn resolver_for(strategy: ResolutionStrategy) -> Box<dyn ContactResolver> {
    match strategy {
        ResolutionStrategy::Coarse => Box::new(CoarseResolver::default()),
        ResolutionStrategy::Iterative => Box::new(IterativeResolver::default()),
    }
}

/// Detects contacts between active bodies into a fixed-capacity queue and
/// resolves them.
///
/// The queue is allocated once; each step overwrites it from the start.
pub struct Solver {
    config: SolverConfig,
    contacts: Vec<Contact>,

    /// Body pair tested for each queued contact, in queue order
    pairs: Vec<(BodyHandle, BodyHandle)>,

    /// Next free slot of the queue
    cursor: usize,

    state: SolverState,
    last_resolution: ResolutionStats,
    overflowed: bool,
    overflow_count: u64,

    broad_phase: BoundingSphereBroadPhase,
    detector: CollisionDetector,
    resolver: Box<dyn ContactResolver>,
}

impl Solver {
    /// Creates a solver with the queue sized by `config.contact_capacity`
    pub fn new(config: SolverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: SolverConfig) -> Self {
        Self {
            contacts: vec![Contact::default(); config.contact_capacity],
            pairs: Vec::with_capacity(config.contact_capacity),
            cursor: 0,
            state: SolverState::Idle,
            last_resolution: ResolutionStats::default(),
            overflowed: false,
            overflow_count: 0,
            broad_phase: BoundingSphereBroadPhase::new(config.broad_phase_margin),
            detector: CollisionDetector::new(),
            resolver: resolver_for(config.strategy),
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Switches the resolution strategy used from the next step on
    pub fn set_strategy(&mut self, strategy: ResolutionStrategy) {
        self.config.strategy = strategy;
        self.resolver = resolver_for(strategy);
    }

    #[inline]
    pub fn state(&self) -> SolverState {
        self.state
    }

    /// Iterations spent by the last `resolve_contacts`
    #[inline]
    pub fn last_resolution(&self) -> ResolutionStats {
        self.last_resolution
    }

    /// Contacts queued by the last detection
    #[inline]
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts[..self.cursor]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.contacts.len()
    }

    /// Whether the last detection ran out of queue slots
    #[inline]
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// Number of detections that ran out of queue slots so far
    #[inline]
    pub fn overflow_count(&self) -> u64 {
        self.overflow_count
    }

    fn has_pair(&self, a: BodyHandle, b: BodyHandle) -> bool {
        self.pairs
            .iter()
            .any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
    }

    /// Empties the queue and fills it with the contacts between every
    /// unordered pair of `active` bodies. Returns the number of contacts.
    ///
    /// Pairs where neither body is awake are skipped. When the queue is full
    /// the remaining pairs are dropped for this step.
    pub fn detect_contacts(
        &mut self,
        active: &[BodyHandle],
        bodies: &BodyStorage<RigidBody>,
        targets: &TargetStorage<Target>,
        quantum: f32,
    ) -> usize {
        self.state = SolverState::DetectContacts;
        self.cursor = 0;
        self.pairs.clear();
        self.overflowed = false;

        'pairs: for (i, &handle_a) in active.iter().enumerate() {
            let Some(body_a) = bodies.get(handle_a) else { continue };
            let Some(target_a) = targets.get(body_a.target()) else { continue };

            for &handle_b in &active[i + 1..] {
                if handle_a == handle_b {
                    continue;
                }
                let Some(body_b) = bodies.get(handle_b) else { continue };
                if !body_a.is_awake() && !body_b.is_awake() {
                    continue;
                }
                if self.has_pair(handle_a, handle_b) {
                    continue;
                }
                let Some(target_b) = targets.get(body_b.target()) else { continue };
                if !self.broad_phase.may_collide(target_a, target_b) {
                    continue;
                }

                let detected = self.detector.detect(
                    &Collider::new(body_a.model(), target_a),
                    &Collider::new(body_b.model(), target_b),
                );
                let Some((participants, geometry)) = detected else { continue };

                if self.cursor == self.contacts.len() {
                    self.overflowed = true;
                    self.overflow_count += 1;
                    tracing::warn!(
                        capacity = self.contacts.len(),
                        overflows = self.overflow_count,
                        "contact queue overflow, dropping remaining contacts for this step"
                    );
                    break 'pairs;
                }

                let (first, second) = match participants {
                    ContactBodies::Both => (handle_a, Some(handle_b)),
                    ContactBodies::FirstAgainstWorld => (handle_a, None),
                    ContactBodies::SecondAgainstWorld => (handle_b, None),
                };

                let contact = &mut self.contacts[self.cursor];
                contact.initialize(first, second, geometry, bodies);
                contact.prepare(bodies, targets, quantum, self.config.restitution_speed_threshold);
                self.pairs.push((handle_a, handle_b));
                self.cursor += 1;
            }
        }

        self.cursor
    }

    /// Resolves the queued contacts with the configured strategy: positions
    /// first, then impulses
    pub fn resolve_contacts(
        &mut self,
        bodies: &mut BodyStorage<RigidBody>,
        targets: &mut TargetStorage<Target>,
        quantum: f32,
    ) {
        let count = self.cursor;
        let mut ctx = ResolutionContext {
            bodies,
            targets,
            config: &self.config,
            quantum,
        };

        if count > 0 {
            self.state = SolverState::ResolvePositions;
            self.resolver.resolve_positions(&mut self.contacts[..count], &mut ctx);

            self.state = SolverState::ResolveImpulses;
            self.resolver.resolve_velocities(&mut self.contacts[..count], &mut ctx);
            self.last_resolution = self.resolver.stats();
        } else {
            self.last_resolution = ResolutionStats::default();
        }

        self.state = SolverState::Idle;
    }

    /// Detects and resolves in one go
    pub fn step(
        &mut self,
        active: &[BodyHandle],
        bodies: &mut BodyStorage<RigidBody>,
        targets: &mut TargetStorage<Target>,
        quantum: f32,
    ) -> usize {
        let count = self.detect_contacts(active, bodies, targets, quantum);
        self.resolve_contacts(bodies, targets, quantum);
        count
    }
}

impl Default for Solver {
    fn default() -> Self {
        Self::build(SolverConfig::default())
    }
}

impl std::fmt::Debug for Solver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Solver")
            .field("config", &self.config)
            .field("contacts", &self.cursor)
            .field("capacity", &self.contacts.len())
            .field("state", &self.state)
            .field("overflow_count", &self.overflow_count)
            .finish()
    }
}
