use crate::content::{DefDatabase, EntityArchetype};

/// Lifetime given to effect instances whose definition does not set one.
pub const DEFAULT_EFFECT_LIFETIME_SECONDS: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Transform {
    pub position: Vec2,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderableKind {
    Placeholder,
    Sprite(String),
}

/// What a world object is, as far as gameplay is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Player-destructible block.
    Breakable,
    /// Level geometry that abilities must leave alone.
    Solid,
    /// Transient visual; never collides.
    Effect,
}

impl EntityKind {
    pub fn as_token(self) -> &'static str {
        match self {
            EntityKind::Breakable => "Breakable",
            EntityKind::Solid => "Solid",
            EntityKind::Effect => "Effect",
        }
    }

    pub fn has_collider(self) -> bool {
        !matches!(self, EntityKind::Effect)
    }
}

/// Axis-aligned box collider centered on the entity position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub size: Vec2,
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub transform: Transform,
    pub kind: EntityKind,
    pub collider: Option<Collider>,
    pub def_name: Option<String>,
    pub remaining_lifetime_seconds: Option<f32>,
}

impl Entity {
    /// Strict AABB test against the entity's collider; entities without one
    /// never overlap anything.
    pub fn overlaps_box(&self, center: Vec2, size: Vec2) -> bool {
        let Some(collider) = self.collider else {
            return false;
        };
        let half_x = (collider.size.x.max(0.0) + size.x.max(0.0)) * 0.5;
        let half_y = (collider.size.y.max(0.0) + size.y.max(0.0)) * 0.5;
        let dx = (self.transform.position.x - center.x).abs();
        let dy = (self.transform.position.y - center.y).abs();
        dx < half_x && dy < half_y
    }
}

#[derive(Debug, Default)]
struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

/// The world object set. Spawns and despawns apply immediately, so an overlap
/// query issued right after an instantiate or destroy sees the new state.
#[derive(Debug, Default)]
pub struct SceneWorld {
    allocator: EntityIdAllocator,
    entities: Vec<Entity>,
    def_database: Option<DefDatabase>,
}

impl SceneWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns an instance of `template` centered at `position`.
    pub fn instantiate(&mut self, template: &EntityArchetype, position: Vec2) -> EntityId {
        let collider = template
            .size
            .filter(|_| template.kind.has_collider())
            .map(|size| Collider { size });
        let remaining_lifetime_seconds = (template.kind == EntityKind::Effect).then(|| {
            template
                .lifetime_seconds
                .unwrap_or(DEFAULT_EFFECT_LIFETIME_SECONDS)
        });
        self.push_entity(
            position,
            template.kind,
            collider,
            Some(template.def_name.clone()),
            remaining_lifetime_seconds,
        )
    }

    /// Spawns level geometry that is not backed by a definition.
    pub fn spawn_static(&mut self, position: Vec2, size: Vec2, kind: EntityKind) -> EntityId {
        let collider = kind.has_collider().then_some(Collider { size });
        self.push_entity(position, kind, collider, None, None)
    }

    fn push_entity(
        &mut self,
        position: Vec2,
        kind: EntityKind,
        collider: Option<Collider>,
        def_name: Option<String>,
        remaining_lifetime_seconds: Option<f32>,
    ) -> EntityId {
        let id = self.allocator.allocate();
        self.entities.push(Entity {
            id,
            transform: Transform { position },
            kind,
            collider,
            def_name,
            remaining_lifetime_seconds,
        });
        id
    }

    pub fn destroy(&mut self, id: EntityId) -> bool {
        let before = self.entities.len();
        self.entities.retain(|entity| entity.id != id);
        self.entities.len() != before
    }

    /// Returns the earliest spawned collider that overlaps the box. Touching
    /// edges do not count and negative extents are treated as zero.
    pub fn overlap_box(&self, center: Vec2, size: Vec2) -> Option<&Entity> {
        self.overlapping(center, size).next()
    }

    /// Every collider overlapping the box, in spawn order.
    pub fn overlapping(&self, center: Vec2, size: Vec2) -> impl Iterator<Item = &Entity> + '_ {
        self.entities
            .iter()
            .filter(move |entity| entity.overlaps_box(center, size))
    }

    /// Ages lifetime-bound entities and removes the expired ones. Returns how
    /// many were removed.
    pub fn tick_lifetimes(&mut self, fixed_dt_seconds: f32) -> usize {
        let before = self.entities.len();
        self.entities
            .retain_mut(|entity| match entity.remaining_lifetime_seconds.as_mut() {
                Some(remaining) => {
                    *remaining -= fixed_dt_seconds;
                    *remaining > 0.0
                }
                None => true,
            });
        before - self.entities.len()
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn count_of_kind(&self, kind: EntityKind) -> usize {
        self.entities
            .iter()
            .filter(|entity| entity.kind == kind)
            .count()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn find_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    pub fn set_def_database(&mut self, def_database: DefDatabase) {
        self.def_database = Some(def_database);
    }

    pub fn def_database(&self) -> Option<&DefDatabase> {
        self.def_database.as_ref()
    }
}

pub trait Scene {
    fn load(&mut self, world: &mut SceneWorld);
    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &super::InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand;
    fn unload(&mut self, world: &mut SceneWorld);
    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        None
    }
}
