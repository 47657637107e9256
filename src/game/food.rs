use super::bounds::ArenaBounds;
use super::math::distance;
use super::types::Point;
use rand::Rng;
use slotmap::{new_key_type, Key, SlotMap};

new_key_type! {
    pub struct FoodId;
}

impl FoodId {
    pub fn as_u64(self) -> u64 {
        self.data().as_ffi()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoodPellet {
    pub position: Point,
    pub growth_amount: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoodSettings {
    pub initial_count: usize,
    pub min_distance_from_snakes: f64,
    pub max_spawn_attempts: usize,
    pub growth_amount: usize,
}

#[derive(Debug, Clone)]
pub struct FoodSpawner {
    pellets: SlotMap<FoodId, FoodPellet>,
    settings: FoodSettings,
}

impl FoodSpawner {
    pub fn new(settings: FoodSettings) -> Self {
        Self {
            pellets: SlotMap::with_key(),
            settings,
        }
    }

    pub fn len(&self) -> usize {
        self.pellets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pellets.is_empty()
    }

    pub fn get(&self, id: FoodId) -> Option<&FoodPellet> {
        self.pellets.get(id)
    }

    pub fn positions(&self) -> Vec<(FoodId, Point)> {
        self.pellets
            .iter()
            .map(|(id, pellet)| (id, pellet.position))
            .collect()
    }

    /// Tops the field up to `initial_count` pellets. Returns how many were spawned.
    pub fn populate<R: Rng + ?Sized>(
        &mut self,
        bounds: &ArenaBounds,
        heads: &[Point],
        rng: &mut R,
    ) -> usize {
        let mut spawned = 0;
        while self.pellets.len() < self.settings.initial_count {
            self.spawn(bounds, heads, rng);
            spawned += 1;
        }
        spawned
    }

    pub fn spawn<R: Rng + ?Sized>(
        &mut self,
        bounds: &ArenaBounds,
        heads: &[Point],
        rng: &mut R,
    ) -> FoodId {
        let position = self.find_valid_position(bounds, heads, rng);
        self.pellets.insert(FoodPellet {
            position,
            growth_amount: self.settings.growth_amount,
        })
    }

    /// Drops a pellet at an exact position, skipping placement rules.
    pub fn place(&mut self, position: Point) -> FoodId {
        self.pellets.insert(FoodPellet {
            position,
            growth_amount: self.settings.growth_amount,
        })
    }

    fn find_valid_position<R: Rng + ?Sized>(
        &self,
        bounds: &ArenaBounds,
        heads: &[Point],
        rng: &mut R,
    ) -> Point {
        let mut position = bounds.center();
        for _ in 0..self.settings.max_spawn_attempts {
            position = bounds.random_point(rng);
            if self.is_position_valid(position, heads) {
                return position;
            }
        }
        tracing::warn!(
            attempts = self.settings.max_spawn_attempts,
            "no valid food position found, using last candidate"
        );
        position
    }

    pub fn is_position_valid(&self, position: Point, heads: &[Point]) -> bool {
        heads
            .iter()
            .all(|head| distance(position, *head) >= self.settings.min_distance_from_snakes)
    }

    /// Removes a collected pellet and spawns its replacement.
    pub fn collect<R: Rng + ?Sized>(
        &mut self,
        id: FoodId,
        bounds: &ArenaBounds,
        heads: &[Point],
        rng: &mut R,
    ) -> Option<FoodPellet> {
        let pellet = self.pellets.remove(id)?;
        self.spawn(bounds, heads, rng);
        Some(pellet)
    }

    pub fn clear(&mut self) {
        self.pellets.clear();
    }
}
