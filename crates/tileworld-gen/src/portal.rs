//! Bidirectional links between exterior houses and interior doors.

use std::collections::HashMap;

use serde::Serialize;
use tileworld_common::{PortalDestination, TileMetadata, TilePos, WorldId};
use tileworld_store::{PortalRequest, WorldStore};
use tracing::{debug, warn};

use crate::world::World;

/// A house whose interior exists but is not yet linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingLink {
    /// House tile on the exterior
    pub exterior_pos: TilePos,
    /// Interior world spawned by the house
    pub interior_id: WorldId,
    /// Door tile inside the interior
    pub interior_door: TilePos,
}

/// Both directions of one configured portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortalPair {
    /// House tile pointing at the door
    pub inbound: (WorldId, TilePos),
    /// Door tile pointing back at the house
    pub outbound: (WorldId, TilePos),
}

/// A return link the store did not configure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortalWarning {
    /// Interior whose door is unlinked
    pub interior_id: WorldId,
    /// The door tile
    pub door: TilePos,
    /// Store message or error
    pub message: String,
}

/// Configures portal pairs.
///
/// Pairs are keyed by exterior house tile, so linking the same house again
/// reconfigures the existing pair.
pub struct PortalLinker<'s> {
    store: &'s dyn WorldStore,
    pairs: HashMap<(WorldId, TilePos), PortalPair>,
}

impl<'s> PortalLinker<'s> {
    /// Creates a linker issuing return requests to `store`.
    #[must_use]
    pub fn new(store: &'s dyn WorldStore) -> Self {
        Self {
            store,
            pairs: HashMap::new(),
        }
    }

    /// Links a house on `exterior` to its interior door.
    ///
    /// The house tile always gains its destination. The return direction is
    /// requested from the store; if that fails the failure is returned as a
    /// warning and nothing is undone. When `interior` is given and the
    /// return request succeeds, its door feature gains the matching
    /// destination.
    pub fn link(
        &mut self,
        exterior: &mut World,
        link: &PendingLink,
        interior: Option<&mut World>,
    ) -> Option<PortalWarning> {
        let to_door = PortalDestination::new(link.interior_id, link.interior_door);
        let to_house = PortalDestination::new(exterior.id(), link.exterior_pos);

        exterior.set_metadata(link.exterior_pos, TileMetadata::Portal(to_door));
        self.pairs.insert(
            (exterior.id(), link.exterior_pos),
            PortalPair {
                inbound: (exterior.id(), link.exterior_pos),
                outbound: (link.interior_id, link.interior_door),
            },
        );

        let request = PortalRequest::new(link.interior_id, link.interior_door, to_house);
        let failure = match self.store.configure_portal(&request) {
            Ok(ack) if ack.success => None,
            Ok(ack) => Some(ack.message),
            Err(e) => Some(e.to_string()),
        };

        match failure {
            None => {
                if let Some(interior) = interior {
                    interior.set_metadata(link.interior_door, TileMetadata::Portal(to_house));
                }
                debug!(
                    house = %link.exterior_pos,
                    interior = %link.interior_id,
                    "Linked portal pair"
                );
                None
            },
            Some(message) => {
                warn!(
                    interior = %link.interior_id,
                    door = %link.interior_door,
                    "Return portal not configured: {message}"
                );
                Some(PortalWarning {
                    interior_id: link.interior_id,
                    door: link.interior_door,
                    message,
                })
            },
        }
    }

    /// Number of configured pairs.
    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    /// Pair anchored at a house tile.
    #[must_use]
    pub fn pair(&self, exterior_id: WorldId, house: TilePos) -> Option<&PortalPair> {
        self.pairs.get(&(exterior_id, house))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::world::Feature;
    use tileworld_common::TerrainKind;
    use tileworld_store::{FailurePlan, MemoryWorldStore, ServerSpec};

    fn spec(name: &str) -> ServerSpec {
        ServerSpec {
            name: name.into(),
            max_players: 10,
            width: 4,
            height: 4,
        }
    }

    fn world_with_house(id: WorldId, house: TilePos) -> World {
        let base = Grid::new(4, 4, TerrainKind::Plain).expect("valid dims");
        let mut terrain = base.clone();
        terrain.set(house, TerrainKind::House);
        World::new(id, "exterior", base, terrain, vec![Feature::new(house, TerrainKind::House)])
    }

    fn interior(id: WorldId, door: TilePos) -> World {
        let mut base = Grid::new(4, 4, TerrainKind::Floor).expect("valid dims");
        base.set(door, TerrainKind::Door);
        World::new(id, "interior", base.clone(), base, vec![Feature::new(door, TerrainKind::Door)])
    }

    #[test]
    fn test_link_sets_both_directions() {
        let store = MemoryWorldStore::new();
        let exterior_id = store.create_server(&spec("ext")).expect("create failed");
        let interior_id = store.create_server(&spec("int")).expect("create failed");
        let house = TilePos::new(1, 2);
        let door = TilePos::new(2, 3);
        let mut exterior = world_with_house(exterior_id, house);
        let mut inside = interior(interior_id, door);

        let mut linker = PortalLinker::new(&store);
        let warning = linker.link(
            &mut exterior,
            &PendingLink {
                exterior_pos: house,
                interior_id,
                interior_door: door,
            },
            Some(&mut inside),
        );

        assert!(warning.is_none());
        let meta = exterior.feature_at(house).and_then(|f| f.meta.portal()).copied();
        assert_eq!(meta, Some(PortalDestination::new(interior_id, door)));
        assert_eq!(
            inside.feature_at(door).and_then(|f| f.meta.portal()).copied(),
            Some(PortalDestination::new(exterior_id, house))
        );
        assert_eq!(
            store.portal(interior_id, door),
            Some(PortalDestination::new(exterior_id, house))
        );
    }

    #[test]
    fn test_relink_does_not_duplicate() {
        let store = MemoryWorldStore::new();
        let exterior_id = store.create_server(&spec("ext")).expect("create failed");
        let interior_id = store.create_server(&spec("int")).expect("create failed");
        let house = TilePos::new(0, 0);
        let door = TilePos::new(2, 3);
        let mut exterior = world_with_house(exterior_id, house);
        let link = PendingLink {
            exterior_pos: house,
            interior_id,
            interior_door: door,
        };

        let mut linker = PortalLinker::new(&store);
        linker.link(&mut exterior, &link, None);
        linker.link(&mut exterior, &link, None);

        assert_eq!(linker.pair_count(), 1);
        assert_eq!(store.portal_count(), 1);
        assert_eq!(store.portal_calls(), 2);
        assert_eq!(exterior.features_of(TerrainKind::House).count(), 1);
        assert_eq!(exterior.features().len(), 1);
    }

    #[test]
    fn test_return_failure_is_reported_not_fatal() {
        let store = MemoryWorldStore::with_failures(FailurePlan {
            fail_portals: true,
            ..FailurePlan::default()
        });
        let exterior_id = store.create_server(&spec("ext")).expect("create failed");
        let interior_id = store.create_server(&spec("int")).expect("create failed");
        let house = TilePos::new(3, 3);
        let door = TilePos::new(2, 3);
        let mut exterior = world_with_house(exterior_id, house);
        let mut inside = interior(interior_id, door);

        let mut linker = PortalLinker::new(&store);
        let warning = linker
            .link(
                &mut exterior,
                &PendingLink {
                    exterior_pos: house,
                    interior_id,
                    interior_door: door,
                },
                Some(&mut inside),
            )
            .expect("failure should be reported");

        assert_eq!(warning.interior_id, interior_id);
        assert_eq!(warning.door, door);
        // The house side is still configured; the door side is not.
        assert!(exterior.feature_at(house).and_then(|f| f.meta.portal()).is_some());
        assert!(inside.feature_at(door).and_then(|f| f.meta.portal()).is_none());
        assert_eq!(store.server_count(), 2);
        assert!(linker.pair(exterior_id, house).is_some());
    }
}
