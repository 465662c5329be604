//! Unit tests for nav-agent.

#[cfg(test)]
mod builder {
    use nav_core::{AgentId, HALF_CELL, Layer, NavError, PlayerId, WorldPos};
    use crate::{AgentSpec, AgentStoreBuilder};

    #[test]
    fn ids_are_sequential() {
        let mut b = AgentStoreBuilder::new();
        let a = b.add(AgentSpec::new(PlayerId(0), WorldPos::flat(0, 0)));
        let c = b.add(AgentSpec::new(PlayerId(1), WorldPos::flat(10, 0)));
        assert_eq!(a, AgentId(0));
        assert_eq!(c, AgentId(1));
        assert_eq!(b.agent_count(), 2);
    }

    #[test]
    fn build_fills_every_array() {
        let store = AgentStoreBuilder::new()
            .agent(AgentSpec::new(PlayerId(3), WorldPos::flat(5, 6)).radius(100).speed(40))
            .agent(AgentSpec::new(PlayerId(3), WorldPos::flat(7, 8)).layer(Layer::TUNNEL))
            .build()
            .unwrap();
        assert_eq!(store.count, 2);
        for len in [
            store.pos.len(),
            store.layer.len(),
            store.facing.len(),
            store.radius.len(),
            store.speed.len(),
            store.owner.len(),
            store.attacking.len(),
            store.alive.len(),
            store.visible.len(),
            store.returning_to_cell.len(),
        ] {
            assert_eq!(len, 2);
        }
        assert_eq!(store.radius[0], 100);
        assert_eq!(store.speed[1], AgentSpec::DEFAULT_SPEED);
        assert_eq!(store.layer[1], Layer::TUNNEL);
        assert!(store.alive.iter().all(|&a| a));
        assert!(store.visible.iter().all(|&v| v));
        assert!(!store.attacking[0]);
    }

    #[test]
    fn oversized_footprint_rejected() {
        let err = AgentStoreBuilder::new()
            .agent(AgentSpec::new(PlayerId(0), WorldPos::ZERO).radius(HALF_CELL))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, NavError::Config(_)));
    }

    #[test]
    fn zero_speed_rejected() {
        assert!(
            AgentStoreBuilder::new()
                .agent(AgentSpec::new(PlayerId(0), WorldPos::ZERO).speed(0))
                .build()
                .is_err()
        );
    }

    #[test]
    fn unset_owner_rejected() {
        assert!(
            AgentStoreBuilder::new()
                .agent(AgentSpec::new(PlayerId::INVALID, WorldPos::ZERO))
                .build()
                .is_err()
        );
    }

    #[test]
    fn empty_store() {
        let store = AgentStoreBuilder::default().build().unwrap();
        assert!(store.is_empty());
        assert_eq!(store.agent_ids().count(), 0);
    }
}

#[cfg(test)]
mod store {
    use nav_core::{AgentId, CellPos, PlayerId, WorldPos};
    use crate::{AgentSpec, AgentStoreBuilder};

    #[test]
    fn cell_and_liveness() {
        let mut store = AgentStoreBuilder::new()
            .agent(AgentSpec::new(PlayerId(0), WorldPos::flat(2_100, 1_030)))
            .agent(AgentSpec::new(PlayerId(0), WorldPos::flat(0, 0)))
            .build()
            .unwrap();
        assert_eq!(store.cell(AgentId(0)), CellPos::ground(2, 1));
        store.alive[1] = false;
        assert!(store.is_alive(AgentId(0)));
        assert!(!store.is_alive(AgentId(1)));
        assert!(!store.is_alive(AgentId(7)));
        assert_eq!(store.alive_count(), 1);
    }
}

#[cfg(test)]
mod proximity {
    use nav_core::{AgentId, Layer, PlayerId, WorldPos};
    use crate::{AgentSpec, AgentStore, AgentStoreBuilder, ProximityIndex};

    fn line_of_agents() -> AgentStore {
        let mut b = AgentStoreBuilder::new();
        // Agents at x = 0, 300, 600, 900, 1200 on the ground.
        for i in 0..5 {
            b.add(AgentSpec::new(PlayerId(0), WorldPos::flat(i * 300, 0)));
        }
        b.add(AgentSpec::new(PlayerId(0), WorldPos::flat(300, 0)).layer(Layer::TUNNEL));
        b.build().unwrap()
    }

    #[test]
    fn within_is_sorted_and_layer_filtered() {
        let store = line_of_agents();
        let idx = ProximityIndex::build(&store);
        assert_eq!(idx.len(), 6);
        let near = idx.within(WorldPos::flat(600, 0), Layer::GROUND, 300);
        assert_eq!(near, vec![AgentId(1), AgentId(2), AgentId(3)]);
    }

    #[test]
    fn dead_agents_are_not_indexed() {
        let mut store = line_of_agents();
        store.alive[2] = false;
        let idx = ProximityIndex::build(&store);
        assert_eq!(idx.len(), 5);
        assert!(!idx.within(WorldPos::flat(600, 0), Layer::GROUND, 10).contains(&AgentId(2)));
    }

    #[test]
    fn nearest_excludes_self_and_breaks_ties_by_id() {
        let store = line_of_agents();
        let idx = ProximityIndex::build(&store);
        assert_eq!(idx.nearest(WorldPos::flat(600, 0), Layer::GROUND, Some(AgentId(2))), Some(AgentId(1)));
        assert_eq!(idx.nearest(WorldPos::flat(1_210, 0), Layer::GROUND, None), Some(AgentId(4)));
        assert_eq!(idx.nearest(WorldPos::flat(300, 0), Layer::TUNNEL, None), Some(AgentId(5)));
    }

    #[test]
    fn empty_index() {
        let idx = ProximityIndex::empty();
        assert!(idx.is_empty());
        assert_eq!(idx.nearest(WorldPos::ZERO, Layer::GROUND, None), None);
    }
}
