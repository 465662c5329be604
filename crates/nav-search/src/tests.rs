//! Unit tests for nav-search.

#[cfg(test)]
mod helpers {
    use nav_core::{CELL_SIZE, CellPos, HALF_CELL, SimRng, WorldPos};
    use nav_grid::GridMap;

    pub const RADIUS: i32 = 256;

    pub fn center(x: i32, y: i32) -> WorldPos {
        WorldPos::flat(x * CELL_SIZE + HALF_CELL, y * CELL_SIZE + HALF_CELL)
    }

    /// `size × size` map with roughly `density` of its cells blocked.
    pub fn random_map(seed: u64, size: i32, density: f64) -> GridMap {
        let mut rng = SimRng::new(seed);
        let mut map = GridMap::new(size, size, 1).unwrap();
        for y in 0..size {
            for x in 0..size {
                if rng.gen_bool(density) {
                    map.set_blocked(CellPos::ground(x, y), true).unwrap();
                }
            }
        }
        map
    }
}

// ── Path ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod path {
    use nav_core::WorldPos;
    use crate::Path;

    #[test]
    fn adjacent_duplicates_dropped() {
        let a = WorldPos::flat(0, 0);
        let b = WorldPos::flat(300, 400);
        let p = Path::new([a, a, b, b, a]);
        assert_eq!(p.to_vec(), vec![a, b, a]);
    }

    #[test]
    fn polyline_length() {
        let p = Path::new([WorldPos::flat(0, 0), WorldPos::flat(300, 400), WorldPos::flat(300, 1400)]);
        assert_eq!(p.length(), 1_500);
        assert_eq!(p.length_from(WorldPos::flat(-300, -400)), 2_000);
        assert_eq!(Path::empty().length(), 0);
    }

    #[test]
    fn pop_front_consumes() {
        let mut p = Path::new([WorldPos::flat(1, 0), WorldPos::flat(2, 0)]);
        assert_eq!(p.pop_front(), Some(WorldPos::flat(1, 0)));
        assert_eq!(p.front(), Some(WorldPos::flat(2, 0)));
        assert_eq!(p.len(), 1);
        p.pop_front();
        assert!(p.is_empty());
        assert_eq!(p.pop_front(), None);
    }

    #[test]
    fn direct_hop() {
        let d = WorldPos::flat(9, 9);
        assert_eq!(Path::direct(d).to_vec(), vec![d]);
    }
}

// ── Corner padding ────────────────────────────────────────────────────────────

#[cfg(test)]
mod pad {
    use nav_core::{CornerPos, WorldPos};
    use nav_grid::GridMap;
    use crate::pad_corner;

    #[test]
    fn one_blocked_cell_pushes_away() {
        // Only cell (1,1) is blocked; corner (2,2) has it to its lower left.
        let map = GridMap::from_ascii("....\n.#..\n....\n....").unwrap();
        assert_eq!(pad_corner(&map, CornerPos::ground(2, 2), 100), WorldPos::flat(2148, 2148));
        assert_eq!(pad_corner(&map, CornerPos::ground(1, 1), 100), WorldPos::flat(924, 924));
        assert_eq!(pad_corner(&map, CornerPos::ground(1, 2), 100), WorldPos::flat(924, 2148));
    }

    #[test]
    fn three_blocked_cells_pull_into_open_cell() {
        let map = GridMap::from_ascii("##..\n#...\n....").unwrap();
        // Corner (1,1): cells (0,0), (1,0), (0,1) blocked, (1,1) open.
        assert_eq!(pad_corner(&map, CornerPos::ground(1, 1), 100), WorldPos::flat(1124, 1124));
    }

    #[test]
    fn walls_and_diagonal_pairs_are_not_padded() {
        let wall = GridMap::from_ascii("##..\n....").unwrap();
        assert_eq!(pad_corner(&wall, CornerPos::ground(1, 1), 100), CornerPos::ground(1, 1).to_world());

        let diagonal = GridMap::from_ascii("#...\n.#..").unwrap();
        assert_eq!(pad_corner(&diagonal, CornerPos::ground(1, 1), 100), CornerPos::ground(1, 1).to_world());
    }

    #[test]
    fn open_corner_is_exact() {
        let map = GridMap::new(4, 4, 1).unwrap();
        assert_eq!(pad_corner(&map, CornerPos::ground(2, 2), 100), CornerPos::ground(2, 2).to_world());
    }
}

// ── Search lifecycle ──────────────────────────────────────────────────────────

#[cfg(test)]
mod search {
    use nav_core::{CornerPos, Layer, PathfinderConfig, SearchId, WorldPos};
    use nav_grid::{GridMap, GridMapBuilder};
    use super::helpers::{RADIUS, center};
    use crate::{ListTag, PathfinderSearch, SearchRequest, SearchStatus};

    fn request(from: WorldPos, to: WorldPos) -> SearchRequest {
        SearchRequest::new(from, to, Layer::GROUND, RADIUS)
    }

    #[test]
    fn same_point_finishes_immediately_with_empty_path() {
        let map = GridMap::new(8, 8, 1).unwrap();
        let s = PathfinderSearch::new(SearchId(1), request(center(3, 3), center(3, 3)), &PathfinderConfig::default(), &map);
        assert_eq!(s.status(), SearchStatus::Found);
        assert!(s.path().is_empty());
        assert_eq!(s.expansions(), 0);
    }

    #[test]
    fn expand_respects_budget() {
        let map = GridMap::new(30, 30, 1).unwrap();
        let mut s = PathfinderSearch::new(SearchId(1), request(center(0, 0), center(29, 3)), &PathfinderConfig::default(), &map);
        let mut total = 0;
        while !s.is_finished() {
            let n = s.expand(&map, 3);
            assert!(n <= 3);
            total += n;
        }
        assert_eq!(total, s.expansions());
        assert_eq!(s.status(), SearchStatus::Found);
    }

    #[test]
    fn sliced_run_matches_single_run() {
        let map = super::helpers::random_map(99, 24, 0.2);
        let cfg = PathfinderConfig::default();
        let (from, to) = (WorldPos::flat(600, 600), WorldPos::flat(23_000, 22_500));

        let mut whole = PathfinderSearch::new(SearchId(1), request(from, to), &cfg, &map);
        whole.run_to_end(&map);

        let mut sliced = PathfinderSearch::new(SearchId(2), request(from, to), &cfg, &map);
        while !sliced.is_finished() {
            sliced.expand(&map, 5);
        }
        assert_eq!(whole.status(), sliced.status());
        assert_eq!(whole.path(), sliced.path());
        assert_eq!(whole.expansions(), sliced.expansions());
    }

    #[test]
    fn open_list_never_holds_a_corner_twice() {
        let map = super::helpers::random_map(7, 20, 0.25);
        let mut s = PathfinderSearch::new(
            SearchId(1),
            request(center(1, 1), center(18, 18)),
            &PathfinderConfig::default(),
            &map,
        );
        while !s.is_finished() {
            s.expand(&map, 1);
            let open_tagged = s.states().filter(|(_, st)| st.list == ListTag::Open).count();
            assert_eq!(open_tagged, s.open_len());
        }
    }

    #[test]
    fn start_is_its_own_parent() {
        let map = GridMap::new(8, 8, 1).unwrap();
        let s = PathfinderSearch::new(SearchId(1), request(center(1, 1), center(6, 6)), &PathfinderConfig::default(), &map);
        let start = s.start_corner();
        let st = s.state(start).unwrap();
        assert_eq!(st.parent, start);
        assert_eq!(st.g, 0);
        assert_eq!(st.list, ListTag::Open);
    }

    #[test]
    fn expansion_cap_fails_search() {
        let map = GridMapBuilder::new(40, 40).wall_x(20, 0, 38, Layer::GROUND).build().unwrap();
        let cfg = PathfinderConfig { max_expansions: 5, ..PathfinderConfig::default() };
        let mut s = PathfinderSearch::new(SearchId(1), request(center(2, 2), center(37, 2)), &cfg, &map);
        s.run_to_end(&map);
        assert_eq!(s.status(), SearchStatus::Failed);
        assert_eq!(s.expansions(), 5);
        assert!(s.path().is_empty());
    }

    #[test]
    fn sealed_off_destination_fails() {
        let map = GridMapBuilder::new(20, 20).wall_x(10, 0, 19, Layer::GROUND).build().unwrap();
        let mut s = PathfinderSearch::new(
            SearchId(1),
            request(center(2, 5), center(15, 5)),
            &PathfinderConfig::default(),
            &map,
        );
        s.run_to_end(&map);
        assert_eq!(s.status(), SearchStatus::Failed);
        assert!(s.path().is_empty());
    }

    #[test]
    fn no_usable_endpoint_fails_without_expanding() {
        let map = GridMapBuilder::new(10, 10).block_rect(0, 0, 9, 9, Layer::GROUND).build().unwrap();
        let s = PathfinderSearch::new(SearchId(1), request(center(1, 1), center(8, 8)), &PathfinderConfig::default(), &map);
        assert_eq!(s.status(), SearchStatus::Failed);
        assert_eq!(s.expansions(), 0);
    }

    #[test]
    fn off_map_destination_is_clamped() {
        let map = GridMap::new(10, 10, 1).unwrap();
        let mut s = PathfinderSearch::new(
            SearchId(1),
            request(center(5, 5), WorldPos::flat(-3_000, 5_000)),
            &PathfinderConfig::default(),
            &map,
        );
        s.run_to_end(&map);
        assert_eq!(s.goal_corner(), CornerPos::ground(0, 5));
        assert_eq!(s.path().last(), Some(WorldPos::flat(0, 5_120)));
    }

    #[test]
    fn sharing_agents_are_deduplicated() {
        use nav_core::AgentId;
        let map = GridMap::new(4, 4, 1).unwrap();
        let mut s = PathfinderSearch::new(SearchId(1), request(center(0, 0), center(3, 3)), &PathfinderConfig::default(), &map);
        s.add_agent(AgentId(4));
        s.add_agent(AgentId(2));
        s.add_agent(AgentId(4));
        assert_eq!(s.agents(), &[AgentId(4), AgentId(2)]);
        assert!(s.remove_agent(AgentId(4)));
        assert!(!s.remove_agent(AgentId(4)));
    }

    #[test]
    fn delay_counts_down() {
        let map = GridMap::new(4, 4, 1).unwrap();
        let mut s = PathfinderSearch::new(SearchId(1), request(center(0, 0), center(3, 3)), &PathfinderConfig::default(), &map);
        s.set_delay(2);
        assert!(s.consume_delay());
        assert!(s.consume_delay());
        assert!(!s.consume_delay());
        assert_eq!(s.delay(), 0);
    }
}

// ── Path quality & scenarios ──────────────────────────────────────────────────

#[cfg(test)]
mod scenarios {
    use nav_core::{CELL_SIZE, CellPos, CornerPos, Layer, PathfinderConfig, SearchId, WorldPos};
    use nav_grid::{GridMap, GridMapBuilder, corner_line_of_sight, segment_clear};
    use super::helpers::{RADIUS, center, random_map};
    use crate::{PathfinderSearch, SearchRequest, ThetaStarPathfinder};

    #[test]
    fn no_op_query_is_empty_everywhere() {
        let map = random_map(3, 16, 0.3);
        let pf = ThetaStarPathfinder::default();
        for p in [WorldPos::ZERO, center(4, 9), WorldPos::flat(7_777, 123), WorldPos::flat(-50, 99_999)] {
            assert!(pf.find_path(&map, p, p, Layer::GROUND, RADIUS).is_empty(), "{p}");
        }
    }

    #[test]
    fn identical_queries_give_identical_paths() {
        let map = random_map(42, 32, 0.2);
        let pf = ThetaStarPathfinder::default();
        let queries = [
            (center(0, 0), center(31, 31)),
            (center(5, 27), center(28, 3)),
            (WorldPos::flat(10_000, 200), WorldPos::flat(300, 31_000)),
        ];
        for (a, b) in queries {
            let first = pf.find_path(&map, a, b, Layer::GROUND, RADIUS);
            let second = pf.find_path(&map, a, b, Layer::GROUND, RADIUS);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn open_diagonal_is_one_straight_segment() {
        let map = GridMap::new(20, 20, 1).unwrap();
        let source = WorldPos::flat(0, 0);
        let destination = CornerPos::ground(19, 19).to_world();
        let path = ThetaStarPathfinder::default().find_path(&map, source, destination, Layer::GROUND, RADIUS);

        assert_eq!(path.len(), 2, "{path:?}");
        assert_eq!(path.last(), Some(destination));
        let straight = source.distance_2d(destination) as i64;
        assert!(path.length() <= straight, "{} > {straight}", path.length());
        assert!(path.length() * 100 >= straight * 95);
    }

    #[test]
    fn clear_line_means_near_straight_path() {
        let map = random_map(11, 32, 0.08);
        let pf = ThetaStarPathfinder::default();
        let mut checked = 0;
        for i in 0..12 {
            let a = center(i, (i * 7) % 32);
            let b = center(31 - (i * 3) % 32, (i * 5 + 11) % 32);
            if a == b
                || map_blocked(&map, a)
                || map_blocked(&map, b)
                || !segment_clear(&map, a, b, Layer::GROUND)
            {
                continue;
            }
            let path = pf.find_path(&map, a, b, Layer::GROUND, RADIUS);
            assert!(!path.is_empty());
            let straight = a.distance_2d(b) as i64;
            assert!(
                path.length() <= straight * 12 / 10 + 3 * CELL_SIZE as i64,
                "{a} → {b}: {} vs {straight}",
                path.length()
            );
            checked += 1;
        }
        assert!(checked > 0);
    }

    fn map_blocked(map: &GridMap, p: WorldPos) -> bool {
        use nav_grid::BlockingOracle;
        map.is_blocked(p.to_cell(Layer::GROUND))
    }

    #[test]
    fn wall_with_single_gap() {
        let map = GridMapBuilder::new(20, 20)
            .wall_x(10, 0, 19, Layer::GROUND)
            .open(CellPos::ground(10, 7))
            .build()
            .unwrap();
        let destination = center(17, 15);
        let mut s = PathfinderSearch::new(
            SearchId(1),
            SearchRequest::new(center(2, 2), destination, Layer::GROUND, RADIUS),
            &PathfinderConfig::default(),
            &map,
        );
        s.run_to_end(&map);

        assert!(!s.path().is_empty());
        let gap_corners = [(10, 7), (11, 7), (10, 8), (11, 8)].map(|(x, y)| CornerPos::ground(x, y));
        assert!(
            s.corner_path().iter().any(|c| gap_corners.contains(c)),
            "{:?}",
            s.corner_path()
        );
        for pair in s.corner_path().windows(2) {
            assert!(corner_line_of_sight(&map, pair[0], pair[1]));
        }
        assert_eq!(s.path().last(), Some(destination));
    }

    #[test]
    fn enclosed_destination_ends_outside() {
        let map = GridMapBuilder::new(20, 20)
            .block_rect(9, 9, 11, 11, Layer::GROUND)
            .open(CellPos::ground(10, 10))
            .build()
            .unwrap();
        let destination = center(10, 10);
        let path = ThetaStarPathfinder::default().find_path(&map, center(2, 2), destination, Layer::GROUND, RADIUS);

        assert!(!path.is_empty());
        assert_ne!(path.last(), Some(destination));
        assert_eq!(path.last(), Some(CornerPos::ground(10, 9).to_world()));
    }

    #[test]
    fn path_is_ordered_source_to_destination() {
        let map = GridMapBuilder::new(16, 16).wall_y(8, 2, 15, Layer::GROUND).build().unwrap();
        let (a, b) = (center(12, 2), center(12, 13));
        let path = ThetaStarPathfinder::default().find_path(&map, a, b, Layer::GROUND, RADIUS);
        let pts = path.to_vec();
        assert!(pts.len() >= 3, "must go around the wall: {pts:?}");
        assert!(pts[0].distance_2d(a) < CELL_SIZE);
        assert_eq!(*pts.last().unwrap(), b);
        for w in pts.windows(2) {
            assert_ne!(w[0], w[1]);
        }
    }

    #[test]
    fn unreachable_gives_empty_path() {
        let map = GridMapBuilder::new(12, 12).wall_y(6, 0, 11, Layer::GROUND).build().unwrap();
        let pf = ThetaStarPathfinder::new(PathfinderConfig::default());
        assert!(pf.find_path(&map, center(3, 2), center(3, 9), Layer::GROUND, RADIUS).is_empty());
    }
}
