use multiverse_map::{
    initialize_positions, run_simulation, simulate_tick, ForceLayout, LayoutAnimation, MapData,
    MapEdge, MapNode, RunLimits,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

const WIDTH: f32 = 800.0;
const HEIGHT: f32 = 600.0;

fn sim(id: &str) -> MapNode {
    let mut node = MapNode::new(id, format!("Sim {}", id)).with_theme("dystopian");
    node.agent_count = 5;
    node.building_count = 3;
    node.event_count = 10;
    node.echo_count = 2;
    node
}

fn assert_in_canvas(nodes: &[MapNode], width: f32, height: f32) {
    for n in nodes {
        assert!(n.x.is_finite() && n.y.is_finite(), "{} has non-finite position", n.id);
        assert!(n.vx.is_finite() && n.vy.is_finite(), "{} has non-finite velocity", n.id);
        assert!((0.0..=width).contains(&n.x), "{} x out of canvas: {}", n.id, n.x);
        assert!((0.0..=height).contains(&n.y), "{} y out of canvas: {}", n.id, n.y);
    }
}

#[test]
fn two_disjoint_pairs_settle_closer_together() {
    let mut nodes = vec![sim("a"), sim("b"), sim("c"), sim("d")];
    let edges = vec![MapEdge::new("a", "b", 0.5), MapEdge::new("c", "d", 0.5)];

    let mut initial = nodes.clone();
    initialize_positions(&mut initial, WIDTH, HEIGHT);
    let initial_ab = initial[0].distance_to(&initial[1]);
    let initial_cd = initial[2].distance_to(&initial[3]);

    run_simulation(&mut nodes, &edges, WIDTH, HEIGHT, None, None);

    assert_in_canvas(&nodes, WIDTH, HEIGHT);
    for i in 0..nodes.len() {
        for j in (i + 1)..nodes.len() {
            assert!(nodes[i].distance_to(&nodes[j]) > 1.0, "{} and {} overlap", nodes[i].id, nodes[j].id);
        }
    }
    assert!(nodes[0].distance_to(&nodes[1]) < initial_ab);
    assert!(nodes[2].distance_to(&nodes[3]) < initial_cd);
}

#[test]
fn chain_stays_in_bounds() {
    let mut nodes = vec![sim("a"), sim("b"), sim("c"), sim("d")];
    let edges = vec![
        MapEdge::new("a", "b", 0.5),
        MapEdge::new("b", "c", 0.5),
        MapEdge::new("c", "d", 0.5),
    ];
    run_simulation(&mut nodes, &edges, WIDTH, HEIGHT, None, None);
    assert_in_canvas(&nodes, WIDTH, HEIGHT);
}

#[test]
fn pair_with_tight_threshold_terminates() {
    let mut nodes = vec![sim("a"), sim("b")];
    let edges = vec![MapEdge::new("a", "b", 0.5)];
    let summary = run_simulation(&mut nodes, &edges, WIDTH, HEIGHT, Some(100), Some(0.01));
    assert!(summary.iterations <= 100);
    assert_in_canvas(&nodes, WIDTH, HEIGHT);
}

#[test]
fn display_attributes_survive_layout() {
    let mut nodes = vec![sim("a"), sim("b")];
    nodes[1].banner_url = Some("https://cdn/banner.webp".into());
    let before = nodes.clone();

    run_simulation(&mut nodes, &[], WIDTH, HEIGHT, None, None);

    for (after, before) in nodes.iter().zip(&before) {
        assert_eq!(after.id, before.id);
        assert_eq!(after.name, before.name);
        assert_eq!(after.theme, before.theme);
        assert_eq!(after.agent_count, before.agent_count);
        assert_eq!(after.banner_url, before.banner_url);
    }
}

#[test]
fn converged_run_stays_put() {
    for count in 2..=6 {
        let mut nodes: Vec<MapNode> = (0..count).map(|i| sim(&format!("n{}", i))).collect();
        let summary = run_simulation(&mut nodes, &[], WIDTH, HEIGHT, None, None);
        assert!(summary.converged, "{} nodes did not converge", count);

        let settled = nodes.clone();
        for _ in 0..300 {
            simulate_tick(&mut nodes, &[], WIDTH, HEIGHT);
        }
        for (after, before) in nodes.iter().zip(&settled) {
            let moved = after.distance_to(before);
            assert!(moved < 2.0, "{} nodes: {} kept moving ({} px)", count, after.id, moved);
        }
    }
}

#[test]
fn uninitialized_nodes_are_separated_by_ticking() {
    // Everything stacked at the origin; ticks alone must untangle them
    let mut nodes = vec![sim("a"), sim("b"), sim("c")];
    let mut energy = 0.0;
    for _ in 0..100 {
        energy = simulate_tick(&mut nodes, &[], WIDTH, HEIGHT);
    }
    assert!(energy.is_finite());
    assert_in_canvas(&nodes, WIDTH, HEIGHT);
    assert!(nodes[0].distance_to(&nodes[1]) > 1.0);
    assert!(nodes[1].distance_to(&nodes[2]) > 1.0);
    assert!(nodes[0].distance_to(&nodes[2]) > 1.0);
}

#[test]
fn animation_and_runner_agree() {
    let mut rng = StdRng::seed_from_u64(42);
    let data = MapData::demo(&mut rng, 6);

    let mut synchronous = data.nodes.clone();
    let summary = ForceLayout::default().run(&mut synchronous, &data.edges, WIDTH, HEIGHT, RunLimits::default());

    let mut animated = data.nodes.clone();
    let mut anim = LayoutAnimation::default();
    anim.restart(&mut animated, WIDTH, HEIGHT);
    while anim.frame(&mut animated, &data.edges, WIDTH, HEIGHT) {}

    assert_eq!(anim.iterations(), summary.iterations);
    assert_eq!(animated, synchronous);
}

#[test]
fn map_file_round_trip_through_disk() {
    let mut rng = StdRng::seed_from_u64(3);
    let data = MapData::demo(&mut rng, 5);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("map.json");
    std::fs::write(&path, serde_json::to_string(&data).unwrap()).unwrap();

    let loaded = MapData::load(&path).unwrap();
    assert_eq!(loaded, data);
}

#[test]
fn missing_map_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = MapData::load(dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, multiverse_map::graph::MapFileError::Io(_)));
}

// ===================
// Properties
// ===================

fn canvas_strategy() -> impl Strategy<Value = (f32, f32)> {
    (200.0f32..2000.0, 200.0f32..2000.0)
}

fn graph_strategy() -> impl Strategy<Value = (Vec<(f32, f32, f32, f32)>, Vec<(usize, usize, f32)>)> {
    (1usize..12).prop_flat_map(|n| {
        (
            prop::collection::vec((0.0f32..1.0, 0.0f32..1.0, -200.0f32..200.0, -200.0f32..200.0), n),
            prop::collection::vec((0..n + 2, 0..n + 2, 0.0f32..2.0), 0..16),
        )
    })
}

/// Nodes positioned at fractions of the canvas; edge indices past the node
/// count become dangling references.
fn build_graph(
    width: f32,
    height: f32,
    raw_nodes: &[(f32, f32, f32, f32)],
    raw_edges: &[(usize, usize, f32)],
) -> (Vec<MapNode>, Vec<MapEdge>) {
    let nodes = raw_nodes
        .iter()
        .enumerate()
        .map(|(i, &(fx, fy, vx, vy))| sim(&format!("n{}", i)).at(fx * width, fy * height).moving(vx, vy))
        .collect();
    let edges = raw_edges
        .iter()
        .map(|&(s, t, strength)| MapEdge::new(format!("n{}", s), format!("n{}", t), strength))
        .collect();
    (nodes, edges)
}

fn check_tick_keeps_nodes_in_bounds(
    (width, height): (f32, f32),
    (raw_nodes, raw_edges): (Vec<(f32, f32, f32, f32)>, Vec<(usize, usize, f32)>),
) -> Result<(), TestCaseError> {
    let (mut nodes, edges) = build_graph(width, height, &raw_nodes, &raw_edges);
    let layout = ForceLayout::default();
    let margin = layout.margin();

    let energy = layout.tick(&mut nodes, &edges, width, height);

    prop_assert!(energy.is_finite() && energy >= 0.0, "bad energy {energy}");
    for n in &nodes {
        prop_assert!(n.x >= margin && n.x <= width - margin, "x {} escaped", n.x);
        prop_assert!(n.y >= margin && n.y <= height - margin, "y {} escaped", n.y);
        prop_assert!(n.vx.is_finite() && n.vy.is_finite());
    }
    Ok(())
}

fn check_initializer_is_distinct((width, height): (f32, f32), n: usize) -> Result<(), TestCaseError> {
    let mut nodes: Vec<MapNode> = (0..n).map(|i| sim(&format!("n{}", i)).moving(3.0, -4.0)).collect();
    initialize_positions(&mut nodes, width, height);

    for node in &nodes {
        prop_assert!(node.x >= 0.0 && node.x <= width);
        prop_assert!(node.y >= 0.0 && node.y <= height);
        prop_assert_eq!(node.vx, 0.0);
        prop_assert_eq!(node.vy, 0.0);
    }
    for i in 0..nodes.len() {
        for j in (i + 1)..nodes.len() {
            prop_assert!(nodes[i].distance_to(&nodes[j]) > 1e-3);
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn tick_keeps_nodes_in_bounds(canvas in canvas_strategy(), graph in graph_strategy()) {
        check_tick_keeps_nodes_in_bounds(canvas, graph)?;
    }

    #[test]
    fn initializer_places_distinct_nodes(canvas in canvas_strategy(), n in 1usize..40) {
        check_initializer_is_distinct(canvas, n)?;
    }
}
