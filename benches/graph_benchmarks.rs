use blobs_graph::graph::{BlobAttrs, IndividualAttrs};
use blobs_graph::query::{self, SearchQuery, ViewportRequest};
use blobs_graph::{algo, BlobKind, Edge, EdgeType, GraphStore, Node, NodeId, NodePayload, Position};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

const SKILLS: [&str; 6] = ["Rust", "Python", "Go", "SQL", "Kubernetes", "ML"];
const CITIES: [&str; 4] = ["London", "San Francisco", "Seoul", "Berlin"];

/// Teams of 20 people, spread over a 1000×1000 plane
fn populate(people: usize) -> GraphStore {
    let mut store = GraphStore::new();
    let teams = (people / 20).max(1);
    for t in 0..teams {
        let team = Node::new(format!("t{t:05}"), format!("Team {t}"), NodePayload::Blob(BlobAttrs::new(BlobKind::Internal)))
            .with_position(Position::new((t * 37 % 1000) as f64, (t * 53 % 1000) as f64));
        store.add_node(team).unwrap();
    }
    for i in 0..people {
        let mut attrs = IndividualAttrs::with_skills([SKILLS[i % SKILLS.len()], SKILLS[(i / 3) % SKILLS.len()]]);
        attrs.location = Some(CITIES[i % CITIES.len()].to_string());
        let node = Node::new(format!("p{i:06}"), format!("Person {i}"), NodePayload::Individual(attrs))
            .with_position(Position::new((i * 7 % 1000) as f64, (i * 13 % 1000) as f64));
        store.add_node(node).unwrap();
        store
            .add_edge(Edge::new(format!("m{i:06}"), format!("p{i:06}"), format!("t{:05}", i % teams), EdgeType::MemberOf))
            .unwrap();
    }
    store
}

/// Benchmark viewport queries at each zoom tier
fn bench_viewport(c: &mut Criterion) {
    let mut group = c.benchmark_group("viewport");

    for size in [1_000, 10_000].iter() {
        let store = populate(*size);
        for zoom in 0..=2u8 {
            let mut request = ViewportRequest::new(500.0, 500.0, 400.0, 400.0, zoom);
            if zoom == 1 {
                request = request.centered_on("t00000");
            }
            group.bench_with_input(BenchmarkId::new(format!("zoom_{zoom}"), size), size, |b, _| {
                b.iter(|| {
                    let data = query::viewport_graph(&store, &request);
                    criterion::black_box(data.viewport_nodes);
                });
            });
        }
    }
    group.finish();
}

/// Benchmark indexed search and free-text scans
fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    let store = populate(10_000);

    let by_skill = SearchQuery::new().skills(["rust", "go"]).location("san");
    group.bench_function("skills_and_location", |b| {
        b.iter(|| criterion::black_box(query::search(&store, &by_skill).len()));
    });

    let by_text = SearchQuery::text("person 99");
    group.bench_function("free_text", |b| {
        b.iter(|| criterion::black_box(query::search(&store, &by_text).len()));
    });

    let source = NodeId::new("p000042");
    group.bench_function("similar", |b| {
        b.iter(|| criterion::black_box(query::similar_nodes(&store, &source, 10).len()));
    });
    group.finish();
}

/// Benchmark the spring layout
fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    group.sample_size(10);

    for size in [200, 1_000].iter() {
        let store = populate(*size);
        let view = algo::build_view(&store);
        let config = algo::LayoutConfig::for_node_count(view.node_count, 1000.0, 42);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| criterion::black_box(algo::layout_positions(&view, &config).len()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_viewport, bench_search, bench_layout);
criterion_main!(benches);
