use anyhow::{Context, Result};
use blobs_graph::engine::{
    AggregatedInput, BlobInput, EdgeInput, IndividualInput, ProjectInput, SectorInput, SkillInput,
};
use blobs_graph::{
    BlobKind, DiscoveryRequest, EdgeType, EngineConfig, GraphEngine, NodeId, ProjectKind, SearchQuery,
    ViewportRequest,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    println!("Blobs Graph Engine v{}", blobs_graph::version());
    println!("==========================================");
    println!();

    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::from_file(&path).with_context(|| format!("loading config from {path}"))?,
        None => {
            let mut config = EngineConfig::default();
            config.apply_env().context("applying BLOBS_* overrides")?;
            config
        }
    };
    let engine = GraphEngine::new(config);

    // Demo 1: Populate
    let ada = populate(&engine)?;

    // Demo 2: Layout
    println!("\n=== Demo 2: Layout ===");
    let scale = engine.config().layout.scale;
    let positions = engine
        .compute_layout_in_background(scale)
        .await
        .context("layout task failed")?;
    let bounds = engine.bounds();
    println!("✓ Laid out {} nodes", positions.len());
    println!(
        "  bounds: ({:.1}, {:.1}) .. ({:.1}, {:.1})",
        bounds.min_x, bounds.min_y, bounds.max_x, bounds.max_y
    );
    let coarse = engine.compute_hierarchical_layouts();
    println!("✓ Coarse layout for {} organisation-level nodes", coarse.len());

    // Demo 3: Queries
    demo_queries(&engine, &ada)?;

    let stats = engine.stats();
    println!("\n=== Stats ===");
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

fn populate(engine: &GraphEngine) -> Result<NodeId> {
    println!("=== Demo 1: Populate ===");

    let fintech = engine.create_sector(SectorInput::new("Fintech"))?;
    let rust = engine.create_skill(SkillInput::new("Rust"))?;
    let acme = engine.create_aggregated(AggregatedInput::new("Acme Group"))?;

    let mut infra = BlobInput::new("Core Infra", BlobKind::Internal);
    infra.sector = Some("Fintech".to_string());
    infra.parent_aggregated_id = Some(acme.id.clone());
    let infra = engine.create_blob(infra)?;

    let mut payments = BlobInput::new("Payments", BlobKind::Internal);
    payments.sector = Some("Fintech".to_string());
    payments.parent_aggregated_id = Some(acme.id.clone());
    let payments = engine.create_blob(payments)?;

    let mut people = Vec::new();
    for (name, skills, location) in [
        ("Ada", vec!["Rust", "Python"], "London"),
        ("Lin", vec!["Rust", "Go"], "Singapore"),
        ("Kim", vec!["Python", "SQL"], "Seoul"),
        ("Ravi", vec!["Go", "Kubernetes"], "Bangalore"),
    ] {
        let mut input = IndividualInput::new(name, skills);
        input.location = Some(location.to_string());
        input.sector = Some("Fintech".to_string());
        people.push(engine.create_individual(input)?);
    }

    for (person, team) in people.iter().zip([&infra, &infra, &payments, &infra]) {
        engine.create_edge(EdgeInput::new(person.id.clone(), team.id.clone(), EdgeType::MemberOf))?;
    }
    engine.create_edge(EdgeInput::new(people[0].id.clone(), rust.id.clone(), EdgeType::HasSkill))?;
    engine.create_edge(EdgeInput::new(people[1].id.clone(), rust.id.clone(), EdgeType::HasSkill))?;
    engine.create_edge(EdgeInput::new(infra.id.clone(), fintech.id.clone(), EdgeType::InSector))?;

    let mut ledger = ProjectInput::new("Ledger Rewrite", ProjectKind::Mission);
    ledger.required_skills = vec!["Rust".to_string()];
    let ledger = engine.create_project(ledger)?;
    engine.create_edge(EdgeInput::new(infra.id.clone(), ledger.id.clone(), EdgeType::Executes))?;
    engine.create_edge(EdgeInput::new(people[0].id.clone(), ledger.id.clone(), EdgeType::WorksOn))?;

    println!(
        "✓ Created {} nodes and {} edges",
        engine.node_count(),
        engine.edge_count()
    );
    if let Some(group) = engine.get_node(&acme.id) {
        println!("  {} has {} members across its teams", group.name, group.size().unwrap_or(0));
    }
    Ok(people[0].id.clone())
}

fn demo_queries(engine: &GraphEngine, ada: &NodeId) -> Result<()> {
    println!("\n=== Demo 3: Queries ===");

    let center = engine.bounds().center();
    for zoom in 0..=2 {
        let view = engine.viewport(&ViewportRequest::new(center.x, center.y, 2000.0, 2000.0, zoom));
        println!(
            "✓ Viewport at zoom {}: {} nodes, {} edges ({:.2} ms)",
            zoom,
            view.data.nodes.len(),
            view.data.edges.len(),
            view.query_time_ms
        );
    }

    let limits = &engine.config().query;
    let full = engine.full_graph(0, limits.full_graph_limit);
    println!(
        "✓ Full graph at zoom 0: {} of {} nodes",
        full.data.nodes.len(),
        full.data.total_nodes
    );

    let hits = engine.search(&SearchQuery::new().skills(["python"]).limit(limits.search_limit));
    println!("✓ Search skills=python: {} hits", hits.total_count);
    for node in &hits.nodes {
        println!("  - {}", node.name);
    }

    let quick = engine.quick_search("infra", limits.quick_search_limit);
    println!("✓ Quick search \"infra\": {} hits", quick.total_count);

    let discovery = engine.discover(&DiscoveryRequest::new(ada.clone()).max_depth(2))?;
    println!(
        "✓ Discovered {} nodes within 2 hops of {}",
        discovery.related_nodes.len(),
        discovery.source_node.name
    );

    for scored in engine.similar(ada, limits.similar_limit)? {
        println!("  similar: {} (score {:.1})", scored.node.name, scored.score);
    }
    Ok(())
}
