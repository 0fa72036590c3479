use glam::Quat;
use scenegraph_ecs::{Component, Context, EntityId, EntityManager, Pass, Result};
use std::time::Instant;

#[cfg(feature = "profiling")]
use std::fs::File;

struct Spin {
    angle: f32,
}

impl Component for Spin {
    const NAME: &'static str = "Spin";

    fn update(&mut self, ctx: &mut Context<'_>, elapsed: f32) -> Result<()> {
        self.angle += elapsed;
        ctx.set_rotation(Quat::from_rotation_y(self.angle))
    }
}

struct Follow;

impl Component for Follow {
    const NAME: &'static str = "Follow";
    const PASS: Pass = Pass::LATE;

    fn update(&mut self, ctx: &mut Context<'_>, _elapsed: f32) -> Result<()> {
        let world = ctx.manager().world_position(ctx.entity());
        if let Some(position) = world {
            tracing::trace!(?position, "follow");
        }
        Ok(())
    }
}

/// Wide-and-deep scene: `branches` chains of `depth` entities under the root
fn build_scene(manager: &mut EntityManager, branches: usize, depth: usize) -> Result<()> {
    for b in 0..branches {
        let mut parent: Option<EntityId> = None;
        for d in 0..depth {
            let id = manager.create_entity(Some(&format!("node_{b}_{d}")));
            manager.add_component(id, Spin { angle: 0.0 })?;
            manager.add_component(id, Follow)?;
            manager.init_entity(id, parent)?;
            parent = Some(id);
        }
    }
    Ok(())
}

#[cfg(feature = "profiling")]
fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Write spans to a file
    let file = File::create("trace.json")?;
    let (non_blocking, _guard) = tracing_appender::non_blocking(file);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut manager = EntityManager::new();
    {
        let _span = tracing::info_span!("build_scene").entered();
        build_scene(&mut manager, 100, 10)?;
    }
    println!("Scene built: {} entities", manager.entity_count());

    println!("Profiling 600 frames...");
    let start = Instant::now();
    for frame in 0..600 {
        if frame % 100 == 0 {
            tracing::info!("Frame {}/600", frame);
        }
        manager.update(1.0 / 60.0)?;
    }
    println!("600 frames complete in: {:?}", start.elapsed());
    Ok(())
}

#[cfg(not(feature = "profiling"))]
fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let mut manager = EntityManager::new();
    build_scene(&mut manager, 100, 10)?;

    let start = Instant::now();
    for _ in 0..600 {
        manager.update(1.0 / 60.0)?;
    }
    println!(
        "600 frames over {} entities in {:?} (build with --features profiling for traces)",
        manager.entity_count(),
        start.elapsed()
    );
    Ok(())
}
