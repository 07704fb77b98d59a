//! Scene Save/Load — whole-scene round-trip with file I/O.
//!
//! Builds a scene covering every built-in component kind plus a script
//! component, saves it to a temp file, reloads it, and prints what survived.
//!
//! Run with: `cargo run --example scene_save_load`

use ormr::prelude::*;

fn main() {
    env_logger::init();

    let initializer = EmptySceneInitializer;
    let mut scene = Scene::new(&initializer, ProjectSettings::for_project("demo.orproj"));
    scene.init();

    // A crate with physics and a sprite.
    let crate_entity = scene.create_entity();
    scene.registry_mut().insert(
        crate_entity,
        SpriteRenderer::new()
            .with_color(Color::rgb(0.8, 0.6, 0.2))
            .with_z_index(1),
    );
    scene
        .registry_mut()
        .insert(crate_entity, Rigidbody2D::dynamic());
    scene.registry_mut().insert(crate_entity, Box2D::default());
    scene
        .registry_mut()
        .insert(crate_entity, Tag::named("crate"));

    // A HUD label with a bounding box for picking.
    let hud = scene.create_entity();
    scene
        .registry_mut()
        .insert(hud, FontRenderer::new("score: 0"));
    scene.registry_mut().insert(
        hud,
        Aabb {
            size: Vec2::new(120.0, 24.0),
            offset: Vec2::ZERO,
        },
    );

    // A user-defined script component the engine core cannot interpret.
    scene.attach_script(
        crate_entity,
        "PlayerController",
        serde_json::json!({ "speed": 4.5, "jump": 12.0 }),
    );

    let dir = std::env::temp_dir();
    let path = dir.join("ormr_scene.json");
    scene.save(&path).expect("failed to write scene file");
    log::info!("saved {} entities to {}", scene.registry().entity_count(), path.display());

    scene.load(&path).expect("failed to read scene file");
    log::info!(
        "reloaded: {} entities, {} texture(s), script kinds: {:?}",
        scene.registry().entity_count(),
        scene.assets.texture_count(),
        scene.scripts.known_kinds(),
    );

    // Entity identity survives the round-trip.
    let crate_again = scene.entity(crate_entity.index());
    let sprite = scene
        .registry()
        .get::<SpriteRenderer>(crate_again)
        .expect("sprite survived");
    log::info!("crate sprite z-index after reload: {}", sprite.z_index);
}
