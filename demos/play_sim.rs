//! Play simulation — lifecycle walk-through with a falling body.
//!
//! Initializes a scene, enters play mode (bulk physics registration), steps
//! the frame loop, and renders picking + main passes each frame.
//!
//! Run with: `cargo run --example play_sim`

use ormr::prelude::*;

fn main() {
    env_logger::init();

    let initializer = EmptySceneInitializer;
    let mut scene = Scene::new(&initializer, ProjectSettings::for_project("demo.orproj"));
    scene.init();
    scene.start();

    // Ground slab and a falling crate.
    let ground = scene.create_entity();
    scene
        .registry_mut()
        .get_mut::<Transform>(ground)
        .unwrap()
        .position
        .y = -50.0;
    scene.registry_mut().insert(
        ground,
        Box2D {
            half_size: Vec2::new(200.0, 5.0),
            ..Box2D::default()
        },
    );

    let falling = scene.create_entity();
    scene
        .registry_mut()
        .get_mut::<Transform>(falling)
        .unwrap()
        .position
        .y = 80.0;
    scene
        .registry_mut()
        .insert(falling, Rigidbody2D::dynamic());
    scene.registry_mut().insert(falling, Box2D::default());
    scene
        .registry_mut()
        .insert(falling, SpriteRenderer::new().with_color(Color::GREEN));

    scene.play();
    log::info!("play: {} bodies registered", scene.physics.body_count());

    for frame in 0..120 {
        scene.update(1.0 / 60.0);
        scene.render();
        if frame % 30 == 0 {
            let y = scene
                .registry()
                .get::<Transform>(falling)
                .unwrap()
                .position
                .y;
            log::info!(
                "frame {frame}: crate y = {y:.2}, passes recorded = {}",
                scene.render.frame().len()
            );
        }
    }

    scene.stop();
    scene.destroy();
    log::info!("scene destroyed");
}
