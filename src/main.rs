use anyhow::Context;
use meshlite::{
    AppConfig, CameraConfig, GeometryDescriptor, Light, LoggingConfig, Vec3, run_with_config,
};

fn main() -> anyhow::Result<()> {
    let config = AppConfig::new()
        .title("meshlite demo")
        .size(1280, 720)
        .camera(CameraConfig::new().position(Vec3::new(0.0, 0.0, 6.0)))
        .logging(Some(LoggingConfig::new()));

    run_with_config(config, |ctx| {
        let mut cube = ctx.mesh(&GeometryDescriptor::Cube {
            size: 1.5,
            subdivisions: 2,
        });
        cube.set_position(Vec3::new(-1.25, 0.0, 0.0));

        let mut sphere = ctx.mesh(&GeometryDescriptor::sphere());
        sphere.set_position(Vec3::new(1.25, 0.0, 0.0));
        sphere.set_scale(Vec3::splat(0.8));

        ctx.scene.add(cube);
        ctx.scene.add(sphere);
        ctx.scene.add(Light::point(Vec3::new(3.0, 4.0, 5.0)).intensity(1.2));

        log::info!("scene ready: {} nodes", ctx.scene.nodes().len());

        move |frame| {
            let t = frame.time;
            if let Some(cube) = frame.scene.mesh_mut(0) {
                cube.set_rotation(Vec3::new(t * 0.4, t * 0.7, 0.0));
            }
        }
    })
    .context("renderer exited with an error")
}
