use vantage_geometry::{Aabb, InnerSpace, Quaternion, Rad, Rotation3, Vector2, Vector3};
use vantage_scene::{Camera, Node, Result, Scene};

fn close(a: Vector3, b: Vector3) -> bool {
    (a - b).magnitude() < 1.0e-9
}

#[test]
fn world_transform_accumulates_parents() -> Result<()> {
    let mut scene = Scene::new();
    let parent = scene.add(
        Node::new("parent")
            .with_position(Vector3::new(10.0, 0.0, 0.0))
            .with_quaternion(Quaternion::from_angle_z(Rad(std::f64::consts::FRAC_PI_2)))
            .with_scale(Vector3::new(2.0, 2.0, 2.0)),
    );
    let child = scene.add_child(parent, Node::new("child").with_position(Vector3::new(1.0, 0.0, 0.0)))?;

    let world = scene.world_trs(child)?;
    assert!(close(world.position, Vector3::new(10.0, 2.0, 0.0)));
    assert!(close(world.scale, Vector3::new(2.0, 2.0, 2.0)));
    assert!(scene.is_ancestor(parent, child));
    assert!(!scene.is_ancestor(child, parent));

    let parent_world = scene.parent_world_trs(child)?;
    assert!(close(parent_world.position, Vector3::new(10.0, 0.0, 0.0)));
    Ok(())
}

#[test]
fn world_bounds_follow_transform() {
    let mut scene = Scene::new();
    let id = scene.add(
        Node::new("box")
            .with_position(Vector3::new(0.0, 5.0, 0.0))
            .with_bounds(Aabb::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0))),
    );
    let bounds = scene.world_bounds(id);
    assert!(bounds.is_some_and(|b| close(b.center(), Vector3::new(0.0, 5.0, 0.0))));
}

#[test]
fn centre_ray_follows_view_direction() {
    let mut camera = Camera::perspective(50.0, 1.5, 0.1, 1000.0);
    camera.position = Vector3::new(0.0, 0.0, 10.0);
    camera.look_at(Vector3::new(0.0, 0.0, 0.0));

    let ray = camera.ray_from_view(Vector2::new(0.0, 0.0));
    assert!(close(ray.origin, camera.position));
    assert!(close(ray.direction, -Vector3::unit_z()));

    let projected = camera.project(Vector3::new(0.0, 0.0, 0.0));
    assert!(projected.x.abs() < 1.0e-9 && projected.y.abs() < 1.0e-9);
}

#[test]
fn orthographic_rays_are_parallel() {
    let mut camera = Camera::orthographic(-5.0, 5.0, 5.0, -5.0, 0.1, 100.0);
    camera.position = Vector3::new(0.0, 0.0, 10.0);
    camera.look_at(Vector3::new(0.0, 0.0, 0.0));

    let a = camera.ray_from_view(Vector2::new(-1.0, 0.0));
    let b = camera.ray_from_view(Vector2::new(1.0, 0.0));
    assert!(close(a.direction, b.direction));
    assert!((a.origin.x + 5.0).abs() < 1.0e-9);
    assert!((b.origin.x - 5.0).abs() < 1.0e-9);

    camera.zoom = 2.0;
    camera.update_projection_matrix();
    let zoomed = camera.ray_from_view(Vector2::new(1.0, 0.0));
    assert!((zoomed.origin.x - 2.5).abs() < 1.0e-9);
    assert!((camera.view_height_at(1.0) - 5.0).abs() < 1.0e-9);
}
