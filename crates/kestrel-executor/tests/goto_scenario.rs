use approx::assert_abs_diff_eq;
use kestrel_core::{
    Angle, ControllerSettings, FieldGeometry, RobotId, Segment, TeamColor, Uid, Vector2, World,
};
use kestrel_executor::{
    behavior::{run_skill, Heading, Skill},
    skills::{plan_path, Goto},
};

fn place(world: &World, id: RobotId, position: Vector2, heading: Angle) {
    world.with_robot(id, |robot| {
        robot.update(position, Some(heading));
        robot.mark_seen(0.0);
    });
}

#[test]
fn drives_to_target_and_arrives() {
    let world = World::new(FieldGeometry::default());
    let id = RobotId::new(TeamColor::Blue, Uid::new(0));
    place(&world, id, Vector2::zeros(), Angle::ZERO);

    let mut goto = Goto::new(
        id,
        Vector2::new(1.0, 0.0),
        Some(Heading::Fixed(Angle::ZERO)),
        &ControllerSettings::default(),
    );
    run_skill(&mut goto, &world);

    let robot = world.robot(id);
    let speeds = robot.action.speeds().copied().unwrap_or_default();
    assert!(speeds.tangent > 0.0);
    assert_abs_diff_eq!(speeds.normal, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(speeds.angular, 0.0, epsilon = 1e-9);
    assert_eq!(robot.last_skill(), Some("goto"));
    assert!(goto.busy(&world));

    place(&world, id, Vector2::new(1.0, 0.0), Angle::ZERO);
    run_skill(&mut goto, &world);

    let robot = world.robot(id);
    assert!(goto.arrived(&robot));
    assert!(goto.oriented(&robot, &world));
    assert!(!goto.busy(&world));
}

#[test]
fn steers_around_robot_in_the_way() {
    let world = World::new(FieldGeometry::default());
    let me = RobotId::new(TeamColor::Blue, Uid::new(0));
    let blocker = RobotId::new(TeamColor::Yellow, Uid::new(4));
    place(&world, me, Vector2::zeros(), Angle::ZERO);
    place(&world, blocker, Vector2::new(1.0, 0.0), Angle::PI);

    let mut goto = Goto::new(me, Vector2::new(2.0, 0.0), None, &ControllerSettings::default());
    run_skill(&mut goto, &world);

    let radius = world.geometry().robot_radius;
    let waypoint = goto.planned_target();
    assert_ne!(waypoint, goto.final_target());
    let clearance = Segment::new(Vector2::zeros(), waypoint).distance_to_point(Vector2::new(1.0, 0.0));
    assert!(clearance > 2.0 * radius);

    // The command points at the waypoint, not straight at the final target
    let speeds = world.robot(me).action.speeds().copied().unwrap_or_default();
    assert!(speeds.tangent > 0.0);
    assert!(speeds.normal.abs() > 0.0);
}

#[test]
fn inactive_robots_are_not_obstacles() {
    let world = World::new(FieldGeometry::default());
    let me = RobotId::new(TeamColor::Blue, Uid::new(0));
    place(&world, me, Vector2::zeros(), Angle::ZERO);
    world.with_robot(RobotId::new(TeamColor::Yellow, Uid::new(1)), |r| {
        r.update(Vector2::new(1.0, 0.0), None)
    });

    let mut goto = Goto::new(me, Vector2::new(2.0, 0.0), None, &ControllerSettings::default());
    run_skill(&mut goto, &world);
    assert_eq!(goto.planned_target(), Vector2::new(2.0, 0.0));
}

#[test]
fn planner_without_obstacles_is_identity() {
    for target in [
        Vector2::new(3.0, -1.0),
        Vector2::new(-0.5, 0.5),
        Vector2::zeros(),
    ] {
        assert_eq!(plan_path(Vector2::new(0.1, 0.2), target, &[], 0.09, 0), target);
    }
}

#[test]
fn retarget_existing_goto() {
    let world = World::new(FieldGeometry::default());
    let id = RobotId::new(TeamColor::Blue, Uid::new(2));
    place(&world, id, Vector2::new(1.0, 1.0), Angle::ZERO);

    let mut goto = Goto::new(id, Vector2::zeros(), None, &ControllerSettings::default());
    assert!(goto.busy(&world));
    goto.set_target(Vector2::new(1.0, 1.0), None);
    assert!(!goto.busy(&world));
}
