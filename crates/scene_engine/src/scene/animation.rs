//! Ready-made transform callbacks
//!
//! Each function returns a closure suitable for [`TransformNode::with_update`]
//! or the graph builder. Callbacks report [`TransformUpdate::Changed`] only
//! when their output actually moved, so a paused clock or idle input leaves
//! the subtree clean.
//!
//! [`TransformNode::with_update`]: super::transform::TransformNode::with_update

use std::cell::Cell;
use std::rc::Rc;

use crate::foundation::math::{Mat4, Quat, Vec3};
use crate::foundation::math::utils::lerp;

use super::transform::TransformUpdate;

/// Continuous rotation about `axis`
///
/// Post-multiplies the node's matrix state each frame, so the rotation
/// composes with whatever the state was seeded with.
pub fn spin(axis: Vec3, radians_per_second: f32) -> impl FnMut(&mut Mat4, &mut Quat, f32) -> TransformUpdate {
    let axis = nalgebra::Unit::new_normalize(axis);
    move |matrix, _rotation, delta_time| {
        let angle = radians_per_second * delta_time;
        if angle == 0.0 {
            return TransformUpdate::Unchanged;
        }
        *matrix *= Mat4::from_axis_angle(&axis, angle);
        TransformUpdate::Changed(*matrix)
    }
}

/// Orbit controls fed from outside the graph
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitInput {
    /// Rotation about the world Y axis in radians
    pub yaw: f32,
    /// Rotation about the camera X axis in radians
    pub pitch: f32,
    /// Uniform scale applied to the orbited subtree
    pub zoom: f32,
}

impl Default for OrbitInput {
    fn default() -> Self {
        Self { yaw: 0.0, pitch: 0.0, zoom: 1.0 }
    }
}

/// Input cell shared between an input handler and an [`orbit`] callback
pub type SharedOrbitInput = Rc<Cell<OrbitInput>>;

/// Rotation driven by externally updated yaw, pitch and zoom
///
/// Reports a change only on frames where the input differs from what the
/// callback last applied.
pub fn orbit(input: SharedOrbitInput) -> impl FnMut(&mut Mat4, &mut Quat, f32) -> TransformUpdate {
    let mut applied: Option<OrbitInput> = None;
    move |matrix, rotation, _delta_time| {
        let current = input.get();
        if applied == Some(current) {
            return TransformUpdate::Unchanged;
        }
        applied = Some(current);

        *rotation = Quat::from_axis_angle(&Vec3::y_axis(), current.yaw)
            * Quat::from_axis_angle(&Vec3::x_axis(), -current.pitch);
        *matrix = rotation.to_homogeneous() * Mat4::new_scaling(current.zoom);
        TransformUpdate::Changed(*matrix)
    }
}

/// Pose at a point in time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    /// Seconds since the path started
    pub time: f32,
    /// Translation
    pub position: Vec3,
    /// Orientation
    pub rotation: Quat,
}

impl Keyframe {
    /// Create a keyframe
    pub fn new(time: f32, position: Vec3, rotation: Quat) -> Self {
        Self { time, position, rotation }
    }
}

/// Play a keyframed path once and hold the last pose
///
/// Positions are interpolated linearly and rotations spherically. Once the
/// final keyframe is reached the callback reports `Unchanged` forever.
pub fn keyframe_path(mut keyframes: Vec<Keyframe>) -> impl FnMut(&mut Mat4, &mut Quat, f32) -> TransformUpdate {
    keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));

    let mut elapsed = 0.0_f32;
    let mut evaluated = false;
    let mut finished = keyframes.is_empty();

    move |matrix, rotation, delta_time| {
        if finished || (evaluated && delta_time == 0.0) {
            return TransformUpdate::Unchanged;
        }
        evaluated = true;
        elapsed += delta_time;

        let (position, orientation) = sample(&keyframes, elapsed);
        if keyframes.last().map_or(true, |last| elapsed >= last.time) {
            finished = true;
        }

        *rotation = orientation;
        *matrix = Mat4::new_translation(&position) * orientation.to_homogeneous();
        TransformUpdate::Changed(*matrix)
    }
}

fn sample(keyframes: &[Keyframe], time: f32) -> (Vec3, Quat) {
    let segment = keyframes.windows(2).find(|pair| time < pair[1].time);
    match segment {
        Some([from, to]) if time > from.time => {
            let t = (time - from.time) / (to.time - from.time);
            let position = from.position.lerp(&to.position, t);
            let rotation = from
                .rotation
                .try_slerp(&to.rotation, t, 1.0e-6)
                .unwrap_or_else(|| from.rotation.nlerp(&to.rotation, t));
            (position, rotation)
        }
        Some([from, _]) => (from.position, from.rotation),
        _ => keyframes
            .last()
            .map_or((Vec3::zeros(), Quat::identity()), |last| (last.position, last.rotation)),
    }
}

/// Scalar ease between `from` and `to` over `duration` seconds, then hold
pub fn ease_scale(from: f32, to: f32, duration: f32) -> impl FnMut(&mut Mat4, &mut Quat, f32) -> TransformUpdate {
    let mut elapsed = 0.0_f32;
    let mut settled = false;
    move |matrix, _rotation, delta_time| {
        if settled {
            return TransformUpdate::Unchanged;
        }
        elapsed += delta_time;
        let t = if duration > 0.0 { (elapsed / duration).min(1.0) } else { 1.0 };
        settled = t >= 1.0;
        *matrix = Mat4::new_scaling(lerp(from, to, t));
        TransformUpdate::Changed(*matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Mat4Ext;
    use approx::assert_relative_eq;

    fn run<F>(callback: &mut F, delta_time: f32) -> TransformUpdate
    where
        F: FnMut(&mut Mat4, &mut Quat, f32) -> TransformUpdate,
    {
        let mut matrix = Mat4::identity();
        let mut rotation = Quat::identity();
        callback(&mut matrix, &mut rotation, delta_time)
    }

    #[test]
    fn test_spin_accumulates_in_state() {
        let mut callback = spin(Vec3::y(), 0.5);
        let mut matrix = Mat4::identity();
        let mut rotation = Quat::identity();

        callback(&mut matrix, &mut rotation, 1.0);
        let update = callback(&mut matrix, &mut rotation, 1.0);

        match update {
            TransformUpdate::Changed(local) => assert_relative_eq!(local, Mat4::rotation_y(1.0), epsilon = 1e-6),
            TransformUpdate::Unchanged => panic!("spin with non-zero delta must report a change"),
        }
    }

    #[test]
    fn test_spin_is_unchanged_while_paused() {
        let mut callback = spin(Vec3::y(), 0.5);
        assert_eq!(run(&mut callback, 0.0), TransformUpdate::Unchanged);
    }

    #[test]
    fn test_orbit_reports_only_input_changes() {
        let input: SharedOrbitInput = Rc::new(Cell::new(OrbitInput::default()));
        let mut callback = orbit(Rc::clone(&input));

        assert!(matches!(run(&mut callback, 0.016), TransformUpdate::Changed(_)));
        assert_eq!(run(&mut callback, 0.016), TransformUpdate::Unchanged);

        input.set(OrbitInput { yaw: 0.3, ..OrbitInput::default() });
        match run(&mut callback, 0.016) {
            TransformUpdate::Changed(local) => assert_relative_eq!(local, Mat4::rotation_y(0.3), epsilon = 1e-6),
            TransformUpdate::Unchanged => panic!("new yaw must report a change"),
        }
        assert_eq!(run(&mut callback, 0.016), TransformUpdate::Unchanged);
    }

    #[test]
    fn test_keyframe_path_interpolates_and_holds() {
        let mut callback = keyframe_path(vec![
            Keyframe::new(2.0, Vec3::new(2.0, 0.0, 0.0), Quat::identity()),
            Keyframe::new(0.0, Vec3::zeros(), Quat::identity()),
        ]);
        let mut matrix = Mat4::identity();
        let mut rotation = Quat::identity();

        assert!(matches!(callback(&mut matrix, &mut rotation, 0.0), TransformUpdate::Changed(_)));
        assert_eq!(callback(&mut matrix, &mut rotation, 0.0), TransformUpdate::Unchanged);

        callback(&mut matrix, &mut rotation, 1.0);
        assert_relative_eq!(matrix.translation_part(), Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-6);

        callback(&mut matrix, &mut rotation, 5.0);
        assert_relative_eq!(matrix.translation_part(), Vec3::new(2.0, 0.0, 0.0), epsilon = 1e-6);
        assert_eq!(callback(&mut matrix, &mut rotation, 1.0), TransformUpdate::Unchanged);
    }

    #[test]
    fn test_empty_path_never_changes() {
        let mut callback = keyframe_path(Vec::new());
        assert_eq!(run(&mut callback, 1.0), TransformUpdate::Unchanged);
    }

    #[test]
    fn test_ease_scale_settles() {
        let mut callback = ease_scale(1.0, 3.0, 2.0);
        let mut matrix = Mat4::identity();
        let mut rotation = Quat::identity();

        callback(&mut matrix, &mut rotation, 1.0);
        assert_relative_eq!(matrix[(0, 0)], 2.0, epsilon = 1e-6);
        callback(&mut matrix, &mut rotation, 1.0);
        assert_relative_eq!(matrix[(0, 0)], 3.0, epsilon = 1e-6);
        assert_eq!(callback(&mut matrix, &mut rotation, 1.0), TransformUpdate::Unchanged);
    }
}
