//! Viewpoint, pointer teleport and input bindings
//!
//! Raw input (keys, pointer clicks, buttons, the quality select) is turned
//! into [`Command`]s here. The session applies them.

use glam::{Mat4, Quat, Vec2, Vec3, Vec4Swizzles};

use crate::consts::{
    CAMERA_FAR, CAMERA_FOV_DEG, CAMERA_NEAR, EYE_HEIGHT, TELEPORT_STEP_BACK,
};
use crate::floor_point;
use crate::progress::MissionId;
use crate::scene::{Scene, StationId, TeleportMarker};
use crate::settings::QualityTier;

/// Where the player starts (and returns to on reset)
pub const START_POSITION: Vec3 = Vec3::new(0.0, EYE_HEIGHT, 3.0);

/// Everything the player can ask the lab to do
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Teleport(StationId),
    /// Pointer click in element pixels, with the element size
    TeleportAt {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    Fire,
    SpawnBody,
    Mix,
    BuildCircuit,
    ToggleSafetyGate,
    AcceptMission(MissionId),
    SetQuality(QualityTier),
    ResetSession,
    RunClassification,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length
    pub dir: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }

    /// Distance along the ray to a horizontal disc, if it is hit from either side
    pub fn hit_disc(&self, center: Vec3, radius: f32) -> Option<f32> {
        if self.dir.y.abs() < 1e-6 {
            return None;
        }
        let t = (center.y - self.origin.y) / self.dir.y;
        if t < 0.0 {
            return None;
        }
        let offset = floor_point(self.at(t) - center);
        (offset.length_squared() <= radius * radius).then_some(t)
    }
}

/// Headset pose, relative to the floor point under the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadPose {
    pub position: Vec3,
    /// Unit rotation from the resting (-Z forward, +Y up) orientation
    pub orientation: Quat,
}

impl HeadPose {
    /// Non-finite input gives a resting head at eye height
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        let position = if position.is_finite() {
            position
        } else {
            Vec3::new(0.0, EYE_HEIGHT, 0.0)
        };
        let orientation = if orientation.is_finite() && orientation.length_squared() > 1e-6 {
            orientation.normalize()
        } else {
            Quat::IDENTITY
        };
        Self {
            position,
            orientation,
        }
    }

    /// From `[px, py, pz, qx, qy, qz, qw]` as reported by the headset
    pub fn from_components(c: &[f32]) -> Option<Self> {
        let [px, py, pz, qx, qy, qz, qw] = c else {
            return None;
        };
        Some(Self::new(
            Vec3::new(*px, *py, *pz),
            Quat::from_xyzw(*qx, *qy, *qz, *qw),
        ))
    }
}

/// The player's head: a perspective camera looking down -Z, or along the
/// headset's orientation while a head pose is set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewpoint {
    /// Standing eye position
    pub position: Vec3,
    pub fov_y_deg: f32,
    pub aspect: f32,
    pub head: Option<HeadPose>,
}

impl Default for Viewpoint {
    fn default() -> Self {
        Self::new(16.0 / 9.0)
    }
}

impl Viewpoint {
    pub fn new(aspect: f32) -> Self {
        Self {
            position: START_POSITION,
            fov_y_deg: CAMERA_FOV_DEG,
            aspect,
            head: None,
        }
    }

    /// Update the aspect ratio from the canvas size
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Where the camera actually is
    pub fn eye(&self) -> Vec3 {
        match self.head {
            Some(head) => floor_point(self.position) + head.position,
            None => self.position,
        }
    }

    pub fn view(&self) -> Mat4 {
        let orientation = self.head.map_or(Quat::IDENTITY, |h| h.orientation);
        Mat4::look_to_rh(self.eye(), orientation * Vec3::NEG_Z, orientation * Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_deg.to_radians(),
            self.aspect,
            CAMERA_NEAR,
            CAMERA_FAR,
        )
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// World-space ray through a point in normalized device coordinates
    pub fn ray_through(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_proj().inverse();
        let near = inverse * ndc.extend(0.0).extend(1.0);
        let far = inverse * ndc.extend(1.0).extend(1.0);
        let near = near.xyz() / near.w;
        let far = far.xyz() / far.w;
        Ray {
            origin: near,
            dir: (far - near).normalize_or_zero(),
        }
    }

    /// Stand behind a marker at eye height, facing the bench
    pub fn teleport_to(&mut self, marker: Vec3) {
        self.position = Vec3::new(marker.x, EYE_HEIGHT, marker.z + TELEPORT_STEP_BACK);
        log::debug!("Teleported to {:?}", self.position);
    }
}

/// Pixel coordinates (origin top-left) to NDC (origin centre, +Y up)
pub fn pointer_ndc(x: f32, y: f32, width: f32, height: f32) -> Vec2 {
    if width <= 0.0 || height <= 0.0 {
        return Vec2::ZERO;
    }
    Vec2::new(x / width * 2.0 - 1.0, -(y / height * 2.0 - 1.0))
}

/// Nearest marker under the ray
pub fn pick_marker<'a>(ray: &Ray, markers: &'a [TeleportMarker]) -> Option<&'a TeleportMarker> {
    markers
        .iter()
        .filter_map(|m| ray.hit_disc(m.position, m.radius).map(|t| (m, t)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(m, _)| m)
}

/// Teleport if the click lands on a marker. Returns the station reached.
pub fn teleport_at(
    viewpoint: &mut Viewpoint,
    scene: &Scene,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
) -> Option<StationId> {
    let ray = viewpoint.ray_through(pointer_ndc(x, y, width, height));
    let marker = pick_marker(&ray, &scene.markers)?;
    viewpoint.teleport_to(marker.position);
    Some(marker.station)
}

/// Teleport to a station's marker by id
pub fn teleport_to_station(viewpoint: &mut Viewpoint, scene: &Scene, station: StationId) -> bool {
    match scene.marker(station) {
        Some(marker) => {
            viewpoint.teleport_to(marker.position);
            true
        }
        None => false,
    }
}

/// Keyboard bindings. `g` toggles goggles, space fires.
pub fn key_command(key: &str) -> Option<Command> {
    match key {
        " " => Some(Command::Fire),
        k if k.eq_ignore_ascii_case("g") => Some(Command::ToggleSafetyGate),
        _ => None,
    }
}

/// Panel button ids to commands
pub fn button_command(id: &str) -> Option<Command> {
    let command = match id {
        "btn-fire" => Command::Fire,
        "btn-spawn" => Command::SpawnBody,
        "btn-mix" => Command::Mix,
        "btn-circuit" => Command::BuildCircuit,
        "btn-reset" => Command::ResetSession,
        "btn-ai" => Command::RunClassification,
        _ => return mission_command(id),
    };
    Some(command)
}

/// `mission-<id>` board buttons
pub fn mission_command(id: &str) -> Option<Command> {
    id.strip_prefix("mission-")
        .and_then(MissionId::from_str)
        .map(Command::AcceptMission)
}

/// Quality select value
pub fn quality_command(value: &str) -> Option<Command> {
    QualityTier::from_str(value).map(Command::SetQuality)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::compose::compose;

    /// Screen point where a world position projects, in pixels
    fn project(vp: &Viewpoint, world: Vec3, width: f32, height: f32) -> (f32, f32) {
        let clip = vp.view_proj() * world.extend(1.0);
        let ndc = clip.xyz() / clip.w;
        ((ndc.x + 1.0) / 2.0 * width, (1.0 - ndc.y) / 2.0 * height)
    }

    #[test]
    fn test_pointer_ndc_corners() {
        assert_eq!(pointer_ndc(0.0, 0.0, 800.0, 600.0), Vec2::new(-1.0, 1.0));
        assert_eq!(pointer_ndc(400.0, 300.0, 800.0, 600.0), Vec2::ZERO);
        assert_eq!(pointer_ndc(800.0, 600.0, 800.0, 600.0), Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_centre_ray_looks_down_negative_z() {
        let vp = Viewpoint::new(1.0);
        let ray = vp.ray_through(Vec2::ZERO);
        assert!((ray.dir - Vec3::NEG_Z).length() < 1e-4);
        assert!((ray.origin.x - vp.position.x).abs() < 1e-4);
    }

    #[test]
    fn test_click_on_marker_teleports() {
        let scene = compose();
        let mut vp = Viewpoint::new(800.0 / 600.0);
        let marker = *scene.marker(StationId::Physics).unwrap();
        let (x, y) = project(&vp, marker.position, 800.0, 600.0);

        let hit = teleport_at(&mut vp, &scene, x, y, 800.0, 600.0);
        assert_eq!(hit, Some(StationId::Physics));
        assert!((vp.position - Vec3::new(-3.0, 1.6, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_click_on_empty_floor_does_nothing() {
        let scene = compose();
        let mut vp = Viewpoint::new(800.0 / 600.0);
        let before = vp.position;
        // top-left corner looks at the wall, far from any marker
        assert_eq!(teleport_at(&mut vp, &scene, 1.0, 1.0, 800.0, 600.0), None);
        assert_eq!(vp.position, before);
    }

    #[test]
    fn test_head_pose_turns_the_view() {
        let mut vp = Viewpoint::new(1.0);
        vp.head = Some(HeadPose::new(
            Vec3::new(0.2, 1.5, 0.0),
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        ));
        assert!((vp.eye() - Vec3::new(0.2, 1.5, 3.0)).length() < 1e-5);
        // a quarter turn left looks down -X
        let ray = vp.ray_through(Vec2::ZERO);
        assert!((ray.dir - Vec3::NEG_X).length() < 1e-4);

        vp.head = None;
        assert_eq!(vp.eye(), START_POSITION);
    }

    #[test]
    fn test_head_pose_components() {
        let pose = HeadPose::from_components(&[0.0, 1.7, 0.0, 0.0, 0.0, 0.0, 2.0]).unwrap();
        assert_eq!(pose.position, Vec3::new(0.0, 1.7, 0.0));
        assert_eq!(pose.orientation, Quat::IDENTITY);
        assert_eq!(HeadPose::from_components(&[]), None);
        assert_eq!(HeadPose::from_components(&[0.0; 6]), None);

        let broken = HeadPose::new(Vec3::splat(f32::NAN), Quat::from_xyzw(0.0, 0.0, 0.0, 0.0));
        assert!(broken.position.is_finite());
        assert_eq!(broken.orientation, Quat::IDENTITY);
    }

    #[test]
    fn test_ray_parallel_to_disc_misses() {
        let ray = Ray {
            origin: Vec3::new(0.0, 1.0, 0.0),
            dir: Vec3::X,
        };
        assert_eq!(ray.hit_disc(Vec3::new(1.0, 1.0, 0.0), 0.4), None);
    }

    #[test]
    fn test_teleport_by_station() {
        let scene = compose();
        let mut vp = Viewpoint::default();
        assert!(teleport_to_station(&mut vp, &scene, StationId::Ai));
        assert_eq!(vp.position, Vec3::new(3.0, 1.6, 0.0));
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(key_command("g"), Some(Command::ToggleSafetyGate));
        assert_eq!(key_command("G"), Some(Command::ToggleSafetyGate));
        assert_eq!(key_command(" "), Some(Command::Fire));
        assert_eq!(key_command("h"), None);
        assert_eq!(key_command("Enter"), None);
    }

    #[test]
    fn test_buttons_and_select() {
        assert_eq!(button_command("btn-mix"), Some(Command::Mix));
        assert_eq!(
            button_command("mission-pendulum"),
            Some(Command::AcceptMission(MissionId::Pendulum))
        );
        assert_eq!(button_command("mission-lasers"), None);
        assert_eq!(
            quality_command("high"),
            Some(Command::SetQuality(QualityTier::High))
        );
        assert_eq!(quality_command("ultra"), None);
    }
}
