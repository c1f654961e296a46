use glam::{Mat4, Vec3};
use sdl2::keyboard::Scancode;
use sdl2::mouse::MouseButton;
use std::f32::consts::{FRAC_PI_2, TAU};

use crate::config::{FAR, FOV, NEAR};

/// Perspective lens for the main view.
pub struct Camera {
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            fov: FOV,
            near: NEAR,
            far: FAR,
        }
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov.to_radians(), aspect, self.near, self.far)
    }

    /// Width of the near plane as the lit shader expects it. The field of
    /// view goes into `tan` in degrees; the shader's penumbra scale was
    /// tuned against that value.
    pub fn frustum_size(&self, aspect: f32) -> f32 {
        2.0 * self.near * (self.fov * 0.5).tan() * aspect
    }
}

const WALK_SCALE: f32 = 0.007;

/// Mouse-and-keyboard fly controller. Orientation is kept as two angles:
/// `phi` around world up and `theta` above the horizon.
pub struct Navigator {
    pub move_speed: f32,
    pub rotate_speed: f32,
    pub position: Vec3,
    phi: f32,
    theta: f32,
    right: Vec3,
    up: Vec3,
    back: Vec3,
    drag_rotate: bool,
    drag_walk: bool,
    drag_pan: bool,
    last_mouse: Option<(i32, i32)>,
    move_x: f32,
    move_z: f32,
}

impl Navigator {
    pub fn new(move_speed: f32, rotate_speed: f32, position: Vec3) -> Self {
        let mut navigator = Self {
            move_speed,
            rotate_speed,
            position,
            phi: FRAC_PI_2,
            theta: 0.0,
            right: Vec3::X,
            up: Vec3::Y,
            back: Vec3::Z,
            drag_rotate: false,
            drag_walk: false,
            drag_pan: false,
            last_mouse: None,
            move_x: 0.0,
            move_z: 0.0,
        };
        navigator.update_axes();
        navigator
    }

    fn update_axes(&mut self) {
        let (sp, cp) = self.phi.sin_cos();
        let (st, ct) = self.theta.sin_cos();
        self.back = Vec3::new(ct * cp, st, ct * sp);
        self.up = Vec3::new(-st * cp, ct, -st * sp);
        self.right = self.up.cross(self.back);
    }

    pub fn forward(&self) -> Vec3 {
        -self.back
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward(), self.up)
    }

    fn pan(&mut self, x: f32, y: f32) {
        self.position += x * self.right + y * self.up;
    }

    fn walk(&mut self, delta: f32) {
        self.position += delta * self.back;
    }

    pub fn button_down(&mut self, button: MouseButton) {
        self.set_drag(button, true);
    }

    pub fn button_up(&mut self, button: MouseButton) {
        self.set_drag(button, false);
    }

    fn set_drag(&mut self, button: MouseButton, held: bool) {
        match button {
            MouseButton::Left => self.drag_rotate = held,
            MouseButton::Right => self.drag_walk = held,
            MouseButton::Middle => self.drag_pan = held,
            _ => {}
        }
    }

    pub fn mouse_move(&mut self, x: i32, y: i32) {
        let (last_x, last_y) = self.last_mouse.unwrap_or((x, y));
        self.last_mouse = Some((x, y));
        if !(self.drag_rotate || self.drag_walk || self.drag_pan) {
            return;
        }
        let (dx, dy) = (x - last_x, y - last_y);
        if self.drag_rotate {
            self.phi = (self.phi + dx as f32 * self.rotate_speed) % TAU;
            self.theta = (self.theta - dy as f32 * self.rotate_speed) % TAU;
        }
        if self.drag_walk {
            let sign = if dy.abs() > dx.abs() {
                if dy < 0 { -1.0 } else { 1.0 }
            } else if dx > 0 {
                -1.0
            } else {
                1.0
            };
            let distance = ((dx * dx + dy * dy) as f32).sqrt();
            self.walk(sign * distance * self.move_speed * WALK_SCALE);
        }
        if self.drag_pan {
            let scale = self.move_speed * WALK_SCALE;
            self.pan(-dx as f32 * scale, dy as f32 * scale);
        }
        self.update_axes();
    }

    pub fn mouse_wheel(&mut self, delta: i32) {
        self.walk(-(delta as f32) * self.move_speed * WALK_SCALE);
    }

    pub fn key_down(&mut self, key: Scancode) {
        match key {
            Scancode::Left | Scancode::A => self.move_x = -1.0,
            Scancode::Right | Scancode::D => self.move_x = 1.0,
            Scancode::Up | Scancode::W => self.move_z = -1.0,
            Scancode::Down | Scancode::S => self.move_z = 1.0,
            _ => {}
        }
    }

    pub fn key_up(&mut self, key: Scancode) {
        match key {
            Scancode::Left | Scancode::A | Scancode::Right | Scancode::D => self.move_x = 0.0,
            Scancode::Up | Scancode::W | Scancode::Down | Scancode::S => self.move_z = 0.0,
            _ => {}
        }
    }

    pub fn update(&mut self, dt: f32) {
        let velocity = self.move_speed * dt;
        if self.move_x != 0.0 {
            self.pan(self.move_x * velocity, 0.0);
        }
        if self.move_z != 0.0 {
            self.walk(self.move_z * velocity);
        }
    }
}
