use std::time::Instant;

pub struct FrameTimer {
    last: Instant,
    pub dt: f32,
}

impl FrameTimer {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
            dt: 0.0,
        }
    }

    pub fn tick(&mut self) {
        let now = Instant::now();
        self.dt = now.duration_since(self.last).as_secs_f32();
        self.last = now;
    }
}

/// Frames-per-second over roughly one-second windows.
#[derive(Default)]
pub struct FpsCounter {
    frames: u32,
    elapsed: f32,
}

impl FpsCounter {
    /// Counts one frame of length `dt`. Returns the rate once a full second
    /// has accumulated, then starts a new window.
    pub fn frame(&mut self, dt: f32) -> Option<f32> {
        self.frames += 1;
        self.elapsed += dt;
        if self.elapsed < 1.0 {
            return None;
        }
        let fps = self.frames as f32 / self.elapsed;
        self.frames = 0;
        self.elapsed = 0.0;
        Some(fps)
    }
}
