use instant::Instant;

/// Seconds elapsed since the owning scene was built.
///
/// Readings never go backwards, even if the platform clock does.
#[derive(Debug)]
pub struct AnimationClock {
    start: Instant,
    last: f32,
}

impl AnimationClock {
    pub fn start() -> Self {
        Self::start_at(Instant::now())
    }

    pub fn start_at(start: Instant) -> Self {
        Self { start, last: 0.0 }
    }

    pub fn elapsed(&mut self) -> f32 {
        self.elapsed_at(Instant::now())
    }

    pub fn elapsed_at(&mut self, now: Instant) -> f32 {
        if now < self.start {
            return self.last;
        }
        let seconds = now.duration_since(self.start).as_secs_f32();
        self.last = self.last.max(seconds);
        self.last
    }
}
