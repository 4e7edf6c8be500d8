//! Loaded dice for tests.

use delvers_core::rng::DeterministicRng;

/// Dice that always land on their lowest face.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockRng;

impl DeterministicRng for MockRng {
    fn next_u32_range(&mut self, min: u32, _max: u32) -> u32 {
        min
    }

    fn next_f64(&mut self) -> f64 {
        0.0
    }
}

/// Dice that replay a fixed list of faces, wrapping around at the end.
/// Faces outside the requested range are clamped into it.
#[derive(Debug, Clone)]
pub struct SequenceRng {
    faces: Vec<u32>,
    next: usize,
}

impl SequenceRng {
    /// Dice that land on `faces` in order.
    ///
    /// # Panics
    ///
    /// Panics if `faces` is empty.
    #[must_use]
    pub fn new(faces: Vec<u32>) -> Self {
        assert!(!faces.is_empty(), "a loaded die needs at least one face");
        Self { faces, next: 0 }
    }
}

impl DeterministicRng for SequenceRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        let face = self.faces[self.next % self.faces.len()];
        self.next += 1;
        face.clamp(min, max.max(min))
    }

    fn next_f64(&mut self) -> f64 {
        0.0
    }
}
