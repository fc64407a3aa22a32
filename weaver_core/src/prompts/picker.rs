//! Template selection seam.

use rand::rngs::ThreadRng;
use rand::Rng;
use std::collections::VecDeque;

/// Chooses one of `len` candidate templates.
///
/// Implementations must return an index below `len` whenever `len > 0`.
pub trait TemplatePicker {
    fn pick(&mut self, len: usize) -> usize;
}

/// Uniform random picker over any [`Rng`].
#[derive(Debug, Clone)]
pub struct RngPicker<R: Rng> {
    rng: R,
}

impl RngPicker<ThreadRng> {
    /// Picker backed by the thread-local generator.
    pub fn thread() -> Self {
        Self::new(rand::thread_rng())
    }
}

impl Default for RngPicker<ThreadRng> {
    fn default() -> Self {
        Self::thread()
    }
}

impl<R: Rng> RngPicker<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> TemplatePicker for RngPicker<R> {
    fn pick(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.rng.gen_range(0..len)
    }
}

/// Replays a fixed sequence of choices, wrapping each into range.
/// Once the sequence is exhausted it always picks the first template.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPicker {
    choices: VecDeque<usize>,
}

impl ScriptedPicker {
    pub fn new(choices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            choices: choices.into_iter().collect(),
        }
    }

    /// Choices not yet consumed.
    pub fn remaining(&self) -> usize {
        self.choices.len()
    }
}

impl TemplatePicker for ScriptedPicker {
    fn pick(&mut self, len: usize) -> usize {
        let choice = self.choices.pop_front().unwrap_or(0);
        if len == 0 {
            0
        } else {
            choice % len
        }
    }
}

impl<P: TemplatePicker + ?Sized> TemplatePicker for &mut P {
    fn pick(&mut self, len: usize) -> usize {
        (**self).pick(len)
    }
}
