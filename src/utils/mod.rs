#[cfg(feature = "progressbar")]
use std::io::Stdout;
use std::mem::transmute;

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

pub mod logging;
pub mod num;
pub mod validator;

pub type Random = Pcg64Mcg;

pub fn create_seeded_rng(seed: i128) -> Random {
    let raw_bytes: [u8; 16] = unsafe { transmute(seed) };
    let mut rng = Pcg64Mcg::from_seed(raw_bytes);
    // discard the first three
    rng.next_u64();
    rng.next_u64();
    rng.next_u64();
    rng
}

pub trait BatchProgressTracker {
    fn update(&mut self, label: &str);
    fn inc(&mut self);
}

pub struct DisabledBatchTracker {}

impl DisabledBatchTracker {
    pub fn new(_total: u64) -> Self {
        Self {}
    }
}

impl BatchProgressTracker for DisabledBatchTracker {
    fn update(&mut self, _: &str) {}
    fn inc(&mut self) {}
}

#[cfg(feature = "progressbar")]
pub struct PBRBatchTracker {
    progressbar: pbr::ProgressBar<Stdout>,
}

#[cfg(feature = "progressbar")]
impl PBRBatchTracker {
    pub fn new(total: u64) -> Self {
        Self {
            progressbar: pbr::ProgressBar::new(total),
        }
    }
}

#[cfg(feature = "progressbar")]
impl Drop for PBRBatchTracker {
    fn drop(&mut self) {
        self.progressbar.finish_println("");
    }
}

#[cfg(feature = "progressbar")]
impl BatchProgressTracker for PBRBatchTracker {
    fn update(&mut self, label: &str) {
        self.progressbar.message(format!("{} | ", label).as_str());
    }
    fn inc(&mut self) {
        self.progressbar.inc();
    }
}

#[cfg(feature = "progressbar")]
pub type DefaultBatchTracker = PBRBatchTracker;

#[cfg(not(feature = "progressbar"))]
pub type DefaultBatchTracker = DisabledBatchTracker;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_rng_is_reproducible() {
        let mut a = create_seeded_rng(42);
        let mut b = create_seeded_rng(42);
        for _ in 0..8 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
        let mut c = create_seeded_rng(43);
        assert_ne!(create_seeded_rng(42).next_u64(), c.next_u64());
    }
}
