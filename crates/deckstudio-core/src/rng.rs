// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

/// A minimal, zero-dependency, completely insecure PRNG to shuffle the cards.
pub struct TinyRng {
    state: u64,
}

const A: u64 = 6364136223846793005;
const C: u64 = 1442695040888963407;

impl TinyRng {
    /// Initialize the RNG from a seed.
    pub fn from_seed(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Initialize the RNG from the system clock.
    #[cfg(feature = "clock")]
    pub fn from_clock() -> Self {
        use std::time::SystemTime;
        use std::time::UNIX_EPOCH;

        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        Self::from_seed(seed)
    }

    pub fn next_u32(&mut self) -> u32 {
        let new = self.state.wrapping_mul(A).wrapping_add(C);
        self.state = new;
        (new >> 32) as u32
    }

    /// Generate a uniformly distributed number in `[0, max)`.
    ///
    /// Draws that fall in the incomplete last bucket of the `u32` range are
    /// rejected, so every value is exactly equally likely.
    pub fn generate(&mut self, max: u32) -> u32 {
        assert!(max > 0);
        let zone = u32::MAX - (u32::MAX % max);
        loop {
            let x = self.next_u32();
            if x < zone {
                return x % max;
            }
        }
    }
}

/// Fisher-Yates: walk from the last index down to 1, swapping each element
/// with a uniformly chosen one at or before it.
pub fn shuffle<T>(v: &mut [T], rng: &mut TinyRng) {
    for i in (1..v.len()).rev() {
        let j = rng.generate(i as u32 + 1) as usize;
        v.swap(i, j);
    }
}
