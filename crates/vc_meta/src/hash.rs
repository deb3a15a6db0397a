//! Hash containers with a fixed hash state, re-exports *hashbrown* and *foldhash*.
//!
//! The fixed seed keeps [`stable_hash`] results identical across runs,
//! which modification records depend on.

use core::hash::{BuildHasher, Hash};

use foldhash::fast::FixedState;

// -----------------------------------------------------------------------------
// FixedHashState

const FIXED_SEED: u64 = 0x51_7C_C1_B7_27_22_0A_95;

/// Hash state with a fixed seed, results only depend on the input.
#[derive(Clone, Debug)]
pub struct FixedHashState(FixedState);

impl Default for FixedHashState {
    #[inline]
    fn default() -> Self {
        Self(FixedState::with_seed(FIXED_SEED))
    }
}

impl BuildHasher for FixedHashState {
    type Hasher = foldhash::fast::FoldHasher<'static>;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        self.0.build_hasher()
    }
}

/// A [`hashbrown::HashMap`] using [`FixedHashState`].
pub type HashMap<K, V> = hashbrown::HashMap<K, V, FixedHashState>;

/// A [`hashbrown::HashSet`] using [`FixedHashState`].
pub type HashSet<T> = hashbrown::HashSet<T, FixedHashState>;

/// Hashes a value with [`FixedHashState`].
///
/// # Examples
///
/// ```
/// use vc_meta::hash::stable_hash;
///
/// assert_eq!(stable_hash("key"), stable_hash("key"));
/// assert_ne!(stable_hash("key"), stable_hash("value"));
/// ```
#[inline]
pub fn stable_hash<T: Hash + ?Sized>(value: &T) -> u64 {
    FixedHashState::default().hash_one(value)
}

// -----------------------------------------------------------------------------
// Re-export crates

pub use foldhash;
pub use hashbrown;
