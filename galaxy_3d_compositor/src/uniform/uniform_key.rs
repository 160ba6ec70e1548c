/// Stable uniform keys.
///
/// A key is the 64-bit FNV-1a hash of the uniform's declared name. The hash
/// is computed in `const` context, so it is identical across runs and
/// builds and well-known keys are compile-time constants.

use std::fmt;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UniformKey(u64);

impl UniformKey {
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut hash = FNV_OFFSET_BASIS;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
            i += 1;
        }
        Self(hash)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl From<&str> for UniformKey {
    fn from(name: &str) -> Self {
        Self::from_name(name)
    }
}

impl fmt::Debug for UniformKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UniformKey({:#018x})", self.0)
    }
}

/// Keys of the uniforms the compositor and built-in passes write
pub mod builtin {
    use super::UniformKey;

    pub const MODEL_MATRIX: UniformKey = UniformKey::from_name("ModelMatrix");
    pub const VIEW_MATRIX: UniformKey = UniformKey::from_name("ViewMatrix");
    pub const PROJECTION_MATRIX: UniformKey = UniformKey::from_name("ProjectionMatrix");
    pub const VIEW_PROJECTION_MATRIX: UniformKey = UniformKey::from_name("ViewProjectionMatrix");
    pub const CAMERA_POSITION: UniformKey = UniformKey::from_name("CameraPosition");
    pub const VIEWPORT_SIZE: UniformKey = UniformKey::from_name("ViewportSize");
    pub const ENTITY_ID: UniformKey = UniformKey::from_name("EntityId");
}

#[cfg(test)]
#[path = "uniform_key_tests.rs"]
mod tests;
