use {
    rapidhash::v3::rapidhash_v3,
    std::hash::{BuildHasherDefault, Hasher},
};

/// Default hasher for ring positions and keys.
///
/// This uses the rapidhash V3 algorithm for hashing keys.
/// For C++ compatibility, relies on the default seed and secrets.
///
/// The output is portable across platforms and major releases, so a ring
/// built on one host places members and keys exactly as any other host
/// would.
#[derive(Default)]
pub struct DefaultHasher(Vec<u8>);

impl Hasher for DefaultHasher {
    fn write(&mut self, bytes: &[u8]) {
        self.0.extend_from_slice(bytes);
    }

    fn finish(&self) -> u64 {
        rapidhash_v3(&self.0)
    }
}

/// Build hasher used by rings unless a custom one is supplied.
pub type DefaultBuildHasher = BuildHasherDefault<DefaultHasher>;
