use digest::Digest;

/// A streaming hasher for one algorithm.
///
/// Instances carry running state and are not meant to be shared between
/// concurrent traversals; create one per algorithm per traversal.
pub trait Hasher: Send {
    fn update(&mut self, data: &[u8]);

    /// Digest of everything fed since construction or the last [`reset`](Self::reset).
    /// Does not reset the running state.
    fn digest(&self) -> Vec<u8>;

    fn reset(&mut self);

    /// Lowercase hexadecimal form of [`digest`](Self::digest).
    fn hex_digest(&self) -> String { hex::encode(self.digest()) }
}

impl<H: Hasher + ?Sized> Hasher for Box<H> {
    fn update(&mut self, data: &[u8]) { (**self).update(data) }

    fn digest(&self) -> Vec<u8> { (**self).digest() }

    fn reset(&mut self) { (**self).reset() }
}

impl<H: Hasher + ?Sized> Hasher for &mut H {
    fn update(&mut self, data: &[u8]) { (**self).update(data) }

    fn digest(&self) -> Vec<u8> { (**self).digest() }

    fn reset(&mut self) { (**self).reset() }
}

/// Adapter from any RustCrypto [`Digest`] to [`Hasher`].
#[derive(Clone, Default)]
pub struct DigestHasher<D>(D);

impl<D: Digest> DigestHasher<D> {
    pub fn new() -> Self { Self(D::new()) }
}

impl<D: Digest + Clone + Send> Hasher for DigestHasher<D> {
    fn update(&mut self, data: &[u8]) { Digest::update(&mut self.0, data); }

    fn digest(&self) -> Vec<u8> { self.0.clone().finalize().to_vec() }

    fn reset(&mut self) { self.0 = D::new(); }
}

pub type Md5Hasher = DigestHasher<md5::Md5>;
pub type Sha1Hasher = DigestHasher<sha1::Sha1>;
pub type Sha224Hasher = DigestHasher<sha2::Sha224>;
pub type Sha256Hasher = DigestHasher<sha2::Sha256>;
pub type Sha384Hasher = DigestHasher<sha2::Sha384>;
pub type Sha512Hasher = DigestHasher<sha2::Sha512>;

#[cfg(feature = "blake3")]
#[derive(Clone, Default)]
pub struct Blake3Hasher(blake3::Hasher);

#[cfg(feature = "blake3")]
impl Blake3Hasher {
    pub fn new() -> Self { Self(blake3::Hasher::new()) }
}

#[cfg(feature = "blake3")]
impl Hasher for Blake3Hasher {
    fn update(&mut self, data: &[u8]) { self.0.update(data); }

    fn digest(&self) -> Vec<u8> { self.0.finalize().as_bytes().to_vec() }

    fn reset(&mut self) { self.0.reset(); }
}
