use crate::{Channel, Error, Result};

/// Turns a raw per-channel sample sequence into a fixed-length embedding.
///
/// Implementations are expected to be deterministic for identical input.
/// The engine itself never embeds; the seeder and request boundary do.
pub trait Embedder: Send + Sync {
    /// Length of every vector returned by [`Embedder::embed`]
    fn dimension(&self) -> usize;

    fn embed(&self, channel: Channel, samples: &[f32]) -> Result<Vec<f32>>;

    /// Embed and check the advertised dimension.
    fn embed_checked(&self, channel: Channel, samples: &[f32]) -> Result<Vec<f32>> {
        if samples.is_empty() {
            return Err(Error::EmptySignal);
        }
        let embedding = self.embed(channel, samples)?;
        if embedding.len() != self.dimension() {
            return Err(Error::DimensionMismatch {
                expected: self.dimension(),
                actual: embedding.len(),
            });
        }
        Ok(embedding)
    }
}

impl<E: Embedder + ?Sized> Embedder for std::sync::Arc<E> {
    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn embed(&self, channel: Channel, samples: &[f32]) -> Result<Vec<f32>> {
        (**self).embed(channel, samples)
    }
}
