use crate::error::ExtractionCallError;

pub mod gemini;

/// A generative text model: prompt in, raw text out. Callers must not trust the text's shape.
pub trait Generator {
    fn generate(&self, prompt: &str) -> Result<String, ExtractionCallError>;
}

impl<G: Generator + ?Sized> Generator for &G {
    fn generate(&self, prompt: &str) -> Result<String, ExtractionCallError> {
        (**self).generate(prompt)
    }
}
