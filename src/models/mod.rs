pub mod gemini;
pub mod material;
