//! Outbound inference providers.
//!
//! The orchestrator only sees [`VisionProvider`]; the Gemini client is the
//! production implementation and tests substitute their own.

pub mod gemini;

use crate::{credential::Credential, error::AppError, image_utils::EncodedImage, models::gemini::ModelReply};
use async_trait::async_trait;

/// Instruction sent alongside every image
pub const ANALYSIS_PROMPT: &str = "Analyze this party decoration image and list the materials used along with their estimated rental prices in Ethiopian Birr (ETB). Format the response as a JSON array with objects containing 'name' and 'price' properties.";

/// A multimodal model that answers a fixed question about one image.
#[async_trait]
pub trait VisionProvider: Send + Sync + 'static {
    /// Provider name for logs and metrics
    fn name(&self) -> &str;

    /// Send one image and return the model's reply.
    ///
    /// Non-success statuses and network failures are errors; a success body
    /// without usable text is `Ok(ModelReply::Malformed)`.
    async fn describe_image(
        &self,
        credential: &Credential,
        image: &EncodedImage,
    ) -> Result<ModelReply, AppError>;
}
