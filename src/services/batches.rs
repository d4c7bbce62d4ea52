use crate::api::BatchApi;
use crate::error::PortalError;
use crate::models::Batch;

/// Batch roster for the admin calendar screen, split by the server's
/// `isActive` flag. Batches the server left unflagged count as inactive.
#[derive(Debug, Default)]
pub struct BatchBoard {
    pub active: Vec<Batch>,
    pub inactive: Vec<Batch>,
}

impl BatchBoard {
    pub async fn load(api: &dyn BatchApi) -> Result<Self, PortalError> {
        let batches = api.list().await?;
        Ok(Self::from_batches(batches))
    }

    pub fn from_batches(batches: Vec<Batch>) -> Self {
        let (active, inactive): (Vec<_>, Vec<_>) = batches
            .into_iter()
            .partition(|batch| batch.is_active.unwrap_or(false));
        Self { active, inactive }
    }
}
