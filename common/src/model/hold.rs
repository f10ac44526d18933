use serde::{Deserialize, Serialize};

/// Metadata part of a bulk hold upload. Sent as the `json` field of the
/// multipart request, before the CSV file itself.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkHoldRequest {
    pub scheme_id: String,
    /// Hold category as defined by the payment backend for the scheme.
    pub hold_category_id: u32,
}
