//! Creator profile model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use streamshort_core::types::{DbId, Timestamp};

/// A row from the `creator_profiles` table. One per user.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CreatorProfile {
    pub id: DbId,
    pub user_id: DbId,
    pub display_name: String,
    pub bio: Option<String>,
    pub kyc_document_s3_path: String,
    pub kyc_status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for onboarding a creator.
#[derive(Debug, Clone)]
pub struct CreateCreatorProfile {
    pub user_id: DbId,
    pub display_name: String,
    pub bio: Option<String>,
    pub kyc_document_s3_path: String,
}

/// DTO for updating a creator profile. Only `Some` fields are applied.
///
/// `kyc_status` is set by the caller when the KYC document changes.
#[derive(Debug, Clone, Default)]
pub struct UpdateCreatorProfile {
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub kyc_document_s3_path: Option<String>,
    pub kyc_status: Option<String>,
}
