use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use validator::Validate;

use super::{
    crud::SiteCrud,
    interface::{Result, SiteError},
    schema::{ContactResponse, InquiryCreated, InquiryPayload, PartnerResponse},
};
use crate::services::storage::ANY_EXTENSION;
use crate::AppState;

const INQUIRY_FOLDER: &str = "requests/files";

pub async fn get_contact(State(state): State<Arc<AppState>>) -> Result<Json<ContactResponse>> {
    let contact = SiteCrud::new(state.db.clone())
        .latest_contact()
        .await?
        .ok_or(SiteError::ContactNotFound)?;
    Ok(Json(contact.into()))
}

pub async fn list_partners(State(state): State<Arc<AppState>>) -> Result<Json<Vec<PartnerResponse>>> {
    let partners = SiteCrud::new(state.db.clone()).partners().await?;
    Ok(Json(
        partners
            .into_iter()
            .map(|p| PartnerResponse::new(p, &state.storage))
            .collect(),
    ))
}

pub async fn create_inquiry(
    State(state): State<Arc<AppState>>,
    payload: InquiryPayload,
) -> Result<(StatusCode, Json<InquiryCreated>)> {
    payload.form.validate()?;

    let path = match &payload.file {
        Some(file) => {
            let path = state
                .storage
                .save(INQUIRY_FOLDER, file, ANY_EXTENSION)
                .await
                .map_err(SiteError::upload("file"))?;
            state.metrics.record_upload(INQUIRY_FOLDER);
            Some(path)
        }
        None => None,
    };

    let id = match SiteCrud::new(state.db.clone())
        .create_inquiry(&payload.form, path.as_deref())
        .await
    {
        Ok(id) => id,
        Err(e) => {
            if let Some(path) = &path {
                state.storage.remove(path).await;
            }
            return Err(e.into());
        }
    };
    tracing::info!(inquiry_id = id, with_file = path.is_some(), "inquiry received");

    Ok((
        StatusCode::CREATED,
        Json(InquiryCreated {
            message: "Request sent successfully",
            id,
        }),
    ))
}
