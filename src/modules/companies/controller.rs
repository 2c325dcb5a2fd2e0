use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use validator::Validate;

use super::{
    crud::{CompanyCrud, DocumentPaths},
    interface::{CompanyError, Result},
    model::{Company, DOCUMENT_SLOTS},
    schema::{CompanyResponse, DocumentResponse, UpdateCompanyRequest},
};
use crate::services::auth::AuthUser;
use crate::services::storage::{MultipartForm, DOCUMENT_EXTENSIONS};
use crate::AppState;

const DOCUMENT_FOLDER: &str = "company_documents";

async fn company_response(state: &AppState, company: Company) -> Result<CompanyResponse> {
    let documents = CompanyCrud::new(state.db.clone())
        .documents(company.id)
        .await?
        .into_iter()
        .map(|d| DocumentResponse::new(d, &state.storage))
        .collect();

    Ok(CompanyResponse { company, documents })
}

/// Loads a company the caller owns. Someone else's company looks missing.
async fn owned_company(state: &AppState, user: &AuthUser, id: i64) -> Result<Company> {
    CompanyCrud::new(state.db.clone())
        .find_by_id(id)
        .await?
        .filter(|c| c.account_id.as_deref() == Some(user.id.as_str()))
        .ok_or(CompanyError::NotFound)
}

/// Validates every supplied file before writing any of them.
async fn store_documents(state: &AppState, multipart: Multipart) -> Result<DocumentPaths> {
    let form = MultipartForm::read(multipart).await.map_err(|source| CompanyError::Upload {
        field: "non_field_errors".to_string(),
        source,
    })?;

    for slot in DOCUMENT_SLOTS {
        if let Some(file) = form.files.get(slot) {
            state
                .storage
                .check(file, DOCUMENT_EXTENSIONS)
                .map_err(|source| CompanyError::Upload { field: slot.to_string(), source })?;
        }
    }

    let mut paths: DocumentPaths = Default::default();
    for (i, slot) in DOCUMENT_SLOTS.iter().enumerate() {
        if let Some(file) = form.files.get(*slot) {
            let path = state
                .storage
                .save(DOCUMENT_FOLDER, file, DOCUMENT_EXTENSIONS)
                .await
                .map_err(|source| CompanyError::Upload { field: slot.to_string(), source })?;
            state.metrics.record_upload(DOCUMENT_FOLDER);
            paths[i] = Some(path);
        }
    }

    if paths.iter().all(Option::is_none) {
        return Err(CompanyError::NoFiles);
    }
    Ok(paths)
}

async fn discard(state: &AppState, paths: &DocumentPaths) {
    for path in paths.iter().flatten() {
        state.storage.remove(path).await;
    }
}

pub async fn get_my_company(State(state): State<Arc<AppState>>, user: AuthUser) -> Result<Json<CompanyResponse>> {
    let company = CompanyCrud::new(state.db.clone())
        .find_by_account(&user.id)
        .await?
        .ok_or(CompanyError::NotFound)?;

    Ok(Json(company_response(&state, company).await?))
}

pub async fn get_company(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<CompanyResponse>> {
    let company = CompanyCrud::new(state.db.clone())
        .find_by_id(id)
        .await?
        .ok_or(CompanyError::NotFound)?;

    Ok(Json(company_response(&state, company).await?))
}

pub async fn update_company(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateCompanyRequest>,
) -> Result<Json<CompanyResponse>> {
    let company = owned_company(&state, &user, id).await?;
    req.validate()?;

    let crud = CompanyCrud::new(state.db.clone());
    crud.update(company.id, &req).await?;
    tracing::info!(company_id = company.id, "company updated");

    let company = crud.find_by_id(company.id).await?.ok_or(CompanyError::NotFound)?;
    Ok(Json(company_response(&state, company).await?))
}

pub async fn upload_documents(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<DocumentResponse>)> {
    let company = owned_company(&state, &user, id).await?;
    let paths = store_documents(&state, multipart).await?;

    let crud = CompanyCrud::new(state.db.clone());
    let doc_id = match crud.create_document(company.id, &paths).await {
        Ok(id) => id,
        Err(e) => {
            discard(&state, &paths).await;
            return Err(e.into());
        }
    };

    let doc = crud.find_document(doc_id).await?.ok_or(CompanyError::DocumentsNotFound)?;
    Ok((StatusCode::CREATED, Json(DocumentResponse::new(doc, &state.storage))))
}

pub async fn replace_documents(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<DocumentResponse>> {
    let company = owned_company(&state, &user, id).await?;
    let crud = CompanyCrud::new(state.db.clone());
    let existing = crud
        .latest_document(company.id)
        .await?
        .ok_or(CompanyError::DocumentsNotFound)?;

    let paths = store_documents(&state, multipart).await?;
    if let Err(e) = crud.update_document(existing.id, &paths).await {
        discard(&state, &paths).await;
        return Err(e.into());
    }

    // old files that were replaced
    let previous = [
        existing.tin_certificate,
        existing.ogrn_certificate,
        existing.charter,
        existing.director_appointment,
    ];
    for (old, new) in previous.iter().zip(paths.iter()) {
        if let (Some(old), Some(_)) = (old, new) {
            state.storage.remove(old).await;
        }
    }

    let doc = crud.find_document(existing.id).await?.ok_or(CompanyError::DocumentsNotFound)?;
    Ok(Json(DocumentResponse::new(doc, &state.storage)))
}
