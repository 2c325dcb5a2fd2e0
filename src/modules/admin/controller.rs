use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use super::{
    crud::AdminCrud,
    interface::{AdminError, Result},
    schema::{
        AccountListQuery, AdminAccountResponse, AdminImageResponse, AdminMeterageResponse, CategoryRequest,
        CategoryResponse, MeterageRequest, ProductRequest,
    },
};
use crate::modules::accounts::{
    crud::{AccountCrud, AccountFlags},
    model::Role,
};
use crate::modules::catalog::{controller::hydrate, crud::CatalogCrud, schema::ProductResponse};
use crate::modules::orders::{
    crud::{MethodKind, OrderCrud},
    schema::{CreateMethodRequest, MethodResponse},
};
use crate::modules::sites::{
    crud::SiteCrud,
    schema::{ContactRequest, ContactResponse, InquiryResponse, PartnerResponse},
};
use crate::services::auth::StaffUser;
use crate::services::pagination::{PageQuery, Paginated};
use crate::services::response::MessageResponse;
use crate::services::storage::{MultipartForm, UploadedFile, IMAGE_EXTENSIONS};
use crate::AppState;

const PRODUCT_IMAGE_FOLDER: &str = "products";
const CATEGORY_IMAGE_FOLDER: &str = "categories";
const PARTNER_FOLDER: &str = "partners";

async fn read_image(multipart: Multipart) -> Result<(MultipartForm, UploadedFile)> {
    let mut form = MultipartForm::read(multipart)
        .await
        .map_err(AdminError::upload("non_field_errors"))?;
    let file = form.files.remove("image").ok_or(AdminError::NoFile)?;
    Ok((form, file))
}

async fn save_image(state: &AppState, folder: &str, file: &UploadedFile) -> Result<String> {
    let path = state
        .storage
        .save(folder, file, IMAGE_EXTENSIONS)
        .await
        .map_err(AdminError::upload("image"))?;
    state.metrics.record_upload(folder);
    Ok(path)
}

async fn product_response(state: &AppState, id: i64) -> Result<ProductResponse> {
    let row = CatalogCrud::new(state.db.clone())
        .find_product(id)
        .await?
        .ok_or(AdminError::NotFound("Product"))?;
    hydrate(state, vec![row], None)
        .await?
        .pop()
        .ok_or(AdminError::NotFound("Product"))
}

// =============================================================================
// ACCOUNTS
// =============================================================================

pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
    Query(query): Query<AccountListQuery>,
    Query(paging): Query<PageQuery>,
) -> Result<Json<Paginated<AdminAccountResponse>>> {
    let role = query.role()?;
    let page = paging.page();
    let (accounts, count) = AccountCrud::new(state.db.clone()).list(role, page).await?;

    Ok(Json(Paginated::new(
        accounts.into_iter().map(Into::into).collect(),
        count,
        page,
    )))
}

pub async fn update_account(
    State(state): State<Arc<AppState>>,
    StaffUser(staff): StaffUser,
    Path(id): Path<String>,
    Json(flags): Json<AccountFlags>,
) -> Result<Json<AdminAccountResponse>> {
    let crud = AccountCrud::new(state.db.clone());
    if !crud.set_flags(&id, &flags).await? {
        return Err(AdminError::NotFound("Account"));
    }
    tracing::info!(staff_id = %staff.id, account_id = %id, ?flags, "account flags changed");

    let account = crud.find_by_id(&id).await?.ok_or(AdminError::NotFound("Account"))?;
    Ok(Json(account.into()))
}

// =============================================================================
// CATEGORIES
// =============================================================================

/// A parent must exist, must itself be a main category, and cannot be the category itself.
async fn check_parent(state: &AppState, parent_id: Option<i64>, category_id: Option<i64>) -> Result<()> {
    let Some(parent_id) = parent_id else {
        return Ok(());
    };
    if Some(parent_id) == category_id {
        return Err(AdminError::NestedSubCategory);
    }
    let parent = CatalogCrud::new(state.db.clone())
        .find_category(parent_id)
        .await?
        .ok_or(AdminError::NotFound("Parent category"))?;
    if !parent.is_main() {
        return Err(AdminError::NestedSubCategory);
    }
    Ok(())
}

pub async fn create_category(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
    Json(req): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>)> {
    req.validate()?;
    check_parent(&state, req.parent_id, None).await?;

    let id = AdminCrud::new(state.db.clone()).create_category(&req).await?;
    tracing::info!(category_id = id, parent_id = ?req.parent_id, "category created");

    let category = CatalogCrud::new(state.db.clone())
        .find_category(id)
        .await?
        .ok_or(AdminError::NotFound("Category"))?;
    Ok((StatusCode::CREATED, Json(CategoryResponse::new(category, &state.storage))))
}

pub async fn update_category(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
    Path(id): Path<i64>,
    Json(req): Json<CategoryRequest>,
) -> Result<Json<CategoryResponse>> {
    req.validate()?;
    let catalog = CatalogCrud::new(state.db.clone());
    catalog.find_category(id).await?.ok_or(AdminError::NotFound("Category"))?;
    check_parent(&state, req.parent_id, Some(id)).await?;

    let admin = AdminCrud::new(state.db.clone());
    if req.parent_id.is_some() && admin.category_has_children(id).await? {
        return Err(AdminError::NestedSubCategory);
    }
    admin.update_category(id, &req).await?;

    let category = catalog.find_category(id).await?.ok_or(AdminError::NotFound("Category"))?;
    Ok(Json(CategoryResponse::new(category, &state.storage)))
}

pub async fn upload_category_image(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<CategoryResponse>> {
    let catalog = CatalogCrud::new(state.db.clone());
    let existing = catalog.find_category(id).await?.ok_or(AdminError::NotFound("Category"))?;

    let (_, file) = read_image(multipart).await?;
    let path = save_image(&state, CATEGORY_IMAGE_FOLDER, &file).await?;
    AdminCrud::new(state.db.clone()).set_category_image(id, &path).await?;
    if let Some(old) = existing.image.as_deref() {
        state.storage.remove(old).await;
    }

    let category = catalog.find_category(id).await?.ok_or(AdminError::NotFound("Category"))?;
    Ok(Json(CategoryResponse::new(category, &state.storage)))
}

pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    if !AdminCrud::new(state.db.clone()).delete_category(id).await? {
        return Err(AdminError::NotFound("Category"));
    }
    tracing::info!(category_id = id, "category deleted");
    Ok(Json(MessageResponse::new("Category deleted")))
}

// =============================================================================
// PRODUCTS
// =============================================================================

async fn check_product_refs(state: &AppState, req: &ProductRequest) -> Result<()> {
    let sub = CatalogCrud::new(state.db.clone())
        .find_category(req.sub_category_id)
        .await?;
    if !sub.is_some_and(|c| !c.is_main()) {
        return Err(AdminError::NotASubCategory);
    }

    if let Some(supplier_id) = req.supplier_id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let supplier = AccountCrud::new(state.db.clone()).find_by_id(supplier_id).await?;
        if !supplier.is_some_and(|a| a.role == Role::Supplier) {
            return Err(AdminError::UnknownSupplier);
        }
    }
    Ok(())
}

pub async fn create_product(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
    Json(req): Json<ProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>)> {
    req.validate()?;
    check_product_refs(&state, &req).await?;

    let id = AdminCrud::new(state.db.clone())
        .create_product(&req)
        .await
        .map_err(|e| AdminError::unique_or(e, AdminError::SkuTaken))?;
    tracing::info!(product_id = id, sku = %req.sku, "product created");

    Ok((StatusCode::CREATED, Json(product_response(&state, id).await?)))
}

pub async fn update_product(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
    Path(id): Path<i64>,
    Json(req): Json<ProductRequest>,
) -> Result<Json<ProductResponse>> {
    req.validate()?;
    CatalogCrud::new(state.db.clone())
        .find_product(id)
        .await?
        .ok_or(AdminError::NotFound("Product"))?;
    check_product_refs(&state, &req).await?;

    AdminCrud::new(state.db.clone())
        .update_product(id, &req)
        .await
        .map_err(|e| AdminError::unique_or(e, AdminError::SkuTaken))?;

    Ok(Json(product_response(&state, id).await?))
}

pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    if !AdminCrud::new(state.db.clone()).deactivate_product(id).await? {
        return Err(AdminError::NotFound("Product"));
    }
    tracing::info!(product_id = id, "product deactivated");
    Ok(Json(MessageResponse::new("Product deactivated")))
}

pub async fn add_product_image(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<AdminImageResponse>)> {
    CatalogCrud::new(state.db.clone())
        .find_product(id)
        .await?
        .ok_or(AdminError::NotFound("Product"))?;

    let (form, file) = read_image(multipart).await?;
    let is_main = form.flag("is_main").unwrap_or(false);
    let order = form.text("order").and_then(|o| o.parse().ok()).unwrap_or(0);

    let path = save_image(&state, PRODUCT_IMAGE_FOLDER, &file).await?;
    let admin = AdminCrud::new(state.db.clone());
    let image_id = match admin.add_image(id, &path, is_main, order).await {
        Ok(image_id) => image_id,
        Err(e) => {
            state.storage.remove(&path).await;
            return Err(e.into());
        }
    };

    let image = admin
        .find_image(id, image_id)
        .await?
        .ok_or(AdminError::NotFound("Image"))?;
    Ok((StatusCode::CREATED, Json(AdminImageResponse::new(image, &state.storage))))
}

pub async fn delete_product_image(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
    Path((id, image_id)): Path<(i64, i64)>,
) -> Result<Json<MessageResponse>> {
    let admin = AdminCrud::new(state.db.clone());
    let image = admin
        .find_image(id, image_id)
        .await?
        .ok_or(AdminError::NotFound("Image"))?;

    admin.delete_image(image.id).await?;
    state.storage.remove(&image.image).await;
    Ok(Json(MessageResponse::new("Image deleted")))
}

pub async fn add_meterage(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
    Path(id): Path<i64>,
    Json(req): Json<MeterageRequest>,
) -> Result<(StatusCode, Json<AdminMeterageResponse>)> {
    req.validate()?;
    CatalogCrud::new(state.db.clone())
        .find_product(id)
        .await?
        .ok_or(AdminError::NotFound("Product"))?;

    let admin = AdminCrud::new(state.db.clone());
    let meterage_id = admin
        .add_meterage(id, &req)
        .await
        .map_err(|e| AdminError::unique_or(e, AdminError::MeterageExists))?;

    let meterage = admin
        .find_meterage(meterage_id)
        .await?
        .ok_or(AdminError::NotFound("Meterage"))?;
    Ok((StatusCode::CREATED, Json(meterage.into())))
}

pub async fn delete_meterage(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
    Path((id, meterage_id)): Path<(i64, i64)>,
) -> Result<Json<MessageResponse>> {
    if !AdminCrud::new(state.db.clone()).delete_meterage(id, meterage_id).await? {
        return Err(AdminError::NotFound("Meterage"));
    }
    Ok(Json(MessageResponse::new("Meterage deleted")))
}

// =============================================================================
// DELIVERY / PAYMENT METHODS
// =============================================================================

async fn create_method(state: &AppState, kind: MethodKind, req: CreateMethodRequest) -> Result<MethodResponse> {
    req.validate()?;
    let crud = OrderCrud::new(state.db.clone());
    let description = req.description.as_deref().map(str::trim).filter(|d| !d.is_empty());
    let id = crud.create_method(kind, req.name.trim(), description).await?;

    let method = crud.find_method(kind, id).await?.ok_or(AdminError::NotFound("Method"))?;
    Ok(method.into())
}

async fn delete_method(state: &AppState, kind: MethodKind, id: i64) -> Result<Json<MessageResponse>> {
    if !OrderCrud::new(state.db.clone()).delete_method(kind, id).await? {
        return Err(AdminError::NotFound("Method"));
    }
    Ok(Json(MessageResponse::new("Method deleted")))
}

pub async fn create_delivery_method(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
    Json(req): Json<CreateMethodRequest>,
) -> Result<(StatusCode, Json<MethodResponse>)> {
    let method = create_method(&state, MethodKind::Delivery, req).await?;
    Ok((StatusCode::CREATED, Json(method)))
}

pub async fn delete_delivery_method(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    delete_method(&state, MethodKind::Delivery, id).await
}

pub async fn create_payment_method(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
    Json(req): Json<CreateMethodRequest>,
) -> Result<(StatusCode, Json<MethodResponse>)> {
    let method = create_method(&state, MethodKind::Payment, req).await?;
    Ok((StatusCode::CREATED, Json(method)))
}

pub async fn delete_payment_method(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    delete_method(&state, MethodKind::Payment, id).await
}

// =============================================================================
// SITE CONTENT
// =============================================================================

pub async fn update_contact(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
    Json(req): Json<ContactRequest>,
) -> Result<Json<ContactResponse>> {
    req.validate()?;
    let crud = SiteCrud::new(state.db.clone());
    crud.upsert_contact(&req).await?;

    let contact = crud.latest_contact().await?.ok_or(AdminError::NotFound("Contact"))?;
    Ok(Json(contact.into()))
}

pub async fn create_partner(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<PartnerResponse>)> {
    let (_, file) = read_image(multipart).await?;
    let path = save_image(&state, PARTNER_FOLDER, &file).await?;

    let crud = SiteCrud::new(state.db.clone());
    let id = match crud.create_partner(&path).await {
        Ok(id) => id,
        Err(e) => {
            state.storage.remove(&path).await;
            return Err(e.into());
        }
    };

    let partner = crud.find_partner(id).await?.ok_or(AdminError::NotFound("Partner"))?;
    Ok((StatusCode::CREATED, Json(PartnerResponse::new(partner, &state.storage))))
}

pub async fn delete_partner(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    let crud = SiteCrud::new(state.db.clone());
    let partner = crud.find_partner(id).await?.ok_or(AdminError::NotFound("Partner"))?;

    crud.delete_partner(partner.id).await?;
    state.storage.remove(&partner.image).await;
    Ok(Json(MessageResponse::new("Partner deleted")))
}

pub async fn list_requests(
    State(state): State<Arc<AppState>>,
    _staff: StaffUser,
    Query(paging): Query<PageQuery>,
) -> Result<Json<Paginated<InquiryResponse>>> {
    let page = paging.page();
    let (inquiries, count) = SiteCrud::new(state.db.clone()).list_inquiries(page).await?;

    Ok(Json(Paginated::new(
        inquiries
            .into_iter()
            .map(|i| InquiryResponse::new(i, &state.storage))
            .collect(),
        count,
        page,
    )))
}
