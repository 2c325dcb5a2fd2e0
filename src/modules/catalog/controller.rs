use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::{
    crud::CatalogCrud,
    interface::{CatalogError, Result},
    model::ProductRow,
    schema::{
        CategoryQuery, CategoryRef, FavouriteResponse, FilterDataResponse, MainCategoryResponse, PriceRange,
        ProductQuery, ProductResponse, SimilarQuery, SubCategoryRef,
    },
};
use crate::services::auth::{AuthUser, MaybeAuthUser};
use crate::services::pagination::{PageQuery, Paginated};
use crate::services::response::MessageResponse;
use crate::AppState;

/// Attaches images, meterages and the caller's favourite flag to each row, keeping order.
pub(crate) async fn hydrate(state: &AppState, rows: Vec<ProductRow>, viewer: Option<&str>) -> Result<Vec<ProductResponse>> {
    let crud = CatalogCrud::new(state.db.clone());
    let ids: Vec<i64> = rows.iter().map(|r| r.product.id).collect();

    let mut images: HashMap<i64, Vec<_>> = HashMap::new();
    for image in crud.images_for(&ids).await? {
        images.entry(image.product_id).or_default().push(image);
    }
    let mut meterages: HashMap<i64, Vec<_>> = HashMap::new();
    for meterage in crud.meterages_for(&ids).await? {
        meterages.entry(meterage.product_id).or_default().push(meterage);
    }
    let favourites = match viewer {
        Some(account_id) => crud.favourite_ids(account_id, &ids).await?,
        None => Default::default(),
    };

    Ok(rows
        .into_iter()
        .map(|row| {
            let id = row.product.id;
            ProductResponse::new(
                row,
                images.remove(&id).unwrap_or_default(),
                meterages.remove(&id).unwrap_or_default(),
                favourites.contains(&id),
                &state.storage,
            )
        })
        .collect())
}

fn viewer_id(user: &MaybeAuthUser) -> Option<&str> {
    user.0.as_ref().map(|u| u.id.as_str())
}

pub async fn main_categories(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<Vec<MainCategoryResponse>>> {
    let tree = CatalogCrud::new(state.db.clone())
        .main_categories(&query.parse())
        .await?;

    Ok(Json(
        tree.into_iter()
            .map(|(main, subs)| MainCategoryResponse::new(main, subs, &state.storage))
            .collect(),
    ))
}

pub async fn list_products(
    State(state): State<Arc<AppState>>,
    user: MaybeAuthUser,
    Query(query): Query<ProductQuery>,
    Query(paging): Query<PageQuery>,
) -> Result<Json<Paginated<ProductResponse>>> {
    let page = paging.page();
    let (rows, count) = CatalogCrud::new(state.db.clone())
        .list_products(&query.parse(), page)
        .await?;

    let results = hydrate(&state, rows, viewer_id(&user)).await?;
    Ok(Json(Paginated::new(results, count, page)))
}

pub async fn filter_data(State(state): State<Arc<AppState>>) -> Result<Json<FilterDataResponse>> {
    let crud = CatalogCrud::new(state.db.clone());

    let (mut main_categories, mut sub_categories) = (Vec::new(), Vec::new());
    for category in crud.all_categories().await? {
        match category.parent_id {
            None => main_categories.push(CategoryRef {
                id: category.id,
                name: category.name,
            }),
            Some(parent_id) => sub_categories.push(SubCategoryRef {
                id: category.id,
                name: category.name,
                parent_id: Some(parent_id),
            }),
        }
    }
    let (min, max) = crud.price_range().await?;

    Ok(Json(FilterDataResponse {
        manufacturers: crud.distinct_text("manufacturer").await?,
        conductor_materials: crud.distinct_text("conductor_material").await?,
        number_of_cores: crud.distinct_cores().await?,
        main_categories,
        sub_categories,
        cable_cross_sections: crud.distinct_cross_sections().await?,
        outer_insulation_materials: crud.distinct_text("outer_insulation_material").await?,
        conductor_insulation_materials: crud.distinct_text("conductor_insulation_material").await?,
        outer_sheath_materials: crud.distinct_text("outer_sheath_material").await?,
        colors: crud.distinct_text("color").await?,
        model_versions: crud.distinct_text("model_version").await?,
        price_range: PriceRange { min, max },
    }))
}

pub async fn get_product(
    State(state): State<Arc<AppState>>,
    user: MaybeAuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ProductResponse>> {
    let row = CatalogCrud::new(state.db.clone())
        .find_active_product(id)
        .await?
        .ok_or(CatalogError::ProductNotFound)?;

    let mut products = hydrate(&state, vec![row], viewer_id(&user)).await?;
    products.pop().map(Json).ok_or(CatalogError::ProductNotFound)
}

pub async fn similar_products(
    State(state): State<Arc<AppState>>,
    user: MaybeAuthUser,
    Path(id): Path<i64>,
    Query(query): Query<SimilarQuery>,
) -> Result<Json<Vec<ProductResponse>>> {
    let crud = CatalogCrud::new(state.db.clone());
    let row = crud.find_active_product(id).await?.ok_or(CatalogError::ProductNotFound)?;

    let similar = crud.similar_products(&row, query.limit()).await?;
    Ok(Json(hydrate(&state, similar, viewer_id(&user)).await?))
}

// =============================================================================
// FAVOURITES
// =============================================================================

pub async fn add_favourite(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<FavouriteResponse>)> {
    let crud = CatalogCrud::new(state.db.clone());
    crud.find_active_product(id).await?.ok_or(CatalogError::ProductNotFound)?;

    if crud.add_favourite(&user.id, id).await? {
        tracing::debug!(account_id = %user.id, product_id = id, "favourite added");
        Ok((
            StatusCode::CREATED,
            Json(FavouriteResponse {
                message: "Product added to favourites",
                product_id: id,
            }),
        ))
    } else {
        Ok((
            StatusCode::OK,
            Json(FavouriteResponse {
                message: "Product is already in favourites",
                product_id: id,
            }),
        ))
    }
}

pub async fn remove_favourite(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    if !CatalogCrud::new(state.db.clone()).remove_favourite(&user.id, id).await? {
        return Err(CatalogError::NotFavourite);
    }
    Ok(Json(MessageResponse::new("Product removed from favourites")))
}

pub async fn list_favourites(State(state): State<Arc<AppState>>, user: AuthUser) -> Result<Json<Vec<ProductResponse>>> {
    let rows = CatalogCrud::new(state.db.clone()).favourite_products(&user.id).await?;
    Ok(Json(hydrate(&state, rows, Some(&user.id)).await?))
}
