//! HTTP handlers for the Offers API

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    AssetUrls, AuthUser, MaybeAuthUser, ObjectIdPath, ValidatedJson,
    errors::responses::{
        BadRequestResponse, ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
        UnauthorizedResponse, ValidationErrorResponse,
    },
};
use domain_comments::{CommentRepository, CommentResponse, CommentService};
use domain_users::{UserError, UserRepository, UserService};
use mongodb::bson::oid::ObjectId;
use std::str::FromStr;
use std::sync::Arc;
use strum::VariantNames;
use utoipa::OpenApi;

use crate::error::{OfferError, OfferResult};
use crate::models::{
    Amenity, City, Coordinates, CreateOffer, HousingType, Offer, OfferListQuery, OfferResponse,
    UpdateOffer,
};
use crate::repository::OfferRepository;
use crate::service::OfferService;

/// Routes served by [`router`], relative to its mount point
pub const ROUTES: &[(&str, &str)] = &[
    ("GET", "/"),
    ("POST", "/"),
    ("GET", "/users/favorite"),
    ("GET", "/premium/{city}"),
    ("GET", "/{offer_id}"),
    ("PATCH", "/{offer_id}"),
    ("DELETE", "/{offer_id}"),
    ("GET", "/{offer_id}/comments"),
    ("POST", "/{offer_id}/favorite"),
    ("DELETE", "/{offer_id}/favorite"),
];

/// OpenAPI documentation for Offers API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_offers,
        create_offer,
        list_favorites,
        list_premium,
        get_offer,
        update_offer,
        delete_offer,
        list_comments,
        add_favorite,
        remove_favorite
    ),
    components(
        schemas(
            CreateOffer,
            UpdateOffer,
            OfferResponse,
            Coordinates,
            City,
            HousingType,
            Amenity,
            CommentResponse
        ),
        responses(
            ValidationErrorResponse,
            BadRequestResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            NotFoundResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Offers", description = "Rental offers, favorites and premium listings")
    )
)]
pub struct ApiDoc;

/// Everything the offer handlers need
pub struct OffersState<O, C, U>
where
    O: OfferRepository,
    C: CommentRepository,
    U: UserRepository,
{
    pub offers: OfferService<O>,
    pub comments: CommentService<C>,
    pub users: UserService<U>,
    pub assets: AssetUrls,
}

type SharedState<O, C, U> = Arc<OffersState<O, C, U>>;

impl<O, C, U> OffersState<O, C, U>
where
    O: OfferRepository,
    C: CommentRepository,
    U: UserRepository,
{
    /// Favorites of the viewer; anonymous viewers and unknown users have none
    async fn viewer_favorites(&self, viewer: Option<ObjectId>) -> OfferResult<Vec<ObjectId>> {
        let Some(user_id) = viewer else {
            return Ok(Vec::new());
        };
        match self.users.favorite_ids(user_id).await {
            Ok(ids) => Ok(ids),
            Err(UserError::NotFound(_)) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn present(&self, offers: &[Offer], favorites: &[ObjectId]) -> Vec<OfferResponse> {
        offers
            .iter()
            .map(|o| OfferResponse::new(o, favorites.contains(&o.id), &self.assets))
            .collect()
    }
}

/// Create the offers router with all HTTP endpoints
pub fn router<O, C, U>(state: OffersState<O, C, U>) -> Router
where
    O: OfferRepository + 'static,
    C: CommentRepository + 'static,
    U: UserRepository + 'static,
{
    Router::new()
        .route("/", get(list_offers).post(create_offer))
        .route("/users/favorite", get(list_favorites))
        .route("/premium/{city}", get(list_premium))
        .route(
            "/{offer_id}",
            get(get_offer).patch(update_offer).delete(delete_offer),
        )
        .route("/{offer_id}/comments", get(list_comments))
        .route(
            "/{offer_id}/favorite",
            post(add_favorite).delete(remove_favorite),
        )
        .with_state(Arc::new(state))
}

/// List the newest offers
#[utoipa::path(
    get,
    path = "",
    tag = "Offers",
    params(OfferListQuery),
    responses(
        (status = 200, description = "Newest offers", body = Vec<OfferResponse>),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_offers<O, C, U>(
    State(state): State<SharedState<O, C, U>>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    query: Result<Query<OfferListQuery>, QueryRejection>,
) -> OfferResult<Json<Vec<OfferResponse>>>
where
    O: OfferRepository,
    C: CommentRepository,
    U: UserRepository,
{
    let Query(query) = query.map_err(|e| OfferError::BadRequest(e.body_text()))?;

    let offers = state.offers.find(query.limit()).await?;
    let favorites = state.viewer_favorites(viewer.map(|v| v.id)).await?;
    Ok(Json(state.present(&offers, &favorites)))
}

/// Publish a new offer
#[utoipa::path(
    post,
    path = "",
    tag = "Offers",
    security(("bearer_auth" = [])),
    request_body = CreateOffer,
    responses(
        (status = 201, description = "Offer created", body = OfferResponse),
        (status = 400, response = ValidationErrorResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_offer<O, C, U>(
    State(state): State<SharedState<O, C, U>>,
    AuthUser(identity): AuthUser,
    ValidatedJson(input): ValidatedJson<CreateOffer>,
) -> OfferResult<impl IntoResponse>
where
    O: OfferRepository,
    C: CommentRepository,
    U: UserRepository,
{
    let offer = state
        .offers
        .create(identity.id, input.into_new_offer()?)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(OfferResponse::new(&offer, false, &state.assets)),
    ))
}

/// Offers the caller marked as favorite
#[utoipa::path(
    get,
    path = "/users/favorite",
    tag = "Offers",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Favorite offers", body = Vec<OfferResponse>),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_favorites<O, C, U>(
    State(state): State<SharedState<O, C, U>>,
    AuthUser(identity): AuthUser,
) -> OfferResult<Json<Vec<OfferResponse>>>
where
    O: OfferRepository,
    C: CommentRepository,
    U: UserRepository,
{
    let ids = state.users.favorite_ids(identity.id).await?;
    let offers = state.offers.find_by_ids(ids).await?;

    let responses = offers
        .iter()
        .map(|o| OfferResponse::new(o, true, &state.assets))
        .collect();
    Ok(Json(responses))
}

/// Newest premium offers of a city
#[utoipa::path(
    get,
    path = "/premium/{city}",
    tag = "Offers",
    params(("city" = City, Path, description = "City name")),
    responses(
        (status = 200, description = "At most three premium offers", body = Vec<OfferResponse>),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_premium<O, C, U>(
    State(state): State<SharedState<O, C, U>>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(city): Path<String>,
) -> OfferResult<Json<Vec<OfferResponse>>>
where
    O: OfferRepository,
    C: CommentRepository,
    U: UserRepository,
{
    let city = City::from_str(&city).map_err(|_| {
        OfferError::BadRequest(format!("city must be one of: {}", City::VARIANTS.join(", ")))
    })?;

    let offers = state.offers.find_premium_by_city(city).await?;
    let favorites = state.viewer_favorites(viewer.map(|v| v.id)).await?;
    Ok(Json(state.present(&offers, &favorites)))
}

/// Get one offer
#[utoipa::path(
    get,
    path = "/{offer_id}",
    tag = "Offers",
    params(("offer_id" = String, Path, description = "Offer ObjectId")),
    responses(
        (status = 200, description = "Offer found", body = OfferResponse),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_offer<O, C, U>(
    State(state): State<SharedState<O, C, U>>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    ObjectIdPath(offer_id): ObjectIdPath,
) -> OfferResult<Json<OfferResponse>>
where
    O: OfferRepository,
    C: CommentRepository,
    U: UserRepository,
{
    let offer = state.offers.find_by_id(offer_id).await?;
    let favorites = state.viewer_favorites(viewer.map(|v| v.id)).await?;

    Ok(Json(OfferResponse::new(
        &offer,
        favorites.contains(&offer.id),
        &state.assets,
    )))
}

/// Change an offer; only its author may do so
#[utoipa::path(
    patch,
    path = "/{offer_id}",
    tag = "Offers",
    security(("bearer_auth" = [])),
    params(("offer_id" = String, Path, description = "Offer ObjectId")),
    request_body = UpdateOffer,
    responses(
        (status = 200, description = "Offer updated", body = OfferResponse),
        (status = 400, response = ValidationErrorResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_offer<O, C, U>(
    State(state): State<SharedState<O, C, U>>,
    AuthUser(identity): AuthUser,
    ObjectIdPath(offer_id): ObjectIdPath,
    ValidatedJson(input): ValidatedJson<UpdateOffer>,
) -> OfferResult<Json<OfferResponse>>
where
    O: OfferRepository,
    C: CommentRepository,
    U: UserRepository,
{
    state.offers.find_owned(offer_id, identity.id).await?;

    let offer = state
        .offers
        .update_by_id(offer_id, input.into_patch()?)
        .await?;
    let favorites = state.viewer_favorites(Some(identity.id)).await?;

    Ok(Json(OfferResponse::new(
        &offer,
        favorites.contains(&offer.id),
        &state.assets,
    )))
}

/// Delete an offer together with its comments; only its author may do so
#[utoipa::path(
    delete,
    path = "/{offer_id}",
    tag = "Offers",
    security(("bearer_auth" = [])),
    params(("offer_id" = String, Path, description = "Offer ObjectId")),
    responses(
        (status = 204, description = "Offer deleted"),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_offer<O, C, U>(
    State(state): State<SharedState<O, C, U>>,
    AuthUser(identity): AuthUser,
    ObjectIdPath(offer_id): ObjectIdPath,
) -> OfferResult<StatusCode>
where
    O: OfferRepository,
    C: CommentRepository,
    U: UserRepository,
{
    state.offers.find_owned(offer_id, identity.id).await?;
    state.offers.delete_by_id(offer_id).await?;

    // Two independent writes: a failure here leaves the comments orphaned
    match state.comments.delete_by_offer_id(offer_id).await {
        Ok(removed) => {
            tracing::info!(offer_id = %offer_id, removed, "Offer comments deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        Err(e) => {
            tracing::error!(offer_id = %offer_id, error = %e, "Offer deleted but its comments were not");
            Err(e.into())
        }
    }
}

/// Comments of an offer, newest first
#[utoipa::path(
    get,
    path = "/{offer_id}/comments",
    tag = "Offers",
    params(("offer_id" = String, Path, description = "Offer ObjectId")),
    responses(
        (status = 200, description = "At most 50 comments", body = Vec<CommentResponse>),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_comments<O, C, U>(
    State(state): State<SharedState<O, C, U>>,
    ObjectIdPath(offer_id): ObjectIdPath,
) -> OfferResult<Json<Vec<CommentResponse>>>
where
    O: OfferRepository,
    C: CommentRepository,
    U: UserRepository,
{
    if !state.offers.exists(offer_id).await? {
        return Err(OfferError::NotFound(offer_id));
    }

    let comments = state.comments.find_by_offer_id(offer_id).await?;
    Ok(Json(comments.iter().map(CommentResponse::from).collect()))
}

/// Add an offer to the caller's favorites
#[utoipa::path(
    post,
    path = "/{offer_id}/favorite",
    tag = "Offers",
    security(("bearer_auth" = [])),
    params(("offer_id" = String, Path, description = "Offer ObjectId")),
    responses(
        (status = 200, description = "Offer is a favorite", body = OfferResponse),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn add_favorite<O, C, U>(
    State(state): State<SharedState<O, C, U>>,
    AuthUser(identity): AuthUser,
    ObjectIdPath(offer_id): ObjectIdPath,
) -> OfferResult<Json<OfferResponse>>
where
    O: OfferRepository,
    C: CommentRepository,
    U: UserRepository,
{
    let offer = state.offers.find_by_id(offer_id).await?;
    state.users.add_favorite(identity.id, offer_id).await?;

    Ok(Json(OfferResponse::new(&offer, true, &state.assets)))
}

/// Remove an offer from the caller's favorites
#[utoipa::path(
    delete,
    path = "/{offer_id}/favorite",
    tag = "Offers",
    security(("bearer_auth" = [])),
    params(("offer_id" = String, Path, description = "Offer ObjectId")),
    responses(
        (status = 200, description = "Offer is no longer a favorite", body = OfferResponse),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn remove_favorite<O, C, U>(
    State(state): State<SharedState<O, C, U>>,
    AuthUser(identity): AuthUser,
    ObjectIdPath(offer_id): ObjectIdPath,
) -> OfferResult<Json<OfferResponse>>
where
    O: OfferRepository,
    C: CommentRepository,
    U: UserRepository,
{
    let offer = state.offers.find_by_id(offer_id).await?;
    state.users.remove_favorite(identity.id, offer_id).await?;

    Ok(Json(OfferResponse::new(&offer, false, &state.assets)))
}
