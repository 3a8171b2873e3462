//! Discount and reset endpoints.
//!
//! Each endpoint is a thin adapter: it validates the body, builds a
//! [`DiscountRequest`], and hands it to the engine. Validation failures
//! answer 400 before any catalog call; remote failures answer 500 with the
//! count reached so far in the message.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{FromRequest, Request, State},
    http::StatusCode,
    routing::post,
};
use bulk_discount_core::{
    DiscountRequest, MutationResult, PriceAction, Selection, TagFilter, TagMatch,
};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::instrument;

use crate::{
    error::AppError,
    middleware::{RequireShopSession, ShopSession},
    state::AppState,
};

/// Build the discounts router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/discountAllProductsExceptBundles",
            post(discount_all_products_except_bundles),
        )
        .route(
            "/api/resetPriceAllProductsExceptBundles",
            post(reset_all_products_except_bundles),
        )
        .route("/api/discountAllBundles", post(discount_all_bundles))
        .route("/api/resetPriceAllBundles", post(reset_all_bundles))
        .route(
            "/api/discountAllProductsExceptTags",
            post(discount_all_products_except_tags),
        )
        .route(
            "/api/resetPriceAllProductsExceptTags",
            post(reset_all_products_except_tags),
        )
        .route("/api/discountTags", post(discount_tags))
        .route("/api/resetDiscountTags", post(reset_tags))
        .route("/api/discountProduct", post(discount_product))
        .route("/api/resetDiscountProduct", post(reset_product))
}

/// Request body shared by all discount endpoints.
///
/// Endpoints read only the fields they need; reset endpoints ignore
/// `discount`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiscountBody {
    /// Percentage off, 0-100. Accepts a JSON number or a numeric string.
    #[serde(deserialize_with = "lenient_percent")]
    pub discount: Option<f64>,
    /// Comma-separated tags.
    pub tags: Option<String>,
    /// Match every tag instead of any.
    pub include_all: bool,
    /// Exact product title.
    pub product_name: Option<String>,
}

impl DiscountBody {
    fn discount_action(&self) -> Result<PriceAction, AppError> {
        Ok(PriceAction::discount_from_f64(self.discount)?)
    }

    fn tag_filter(&self) -> Result<TagFilter, AppError> {
        let mode = TagMatch::from_match_all(self.include_all);
        Ok(TagFilter::parse(self.tags.as_deref().unwrap_or_default(), mode)?)
    }

    fn exact_title(&self) -> Result<Selection, AppError> {
        Ok(Selection::exact_title(
            self.product_name.as_deref().unwrap_or_default(),
        )?)
    }
}

/// JSON body extractor that answers rejections with the error envelope.
///
/// An empty body reads as `{}`, so reset endpoints accept a bare POST. The
/// content type is not checked.
#[derive(Debug)]
pub struct DiscountJson(pub DiscountBody);

impl<S> FromRequest<S> for DiscountJson
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        parse_body(&bytes).map(Self)
    }
}

fn parse_body(bytes: &[u8]) -> Result<DiscountBody, AppError> {
    if bytes.trim_ascii().is_empty() {
        return Ok(DiscountBody::default());
    }
    serde_json::from_slice(bytes)
        .map_err(|e| AppError::Validation(format!("Invalid request body: {e}")))
}

fn lenient_percent<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Percent {
        Number(f64),
        Text(String),
        Other(serde_json::Value),
    }

    Ok(match Option::<Percent>::deserialize(deserializer)? {
        Some(Percent::Number(n)) => Some(n),
        // Unparseable text validates as NaN ("Discount must be a number")
        Some(Percent::Text(s)) if s.trim().is_empty() => None,
        Some(Percent::Text(s)) => Some(s.trim().parse().unwrap_or(f64::NAN)),
        Some(Percent::Other(_)) => Some(f64::NAN),
        None => None,
    })
}

/// Response body of every discount endpoint.
#[derive(Debug, Serialize)]
pub struct DiscountResponse {
    pub success: bool,
    pub error: Option<String>,
    pub message: String,
}

impl From<MutationResult> for DiscountResponse {
    fn from(result: MutationResult) -> Self {
        Self {
            success: result.success,
            error: result.error,
            message: result.message,
        }
    }
}

type DiscountReply = Result<(StatusCode, Json<DiscountResponse>), AppError>;

async fn execute(state: &AppState, session: &ShopSession, request: DiscountRequest) -> DiscountReply {
    tracing::info!(
        shop = %session.shop,
        selection = request.selection.label(),
        action = %request.action,
        "Discount run requested"
    );

    let result = state.engine().run(&request).await;
    let status = if result.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    Ok((status, Json(result.into())))
}

/// Discount every product not tagged "Bundle".
///
/// # Errors
///
/// Returns `AppError::Validation` if the discount is missing or out of range.
#[instrument(skip_all)]
pub async fn discount_all_products_except_bundles(
    RequireShopSession(session): RequireShopSession,
    State(state): State<AppState>,
    DiscountJson(body): DiscountJson,
) -> DiscountReply {
    let request = DiscountRequest::new(Selection::AllExceptBundles, body.discount_action()?);
    execute(&state, &session, request).await
}

/// Reset every product not tagged "Bundle".
///
/// # Errors
///
/// Never fails validation; the body is ignored.
#[instrument(skip_all)]
pub async fn reset_all_products_except_bundles(
    RequireShopSession(session): RequireShopSession,
    State(state): State<AppState>,
    DiscountJson(_body): DiscountJson,
) -> DiscountReply {
    let request = DiscountRequest::new(Selection::AllExceptBundles, PriceAction::Reset);
    execute(&state, &session, request).await
}

/// Discount every product tagged "Bundle".
///
/// # Errors
///
/// Returns `AppError::Validation` if the discount is missing or out of range.
#[instrument(skip_all)]
pub async fn discount_all_bundles(
    RequireShopSession(session): RequireShopSession,
    State(state): State<AppState>,
    DiscountJson(body): DiscountJson,
) -> DiscountReply {
    let request = DiscountRequest::new(Selection::Bundles, body.discount_action()?);
    execute(&state, &session, request).await
}

/// Reset every product tagged "Bundle".
///
/// # Errors
///
/// Never fails validation; the body is ignored.
#[instrument(skip_all)]
pub async fn reset_all_bundles(
    RequireShopSession(session): RequireShopSession,
    State(state): State<AppState>,
    DiscountJson(_body): DiscountJson,
) -> DiscountReply {
    let request = DiscountRequest::new(Selection::Bundles, PriceAction::Reset);
    execute(&state, &session, request).await
}

/// Discount every product that does not match the tag filter.
///
/// # Errors
///
/// Returns `AppError::Validation` for a bad discount or an empty tag list.
#[instrument(skip_all)]
pub async fn discount_all_products_except_tags(
    RequireShopSession(session): RequireShopSession,
    State(state): State<AppState>,
    DiscountJson(body): DiscountJson,
) -> DiscountReply {
    let action = body.discount_action()?;
    let selection = Selection::ExcludeTags(body.tag_filter()?);
    execute(&state, &session, DiscountRequest::new(selection, action)).await
}

/// Reset every product that does not match the tag filter.
///
/// # Errors
///
/// Returns `AppError::Validation` for an empty tag list.
#[instrument(skip_all)]
pub async fn reset_all_products_except_tags(
    RequireShopSession(session): RequireShopSession,
    State(state): State<AppState>,
    DiscountJson(body): DiscountJson,
) -> DiscountReply {
    let selection = Selection::ExcludeTags(body.tag_filter()?);
    execute(&state, &session, DiscountRequest::new(selection, PriceAction::Reset)).await
}

/// Discount every product that matches the tag filter.
///
/// # Errors
///
/// Returns `AppError::Validation` for a bad discount or an empty tag list.
#[instrument(skip_all)]
pub async fn discount_tags(
    RequireShopSession(session): RequireShopSession,
    State(state): State<AppState>,
    DiscountJson(body): DiscountJson,
) -> DiscountReply {
    let action = body.discount_action()?;
    let selection = Selection::IncludeTags(body.tag_filter()?);
    execute(&state, &session, DiscountRequest::new(selection, action)).await
}

/// Reset every product that matches the tag filter.
///
/// # Errors
///
/// Returns `AppError::Validation` for an empty tag list.
#[instrument(skip_all)]
pub async fn reset_tags(
    RequireShopSession(session): RequireShopSession,
    State(state): State<AppState>,
    DiscountJson(body): DiscountJson,
) -> DiscountReply {
    let selection = Selection::IncludeTags(body.tag_filter()?);
    execute(&state, &session, DiscountRequest::new(selection, PriceAction::Reset)).await
}

/// Discount the variants of products titled exactly `productName`.
///
/// # Errors
///
/// Returns `AppError::Validation` for a bad discount or an empty name.
#[instrument(skip_all)]
pub async fn discount_product(
    RequireShopSession(session): RequireShopSession,
    State(state): State<AppState>,
    DiscountJson(body): DiscountJson,
) -> DiscountReply {
    let action = body.discount_action()?;
    let selection = body.exact_title()?;
    execute(&state, &session, DiscountRequest::new(selection, action)).await
}

/// Reset the variants of products titled exactly `productName`.
///
/// # Errors
///
/// Returns `AppError::Validation` for an empty name.
#[instrument(skip_all)]
pub async fn reset_product(
    RequireShopSession(session): RequireShopSession,
    State(state): State<AppState>,
    DiscountJson(body): DiscountJson,
) -> DiscountReply {
    let selection = body.exact_title()?;
    execute(&state, &session, DiscountRequest::new(selection, PriceAction::Reset)).await
}
