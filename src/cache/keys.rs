//! Cache key builders for the catalog, wardrobe and analytics read paths.
//!
//! The cache compares keys by string equality only. Every distinct combination
//! of query parameters gets its own key here, and mutations list the keys they
//! invalidate.

use std::fmt::Display;

pub fn products_page(page: u32, limit: u32) -> String {
    format!("products_page{}_limit{}", page, limit)
}

pub fn product(variant_id: impl Display) -> String {
    format!("product_{}", variant_id)
}

pub fn product_reviews(variant_id: impl Display) -> String {
    format!("product_reviews_{}", variant_id)
}

pub fn top_rated_products(limit: u32, min_reviews: u32) -> String {
    format!("top_rated_products_limit{}_minReviews{}", limit, min_reviews)
}

pub fn recommendations_customer(customer_id: impl Display, limit: u32) -> String {
    format!("recommendations_customer_{}_limit_{}", customer_id, limit)
}

pub fn trending_products(days: u32, limit: u32) -> String {
    format!("trending_products_days_{}_limit_{}", days, limit)
}

pub fn similar_products(variant_id: impl Display, limit: u32) -> String {
    format!("similar_products_{}_limit_{}", variant_id, limit)
}

/// Site-wide page view analytics; the aggregation takes no parameters.
pub const PAGE_VIEW_ANALYTICS: &str = "page_view_analytics";

pub fn style_images(style: impl Display) -> String {
    format!("style_images_{}", style)
}

pub const ALL_STYLES_WITH_IMAGES_AND_DESCRIPTIONS: &str = "all_styles_with_images_and_descriptions";

pub fn wardrobe_user(user_id: impl Display) -> String {
    format!("wardrobe_user_{}", user_id)
}

pub fn wardrobe_summary_user(user_id: impl Display) -> String {
    format!("wardrobe_summary_user_{}", user_id)
}

/// Items of one type across all users.
pub fn wardrobe_type(item_type: impl Display) -> String {
    format!("wardrobe_type_{}", item_type)
}

/// Items of one type filtered to a single user.
pub fn wardrobe_type_for_user(item_type: impl Display, user_id: impl Display) -> String {
    format!("wardrobe_type_{}_user_{}", item_type, user_id)
}

/// Keys whose cached value depends on a wardrobe item.
///
/// Pass the item's type before and after an update when it changed, so both
/// the global and the per-user listings of each type are dropped.
pub fn wardrobe_item_keys<U, I>(user_id: U, item_types: &[I]) -> Vec<String>
where
    U: Display,
    I: Display,
{
    let mut keys = vec![wardrobe_user(&user_id), wardrobe_summary_user(&user_id)];
    for item_type in item_types {
        keys.push(wardrobe_type(item_type));
        keys.push(wardrobe_type_for_user(item_type, &user_id));
    }
    keys
}
