//! Normalization of heterogeneous upstream catalog shapes into
//! [`ProductRecord`]s.
//!
//! Different endpoints of the same commerce platform return products
//! under different keys and with different field names; this module
//! owns the ordered extraction rules so that knowledge lives in one
//! place instead of being scattered through the strategies.

use serde_json::Value;
use snapcart_core::ProductRecord;
use url::Url;

/// Where a response body may keep its product array, tried in order.
/// The first path yielding a non-empty array wins.
const PRODUCT_LIST_PATHS: &[&[&str]] = &[&["payload", "products"], &["products"], &["data"]];

/// Extract the product array from a response body.
pub fn product_list(body: &Value) -> Option<&Vec<Value>> {
    for path in PRODUCT_LIST_PATHS {
        let mut cursor = body;
        for key in *path {
            match cursor.get(key) {
                Some(next) => cursor = next,
                None => {
                    cursor = &Value::Null;
                    break;
                }
            }
        }
        if let Some(items) = cursor.as_array() {
            if !items.is_empty() {
                return Some(items);
            }
        }
    }
    None
}

/// Normalize one upstream product object.
///
/// Field fallbacks follow what the platform actually sends:
/// `product_id` before `id`, `selling_price` before `price`,
/// `description` before `short_description`, and `url` before `handle`
/// before a URL synthesized from the id. Records without a usable name
/// are dropped; they cannot be matched or presented.
pub fn record_from_value(product: &Value, origin: &str) -> Option<ProductRecord> {
    let name = string_field(product, &["name"])?;

    let id = string_field(product, &["product_id", "id"]).unwrap_or_default();

    let price = product
        .get("selling_price")
        .or_else(|| product.get("price"))
        .map(display_price)
        .unwrap_or_else(|| "$0".to_string());

    let description = string_field(product, &["description", "short_description"]).unwrap_or_default();

    let raw_url = string_field(product, &["url", "handle"])
        .unwrap_or_else(|| format!("{origin}/products/{id}"));
    let url = absolute_url(&raw_url, origin)?;

    Some(ProductRecord { name, id, price, description, url })
}

/// Resolve `raw` against the store origin so the result is always
/// absolute: `http...` passes through, `/path` joins the origin, and a
/// bare handle becomes `<origin>/products/<handle>`.
pub fn absolute_url(raw: &str, origin: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return Some(raw.to_string());
    }

    let base = Url::parse(origin).ok()?;
    if raw.starts_with('/') {
        base.join(raw).ok().map(String::from)
    } else {
        base.join(&format!("/products/{raw}")).ok().map(String::from)
    }
}

/// Collapse records with the same name (case-insensitive), keeping the
/// first occurrence. Order is otherwise preserved.
pub fn dedupe_by_name(records: Vec<ProductRecord>) -> Vec<ProductRecord> {
    let mut seen = std::collections::HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.name.to_lowercase()))
        .collect()
}

/// First non-empty string among `keys`.
fn string_field(product: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| product.get(*key))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Coerce a price value (number or string) into a `$`-prefixed string.
fn display_price(price: &Value) -> String {
    match price {
        Value::String(s) if s.trim_start().starts_with('$') => s.trim().to_string(),
        Value::String(s) => format!("${}", s.trim()),
        Value::Number(n) => format!("${n}"),
        _ => "$0".to_string(),
    }
}
