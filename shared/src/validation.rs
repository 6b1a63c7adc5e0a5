//! Validation utilities applied once when marketplace records are ingested
//!
//! Every optional field is resolved to its documented default here so the
//! pipeline never re-checks it downstream.

use chrono::NaiveDateTime;

/// Timestamp layout used by the marketplace, e.g. `20230115T103000.000Z`
pub const MARKETPLACE_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S%.fZ";

// ============================================================================
// Timestamps
// ============================================================================

/// Parse a marketplace timestamp
pub fn parse_marketplace_timestamp(value: &str) -> Result<NaiveDateTime, &'static str> {
    NaiveDateTime::parse_from_str(value.trim(), MARKETPLACE_TIMESTAMP_FORMAT)
        .map_err(|_| "Timestamp must look like 20230115T103000.000Z")
}

/// Parse an optional marketplace timestamp; absent or blank means `None`
pub fn parse_optional_timestamp(value: Option<&str>) -> Result<Option<NaiveDateTime>, &'static str> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_marketplace_timestamp(value).map(Some),
    }
}

// ============================================================================
// Quantities and prices
// ============================================================================

/// Resolve an option's available quantity; a missing value defaults to 0
pub fn validate_available_quantity(quantity: Option<i64>) -> Result<u32, &'static str> {
    let quantity = quantity.unwrap_or(0);
    if quantity < 0 {
        return Err("Available quantity cannot be negative");
    }
    u32::try_from(quantity).map_err(|_| "Available quantity is too large")
}

/// Validate the quantity requested by an order item
pub fn validate_item_quantity(quantity: i64) -> Result<u32, &'static str> {
    if quantity < 0 {
        return Err("Item quantity cannot be negative");
    }
    u32::try_from(quantity).map_err(|_| "Item quantity is too large")
}

/// Validate a price expressed in cents
pub fn validate_price_cents(price_cents: i64) -> Result<i64, &'static str> {
    if price_cents < 0 {
        return Err("Price cannot be negative");
    }
    Ok(price_cents)
}

/// Normalize an optional SKU; blank strings count as missing
pub fn normalize_sku(sku: Option<String>) -> Option<String> {
    sku.map(|sku| sku.trim().to_string()).filter(|sku| !sku.is_empty())
}

// ============================================================================
// Addresses
// ============================================================================

/// Validate the region code used as grouping key
pub fn validate_region_code(code: &str) -> Result<(), &'static str> {
    if code.trim().is_empty() {
        return Err("Region code cannot be empty");
    }
    Ok(())
}
