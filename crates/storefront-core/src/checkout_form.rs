//! # Checkout Form
//!
//! Seller-controlled settings of the purchase form and the custom fields it
//! collects from buyers.
//!
//! ## Saving the Form
//! ```text
//! stored form                      submitted update
//! ┌────────────────────────┐       ┌──────────────────────────────────┐
//! │ settings               │       │ user?            (None = keep)   │
//! │ fields: A, B, C        │       │ custom_fields: [ {id: A, ...},   │
//! └────────────────────────┘       │                  {id: None, ...} ]│
//!             │                    └──────────────────────────────────┘
//!             └──────────── CheckoutForm::apply ───────────┘
//!                                  │
//!                                  ▼
//!            fields: A (merged), D (new)   B, C → removed
//! ```
//!
//! Submitted attributes override stored ones; attributes left out of the
//! submission keep their stored value. A stored field whose id is not
//! submitted is deleted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::Seller;
use crate::validation::validate_custom_field;

// =============================================================================
// Settings
// =============================================================================

/// Which products the checkout recommends next to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationType {
    NoRecommendations,
    #[default]
    OwnProducts,
    DirectlyAffiliatedProducts,
    GumroadAffiliatesProducts,
}

impl RecommendationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationType::NoRecommendations => "no_recommendations",
            RecommendationType::OwnProducts => "own_products",
            RecommendationType::DirectlyAffiliatedProducts => "directly_affiliated_products",
            RecommendationType::GumroadAffiliatesProducts => "gumroad_affiliates_products",
        }
    }
}

impl fmt::Display for RecommendationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecommendationType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "no_recommendations" => Ok(RecommendationType::NoRecommendations),
            "own_products" => Ok(RecommendationType::OwnProducts),
            "directly_affiliated_products" => Ok(RecommendationType::DirectlyAffiliatedProducts),
            "gumroad_affiliates_products" => Ok(RecommendationType::GumroadAffiliatesProducts),
            other => Err(ValidationError::InvalidFormat {
                field: "recommendation_type".to_string(),
                reason: format!("unknown value '{other}'"),
            }),
        }
    }
}

/// The seller-level switches of the checkout form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutFormSettings {
    /// Show the discount code field only if a discount is available.
    pub display_offer_code_field: bool,
    pub recommendation_type: RecommendationType,
    pub tipping_enabled: bool,
}

impl Seller {
    /// Current checkout form switches.
    pub fn checkout_settings(&self) -> CheckoutFormSettings {
        CheckoutFormSettings {
            display_offer_code_field: self.display_offer_code_field,
            recommendation_type: self.recommendation_type,
            tipping_enabled: self.tipping_enabled,
        }
    }

    /// Overwrites the checkout form switches.
    pub fn apply_checkout_settings(&mut self, settings: CheckoutFormSettings) {
        self.display_offer_code_field = settings.display_offer_code_field;
        self.recommendation_type = settings.recommendation_type;
        self.tipping_enabled = settings.tipping_enabled;
    }
}

// =============================================================================
// Custom Fields
// =============================================================================

/// Input control a custom field renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CustomFieldType {
    #[default]
    Text,
    Checkbox,
    /// A checkbox accepting terms; the field name is the terms URL.
    Terms,
}

impl CustomFieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomFieldType::Text => "text",
            CustomFieldType::Checkbox => "checkbox",
            CustomFieldType::Terms => "terms",
        }
    }
}

impl FromStr for CustomFieldType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(CustomFieldType::Text),
            "checkbox" => Ok(CustomFieldType::Checkbox),
            "terms" => Ok(CustomFieldType::Terms),
            other => Err(ValidationError::InvalidFormat {
                field: "type".to_string(),
                reason: format!("unknown value '{other}'"),
            }),
        }
    }
}

/// A question the purchase form asks buyers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomField {
    pub id: String,
    pub seller_id: String,

    #[serde(rename = "type")]
    pub field_type: CustomFieldType,

    pub name: String,
    pub required: bool,

    /// Asked on every product of the seller.
    pub global: bool,

    /// Asked once per cart item instead of once per purchase.
    pub collect_per_product: bool,

    /// Products a non-global field is asked on.
    #[serde(rename = "products")]
    pub product_permalinks: Vec<String>,
}

impl CustomField {
    /// Creates an empty, optional text field.
    pub fn new(seller_id: impl Into<String>) -> Self {
        CustomField {
            id: Uuid::new_v4().to_string(),
            seller_id: seller_id.into(),
            field_type: CustomFieldType::Text,
            name: String::new(),
            required: false,
            global: false,
            collect_per_product: false,
            product_permalinks: Vec::new(),
        }
    }

    /// Whether the purchase form for this product asks the field.
    pub fn applies_to(&self, permalink: &str) -> bool {
        self.global || self.product_permalinks.iter().any(|p| p == permalink)
    }
}

/// One custom field as submitted by the form. `id: None` creates a field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomFieldInput {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default, rename = "type")]
    pub field_type: Option<CustomFieldType>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub required: Option<bool>,

    #[serde(default)]
    pub global: Option<bool>,

    #[serde(default)]
    pub collect_per_product: Option<bool>,

    #[serde(default, rename = "products")]
    pub product_permalinks: Option<Vec<String>>,
}

impl CustomFieldInput {
    /// Overlays the submitted attributes on `base`.
    pub fn apply_to(&self, mut base: CustomField) -> CustomField {
        if let Some(field_type) = self.field_type {
            base.field_type = field_type;
        }
        if let Some(name) = &self.name {
            base.name = name.clone();
        }
        if let Some(required) = self.required {
            base.required = required;
        }
        if let Some(global) = self.global {
            base.global = global;
        }
        if let Some(per_product) = self.collect_per_product {
            base.collect_per_product = per_product;
        }
        if let Some(permalinks) = &self.product_permalinks {
            base.product_permalinks = permalinks.clone();
        }
        base
    }
}

// =============================================================================
// Form
// =============================================================================

/// A submitted checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutFormUpdate {
    /// `None` leaves the seller switches untouched.
    #[serde(default)]
    pub user: Option<CheckoutFormSettings>,

    #[serde(default)]
    pub custom_fields: Vec<CustomFieldInput>,
}

/// The seller's checkout form as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutForm {
    pub settings: CheckoutFormSettings,
    pub custom_fields: Vec<CustomField>,
}

impl CheckoutForm {
    /// Computes the form after saving `update`.
    ///
    /// Every resulting field is validated. Submitted ids must name stored
    /// fields of this form.
    pub fn apply(&self, seller_id: &str, update: &CheckoutFormUpdate) -> CoreResult<CheckoutForm> {
        let settings = update.user.unwrap_or(self.settings);

        let mut custom_fields = Vec::with_capacity(update.custom_fields.len());
        for input in &update.custom_fields {
            let base = match &input.id {
                Some(id) => self
                    .custom_fields
                    .iter()
                    .find(|f| &f.id == id)
                    .cloned()
                    .ok_or_else(|| CoreError::CustomFieldNotFound(id.clone()))?,
                None => CustomField::new(seller_id),
            };

            let field = input.apply_to(base);
            validate_custom_field(&field)?;
            custom_fields.push(field);
        }

        Ok(CheckoutForm {
            settings,
            custom_fields,
        })
    }

    /// Ids of stored fields that `next` no longer contains.
    pub fn removed_field_ids<'a>(&'a self, next: &CheckoutForm) -> Vec<&'a str> {
        self.custom_fields
            .iter()
            .filter(|f| !next.custom_fields.iter().any(|n| n.id == f.id))
            .map(|f| f.id.as_str())
            .collect()
    }

    /// Fields the purchase form for this product asks, in form order.
    pub fn fields_for<'a>(&'a self, permalink: &'a str) -> impl Iterator<Item = &'a CustomField> + 'a {
        self.custom_fields.iter().filter(move |f| f.applies_to(permalink))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
