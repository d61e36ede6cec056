use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::patch::Patch;
use crate::errors::ServiceError;

/// Physical condition of an item, stored with the household's own labels.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum Condition {
    #[serde(rename = "Neuf")]
    #[strum(serialize = "Neuf")]
    New,
    #[serde(rename = "Bon état")]
    #[strum(serialize = "Bon état")]
    Good,
    #[serde(rename = "Usage normal")]
    #[strum(serialize = "Usage normal")]
    NormalUse,
    #[serde(rename = "À remplacer")]
    #[strum(serialize = "À remplacer")]
    NeedsReplacement,
}

/// Read-model copy of a stored inventory item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub quantity: u32,
    pub category: String,
    pub location: String,
    pub condition: Option<Condition>,
    pub notes: Option<String>,
    pub purchase_link: Option<String>,
    #[serde(default)]
    pub stock_management_enabled: bool,
    pub min_stock: Option<u32>,
    pub optimal_stock: Option<u32>,
    pub created_at: DateTime<Utc>,
}

/// Validated payload for a new item, ready to hand to the document store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub quantity: u32,
    pub category: String,
    pub location: String,
    pub condition: Option<Condition>,
    pub notes: Option<String>,
    pub purchase_link: Option<String>,
    pub stock: StockSettings,
}

impl NewItem {
    pub fn into_item(self, id: Uuid, created_at: DateTime<Utc>) -> Item {
        Item {
            id,
            name: self.name,
            quantity: self.quantity,
            category: self.category,
            location: self.location,
            condition: self.condition,
            notes: self.notes,
            purchase_link: self.purchase_link,
            stock_management_enabled: self.stock.enabled,
            min_stock: self.stock.min_stock,
            optimal_stock: self.stock.optimal_stock,
            created_at,
        }
    }
}

/// Stock-management flag plus thresholds.
///
/// Thresholds only exist while stock management is enabled; `new` drops
/// them otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StockSettings {
    pub enabled: bool,
    pub min_stock: Option<u32>,
    pub optimal_stock: Option<u32>,
}

impl StockSettings {
    pub fn new(enabled: bool, min_stock: Option<u32>, optimal_stock: Option<u32>) -> Self {
        if enabled {
            Self {
                enabled,
                min_stock,
                optimal_stock,
            }
        } else {
            Self::default()
        }
    }
}

/// Partial update of an item.
///
/// Required fields use `Option` (None keeps the stored value); optional
/// fields use [`Patch`] so that "leave alone" and "remove" are distinct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub quantity: Option<u32>,
    pub category: Option<String>,
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    pub condition: Patch<Condition>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    pub notes: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    pub purchase_link: Patch<String>,
    pub stock_management_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    pub min_stock: Patch<u32>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    pub optimal_stock: Patch<u32>,
}

impl ItemUpdate {
    pub fn quantity(quantity: u32) -> Self {
        Self {
            quantity: Some(quantity),
            ..Default::default()
        }
    }

    /// Applies the update to a stored item, enforcing the stock invariant.
    pub fn apply_to(&self, item: &Item) -> Item {
        let mut next = item.clone();
        if let Some(name) = &self.name {
            next.name = name.clone();
        }
        if let Some(quantity) = self.quantity {
            next.quantity = quantity;
        }
        if let Some(category) = &self.category {
            next.category = category.clone();
        }
        if let Some(location) = &self.location {
            next.location = location.clone();
        }
        next.condition = self.condition.apply(item.condition);
        next.notes = self.notes.apply(item.notes.clone());
        next.purchase_link = self.purchase_link.apply(item.purchase_link.clone());
        if let Some(enabled) = self.stock_management_enabled {
            next.stock_management_enabled = enabled;
        }
        next.min_stock = self.min_stock.apply(item.min_stock);
        next.optimal_stock = self.optimal_stock.apply(item.optimal_stock);

        let stock = StockSettings::new(
            next.stock_management_enabled,
            next.min_stock,
            next.optimal_stock,
        );
        next.min_stock = stock.min_stock;
        next.optimal_stock = stock.optimal_stock;
        next
    }

    /// Names of the non-quantity fields whose stored value would change.
    pub fn changed_fields(&self, item: &Item) -> Vec<&'static str> {
        let next = self.apply_to(item);
        let mut fields = Vec::new();
        if next.name != item.name {
            fields.push("name");
        }
        if next.category != item.category {
            fields.push("category");
        }
        if next.location != item.location {
            fields.push("location");
        }
        if next.condition != item.condition {
            fields.push("condition");
        }
        if next.notes != item.notes {
            fields.push("notes");
        }
        if next.purchase_link != item.purchase_link {
            fields.push("purchase_link");
        }
        if next.stock_management_enabled != item.stock_management_enabled {
            fields.push("stock_management_enabled");
        }
        if next.min_stock != item.min_stock {
            fields.push("min_stock");
        }
        if next.optimal_stock != item.optimal_stock {
            fields.push("optimal_stock");
        }
        fields
    }
}

fn validate_purchase_link(link: &str) -> Result<(), ValidationError> {
    if link.trim().is_empty() {
        return Ok(());
    }
    match url::Url::parse(link.trim()) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        _ => {
            let mut err = ValidationError::new("purchase_link");
            err.message = Some("The link must be a valid URL".into());
            Err(err)
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn to_count(value: i64) -> Result<u32, ServiceError> {
    u32::try_from(value).map_err(|_| ServiceError::field("quantity", "Quantity is out of range"))
}

/// Body of the "add item" form.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewItemForm {
    #[validate(length(min = 2, message = "The name must contain at least 2 characters"))]
    pub name: String,
    #[validate(range(min = 1, max = 4294967295, message = "Quantity must be greater than 0"))]
    pub quantity: i64,
    #[validate(length(min = 2, message = "The category must contain at least 2 characters"))]
    pub category: String,
    #[validate(length(min = 2, message = "The location must contain at least 2 characters"))]
    pub location: String,
    #[serde(default)]
    pub condition: Option<Condition>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    #[validate(custom = "validate_purchase_link")]
    pub purchase_link: Option<String>,
    #[serde(default)]
    pub stock_management_enabled: bool,
    #[serde(default)]
    #[validate(range(min = 0, max = 4294967295, message = "Minimum stock must be positive"))]
    pub min_stock: Option<i64>,
    #[serde(default)]
    #[validate(range(min = 0, max = 4294967295, message = "Optimal stock must be positive"))]
    pub optimal_stock: Option<i64>,
}

impl NewItemForm {
    pub fn into_new_item(self) -> Result<NewItem, ServiceError> {
        self.validate()?;
        Ok(NewItem {
            name: self.name.trim().to_string(),
            quantity: to_count(self.quantity)?,
            category: self.category.trim().to_string(),
            location: self.location.trim().to_string(),
            condition: self.condition,
            notes: non_blank(self.notes),
            purchase_link: non_blank(self.purchase_link),
            stock: StockSettings::new(
                self.stock_management_enabled,
                self.min_stock.map(to_count).transpose()?,
                self.optimal_stock.map(to_count).transpose()?,
            ),
        })
    }
}

/// Body of the "edit item" dialog. Every field is submitted; absent
/// optional values remove the stored field.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EditItemForm {
    #[validate(length(min = 2, message = "The name must contain at least 2 characters"))]
    pub name: String,
    #[validate(range(min = 0, max = 4294967295, message = "Quantity must be positive"))]
    pub quantity: i64,
    #[validate(length(min = 1, message = "The category is required"))]
    pub category: String,
    #[validate(length(min = 1, message = "The location is required"))]
    pub location: String,
    #[serde(default)]
    #[validate(custom = "validate_purchase_link")]
    pub purchase_link: Option<String>,
    #[serde(default)]
    pub stock_management_enabled: bool,
    #[serde(default)]
    #[validate(range(min = 0, max = 4294967295, message = "Minimum stock must be positive"))]
    pub min_stock: Option<i64>,
    #[serde(default)]
    #[validate(range(min = 0, max = 4294967295, message = "Optimal stock must be positive"))]
    pub optimal_stock: Option<i64>,
    #[serde(default)]
    pub condition: Option<Condition>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl EditItemForm {
    pub fn into_update(self) -> Result<ItemUpdate, ServiceError> {
        self.validate()?;
        let stock = StockSettings::new(
            self.stock_management_enabled,
            self.min_stock.map(to_count).transpose()?,
            self.optimal_stock.map(to_count).transpose()?,
        );
        Ok(ItemUpdate {
            name: Some(self.name.trim().to_string()),
            quantity: Some(to_count(self.quantity)?),
            category: Some(self.category.trim().to_string()),
            location: Some(self.location.trim().to_string()),
            condition: self.condition.into(),
            notes: non_blank(self.notes).into(),
            purchase_link: non_blank(self.purchase_link).into(),
            stock_management_enabled: Some(stock.enabled),
            min_stock: stock.min_stock.into(),
            optimal_stock: stock.optimal_stock.into(),
        })
    }
}

/// Body of the "decrease quantity" dialog, also used to remove units from
/// the stock overview.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DecreaseQuantityForm {
    #[validate(range(min = 1, max = 4294967295, message = "Quantity must be greater than 0"))]
    pub quantity: i64,
    #[serde(default)]
    pub note: Option<String>,
}

impl DecreaseQuantityForm {
    /// Validates the amount against the current stock and returns the
    /// resulting quantity plus the cleaned note.
    pub fn resolve(&self, current: u32) -> Result<(u32, Option<String>), ServiceError> {
        self.validate()?;
        let amount = to_count(self.quantity)?;
        let remaining = current.checked_sub(amount).ok_or_else(|| {
            ServiceError::field(
                "quantity",
                "The quantity cannot be greater than the current stock",
            )
        })?;
        Ok((remaining, non_blank(self.note.clone())))
    }
}

/// Body of the stock-settings dialog.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StockSettingsForm {
    #[validate(range(min = 0, max = 4294967295, message = "Minimum stock must be positive"))]
    pub min_stock: i64,
    #[validate(range(min = 0, max = 4294967295, message = "Optimal stock must be positive"))]
    pub optimal_stock: i64,
    #[validate(range(min = 0, max = 4294967295, message = "Quantity must be positive"))]
    pub quantity: i64,
}

impl StockSettingsForm {
    pub fn into_update(self) -> Result<ItemUpdate, ServiceError> {
        self.validate()?;
        Ok(ItemUpdate {
            quantity: Some(to_count(self.quantity)?),
            min_stock: Patch::Set(to_count(self.min_stock)?),
            optimal_stock: Patch::Set(to_count(self.optimal_stock)?),
            ..Default::default()
        })
    }
}
