//! Write payloads and client-side validation.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value, json};

use crate::error::MenuboardError;

use super::ResourceKind;

/// Longest accepted entity name, in characters.
pub const MAX_NAME_LEN: usize = 120;

/// Price with up to two decimals, e.g. "12" or "4.50".
static PRICE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(\.\d{1,2})?$").expect("Invalid regex pattern"));

/// Payload for create and update requests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    /// Entity name (required).
    pub name: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Optional local image sent as a multipart file part.
    pub image: Option<PathBuf>,
    /// Price as typed by the user (menu items only).
    pub price: Option<String>,
    /// Parent id as typed by the user (categories and menu items).
    pub parent: Option<String>,
    /// Fields of the edited entity the form does not touch, sent back as-is.
    pub extra: Map<String, Value>,
}

impl Draft {
    /// Create a draft with just a name.
    #[cfg(test)]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Validate the draft for the given resource before anything is sent.
    pub fn validate(&self, kind: ResourceKind) -> Result<(), MenuboardError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(MenuboardError::Validation(format!(
                "{} name cannot be empty",
                kind.singular()
            )));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(MenuboardError::Validation(format!(
                "{} name must be at most {MAX_NAME_LEN} characters",
                kind.singular()
            )));
        }

        if let Some(price) = &self.price {
            if !kind.has_price() {
                return Err(MenuboardError::Validation(format!(
                    "{} has no price",
                    kind.singular()
                )));
            }
            if !PRICE_REGEX.is_match(price.trim()) {
                return Err(MenuboardError::Validation(format!(
                    "Invalid price: \"{price}\""
                )));
            }
        }

        if let Some(parent) = &self.parent {
            let Some((_, label)) = kind.parent_field() else {
                return Err(MenuboardError::Validation(format!(
                    "{} has no parent",
                    kind.singular()
                )));
            };
            if !parent.trim().parse::<i64>().is_ok_and(|id| id > 0) {
                return Err(MenuboardError::Validation(format!(
                    "Invalid {} id: \"{parent}\"",
                    label.to_lowercase()
                )));
            }
        }

        if let Some(image) = &self.image {
            if !kind.accepts_image() {
                return Err(MenuboardError::Validation(format!(
                    "{} does not take an image",
                    kind.singular()
                )));
            }
            if !image.is_file() {
                return Err(MenuboardError::Validation(format!(
                    "Image not found: {}",
                    image.display()
                )));
            }
        }

        Ok(())
    }

    /// JSON representation of the non-file fields.
    ///
    /// Untouched entity fields come first so an update replaces the
    /// resource without dropping them; edited fields override.
    pub fn to_json(&self, kind: ResourceKind) -> Value {
        let mut body = self.extra.clone();
        body.insert("name".to_string(), json!(self.name.trim()));
        if let Some(desc) = self.description.as_deref().map(str::trim)
            && !desc.is_empty()
        {
            body.insert("description".to_string(), json!(desc));
        }
        if let Some(price) = self.price.as_deref().and_then(|p| p.trim().parse::<f64>().ok()) {
            body.insert("price".to_string(), json!(price));
        }
        if let Some((field, _)) = kind.parent_field()
            && let Some(id) = self.parent.as_deref().and_then(|p| p.trim().parse::<i64>().ok())
        {
            body.insert(field.to_string(), json!(id));
        }
        Value::Object(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_name_rejected() {
        let draft = Draft::named("   ");
        let err = draft.validate(ResourceKind::Campaigns).unwrap_err();
        assert_eq!(
            err,
            MenuboardError::Validation("Campaign name cannot be empty".to_string())
        );
    }

    #[test]
    fn test_long_name_rejected() {
        let draft = Draft::named("x".repeat(MAX_NAME_LEN + 1));
        assert!(draft.validate(ResourceKind::Menus).is_err());

        let draft = Draft::named("x".repeat(MAX_NAME_LEN));
        assert!(draft.validate(ResourceKind::Menus).is_ok());
    }

    #[test]
    fn test_price_validation() {
        let mut draft = Draft::named("Espresso");
        draft.price = Some("2.50".to_string());
        assert!(draft.validate(ResourceKind::Items).is_ok());

        draft.price = Some("2.505".to_string());
        assert!(draft.validate(ResourceKind::Items).is_err());

        draft.price = Some("abc".to_string());
        assert!(draft.validate(ResourceKind::Items).is_err());

        // Only items carry a price
        draft.price = Some("3".to_string());
        assert!(draft.validate(ResourceKind::Campaigns).is_err());
    }

    #[test]
    fn test_missing_image_rejected() {
        let mut draft = Draft::named("Summer Sale");
        draft.image = Some(PathBuf::from("/definitely/not/here.png"));
        assert!(draft.validate(ResourceKind::Campaigns).is_err());
    }

    #[test]
    fn test_existing_image_accepted() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut draft = Draft::named("Summer Sale");
        draft.image = Some(file.path().to_path_buf());
        assert!(draft.validate(ResourceKind::Campaigns).is_ok());
        assert!(draft.validate(ResourceKind::Items).is_err());
    }

    #[test]
    fn test_to_json() {
        let mut draft = Draft::named(" Cake ");
        draft.description = Some("  ".to_string());
        draft.price = Some("4.5".to_string());

        let body = draft.to_json(ResourceKind::Items);
        assert_eq!(body["name"], "Cake");
        assert!(body.get("description").is_none());
        assert_eq!(body["price"], 4.5);
    }

    #[test]
    fn test_to_json_keeps_untouched_fields() {
        let mut draft = Draft::named("Drinks");
        draft.extra.insert("menuId".to_string(), json!(7));
        draft.extra.insert("imageUrl".to_string(), json!("/img/drinks.png"));
        draft.extra.insert("name".to_string(), json!("Old name"));

        assert_eq!(
            draft.to_json(ResourceKind::Categories),
            json!({"name": "Drinks", "menuId": 7, "imageUrl": "/img/drinks.png"})
        );

        // A typed parent wins over the one carried from the entity
        draft.parent = Some("9".to_string());
        assert_eq!(draft.to_json(ResourceKind::Categories)["menuId"], 9);
    }

    #[test]
    fn test_parent_validation() {
        let mut draft = Draft::named("Tea");
        draft.parent = Some("4".to_string());
        assert!(draft.validate(ResourceKind::Items).is_ok());
        assert_eq!(draft.to_json(ResourceKind::Items)["categoryId"], 4);

        draft.parent = Some("drinks".to_string());
        assert_eq!(
            draft.validate(ResourceKind::Items).unwrap_err(),
            MenuboardError::Validation("Invalid category id: \"drinks\"".to_string())
        );

        draft.parent = Some("0".to_string());
        assert!(draft.validate(ResourceKind::Items).is_err());

        // Campaigns and menus have no parent
        draft.parent = Some("4".to_string());
        assert!(draft.validate(ResourceKind::Campaigns).is_err());
    }
}
