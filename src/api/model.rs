//! Resource types returned by the menu backend.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Draft;

/// Backend resource collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResourceKind {
    #[default]
    Campaigns,
    Menus,
    Categories,
    Items,
}

impl ResourceKind {
    /// All resources in tab order.
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Campaigns,
        ResourceKind::Menus,
        ResourceKind::Categories,
        ResourceKind::Items,
    ];

    /// Path segment of the collection endpoint.
    pub fn path(&self) -> &'static str {
        match self {
            ResourceKind::Campaigns => "campaigns",
            ResourceKind::Menus => "menus",
            ResourceKind::Categories => "categories",
            ResourceKind::Items => "items",
        }
    }

    /// Singular label used in notifications.
    pub fn singular(&self) -> &'static str {
        match self {
            ResourceKind::Campaigns => "Campaign",
            ResourceKind::Menus => "Menu",
            ResourceKind::Categories => "Category",
            ResourceKind::Items => "Menu item",
        }
    }

    /// Tab title.
    pub fn title(&self) -> &'static str {
        match self {
            ResourceKind::Campaigns => "Campaigns",
            ResourceKind::Menus => "Menus",
            ResourceKind::Categories => "Categories",
            ResourceKind::Items => "Items",
        }
    }

    /// Parse a collection name as given on the command line.
    pub fn from_path(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.path().eq_ignore_ascii_case(name))
    }

    /// Whether create/update requests may carry an image part.
    pub fn accepts_image(&self) -> bool {
        matches!(self, ResourceKind::Campaigns | ResourceKind::Categories)
    }

    /// Whether drafts of this resource carry a price.
    pub fn has_price(&self) -> bool {
        matches!(self, ResourceKind::Items)
    }

    /// Wire field and label of the parent reference, if the resource has one.
    pub fn parent_field(&self) -> Option<(&'static str, &'static str)> {
        match self {
            ResourceKind::Categories => Some(("menuId", "Menu")),
            ResourceKind::Items => Some(("categoryId", "Category")),
            ResourceKind::Campaigns | ResourceKind::Menus => None,
        }
    }
}

/// One server response unit of a paginated list.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items in server order.
    pub items: Vec<T>,
    /// Zero-based page ordinal.
    pub page_index: u32,
    /// Whether the server reported this as the final page.
    pub is_last_page: bool,
    /// Total number of elements, when reported.
    pub total_elements: Option<u64>,
}

impl<T> Page<T> {
    /// Create a page without a reported total.
    #[cfg(test)]
    pub fn new(items: Vec<T>, page_index: u32, is_last_page: bool) -> Self {
        Self {
            items,
            page_index,
            is_last_page,
            total_elements: None,
        }
    }
}

/// Wire shape of a list response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PageEnvelope<T> {
    pub content: Vec<T>,
    #[serde(alias = "number")]
    pub page: u32,
    pub total_elements: Option<u64>,
    pub last: bool,
}

impl<T> From<PageEnvelope<T>> for Page<T> {
    fn from(envelope: PageEnvelope<T>) -> Self {
        Page {
            items: envelope.content,
            page_index: envelope.page,
            is_last_page: envelope.last,
            total_elements: envelope.total_elements,
        }
    }
}

/// A page of any resource, tagged by kind.
#[derive(Debug, Clone)]
pub enum LoadedPage {
    Campaigns(Page<Campaign>),
    Menus(Page<Menu>),
    Categories(Page<Category>),
    Items(Page<MenuItem>),
}

impl LoadedPage {
    /// Resource the page belongs to.
    pub fn kind(&self) -> ResourceKind {
        match self {
            LoadedPage::Campaigns(_) => ResourceKind::Campaigns,
            LoadedPage::Menus(_) => ResourceKind::Menus,
            LoadedPage::Categories(_) => ResourceKind::Categories,
            LoadedPage::Items(_) => ResourceKind::Items,
        }
    }
}

/// A uniquely identified backend resource.
pub trait Entity: Clone + std::fmt::Debug + Serialize + DeserializeOwned + Send + 'static {
    /// Collection this entity lives in.
    const KIND: ResourceKind;

    /// Unique identifier; identity of the entity.
    fn id(&self) -> i64;

    /// Display name.
    fn name(&self) -> &str;

    /// Secondary text shown next to the name in lists.
    fn summary(&self) -> String;

    /// Labelled fields for the detail view.
    fn detail_fields(&self) -> Vec<(&'static str, String)>;

    /// Draft prefilled from the entity, for updates.
    ///
    /// Fields the form does not edit travel in `extra` so the update
    /// writes them back unchanged.
    fn to_draft(&self) -> Draft {
        let mut extra = match serde_json::to_value(self) {
            Ok(Value::Object(fields)) => fields,
            _ => Map::new(),
        };
        for field in ["id", "name", "description"] {
            extra.remove(field);
        }
        let price = extra
            .remove("price")
            .and_then(|p| p.as_f64())
            .map(|p| format!("{p:.2}"));

        Draft {
            name: self.name().to_string(),
            description: self.description().map(str::to_string),
            price,
            extra,
            ..Draft::default()
        }
    }

    /// Free-text description, if any.
    fn description(&self) -> Option<&str>;

    /// Wrap a typed page for transport in an event.
    fn into_loaded(page: Page<Self>) -> LoadedPage;

    /// Unwrap a transported page, if it holds this entity type.
    fn from_loaded(loaded: LoadedPage) -> Option<Page<Self>>;
}

fn or_dash(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".to_string())
}

fn yes_no(value: bool) -> String {
    if value { "yes" } else { "no" }.to_string()
}

/// A promotional campaign shown on the public menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub active: bool,
}

impl Entity for Campaign {
    const KIND: ResourceKind = ResourceKind::Campaigns;

    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn summary(&self) -> String {
        let state = if self.active { "active" } else { "inactive" };
        match &self.description {
            Some(desc) => format!("{state} · {desc}"),
            None => state.to_string(),
        }
    }

    fn detail_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ID", self.id.to_string()),
            ("Name", self.name.clone()),
            ("Description", or_dash(&self.description)),
            ("Image", or_dash(&self.image_url)),
            ("Active", yes_no(self.active)),
        ]
    }

    fn into_loaded(page: Page<Self>) -> LoadedPage {
        LoadedPage::Campaigns(page)
    }

    fn from_loaded(loaded: LoadedPage) -> Option<Page<Self>> {
        match loaded {
            LoadedPage::Campaigns(page) => Some(page),
            _ => None,
        }
    }
}

/// A restaurant menu reachable from a QR code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub restaurant_name: Option<String>,
    #[serde(default)]
    pub active: bool,
}

impl Entity for Menu {
    const KIND: ResourceKind = ResourceKind::Menus;

    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn summary(&self) -> String {
        self.restaurant_name
            .clone()
            .or_else(|| self.description.clone())
            .unwrap_or_default()
    }

    fn detail_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ID", self.id.to_string()),
            ("Name", self.name.clone()),
            ("Restaurant", or_dash(&self.restaurant_name)),
            ("Description", or_dash(&self.description)),
            ("Active", yes_no(self.active)),
        ]
    }

    fn into_loaded(page: Page<Self>) -> LoadedPage {
        LoadedPage::Menus(page)
    }

    fn from_loaded(loaded: LoadedPage) -> Option<Page<Self>> {
        match loaded {
            LoadedPage::Menus(page) => Some(page),
            _ => None,
        }
    }
}

/// A section of a menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub menu_id: Option<i64>,
}

impl Entity for Category {
    const KIND: ResourceKind = ResourceKind::Categories;

    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn summary(&self) -> String {
        self.description.clone().unwrap_or_default()
    }

    fn detail_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ID", self.id.to_string()),
            ("Name", self.name.clone()),
            ("Description", or_dash(&self.description)),
            ("Image", or_dash(&self.image_url)),
            (
                "Menu",
                self.menu_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]
    }

    fn into_loaded(page: Page<Self>) -> LoadedPage {
        LoadedPage::Categories(page)
    }

    fn from_loaded(loaded: LoadedPage) -> Option<Page<Self>> {
        match loaded {
            LoadedPage::Categories(page) => Some(page),
            _ => None,
        }
    }
}

/// A dish or drink on a menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

impl MenuItem {
    fn price_label(&self) -> String {
        self.price
            .map(|p| format!("{p:.2}"))
            .unwrap_or_else(|| "-".to_string())
    }
}

impl Entity for MenuItem {
    const KIND: ResourceKind = ResourceKind::Items;

    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn summary(&self) -> String {
        if self.available {
            self.price_label()
        } else {
            format!("{} (unavailable)", self.price_label())
        }
    }

    fn detail_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ID", self.id.to_string()),
            ("Name", self.name.clone()),
            ("Description", or_dash(&self.description)),
            ("Price", self.price_label()),
            ("Image", or_dash(&self.image_url)),
            (
                "Category",
                self.category_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            ("Available", yes_no(self.available)),
        ]
    }

    fn into_loaded(page: Page<Self>) -> LoadedPage {
        LoadedPage::Items(page)
    }

    fn from_loaded(loaded: LoadedPage) -> Option<Page<Self>> {
        match loaded {
            LoadedPage::Items(page) => Some(page),
            _ => None,
        }
    }
}
