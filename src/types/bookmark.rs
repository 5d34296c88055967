use serde::{Deserialize, Deserializer, Serialize};

/// Lower bound for a node's scale in the scene.
pub const MIN_SCALE: f64 = 0.2;
/// Upper bound for a node's scale in the scene.
pub const MAX_SCALE: f64 = 3.0;
/// Scale applied when a bookmark is created without one.
pub const DEFAULT_SCALE: f64 = 1.0;
/// Absolute bound for each coordinate axis.
pub const COORD_LIMIT: f64 = 1000.0;
/// Category assigned when none is given.
pub const DEFAULT_CATEGORY: &str = "general";
/// Maximum number of entries accepted in one layout batch.
pub const MAX_LAYOUT_BATCH: usize = 500;

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_URL_LEN: usize = 2048;
pub const MAX_CATEGORY_LEN: usize = 50;

/// A point in scene space.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Represents a saved bookmark as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bookmark {
    pub id: String,
    pub title: String,
    pub url: String,
    pub category: String,
    pub position: Option<Position>,
    pub scale: f64,
    pub pinned: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Request body for creating a bookmark.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewBookmark {
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(default)]
    pub pinned: bool,
}

impl NewBookmark {
    pub fn new(title: &str, url: &str) -> Self {
        Self {
            title: title.to_string(),
            url: url.to_string(),
            category: None,
            position: None,
            scale: None,
            pinned: false,
        }
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }
}

/// Partial update of a bookmark. Absent fields are left unchanged.
///
/// `position` distinguishes "absent" (`None`) from an explicit JSON `null`
/// (`Some(None)`), which clears the stored position.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BookmarkPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub position: Option<Option<Position>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
}

impl BookmarkPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.url.is_none()
            && self.category.is_none()
            && self.position.is_none()
            && self.scale.is_none()
            && self.pinned.is_none()
    }
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// One entry of a layout batch, sent after a drag gesture ends.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayoutUpdate {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub scale: f64,
    pub pinned: bool,
}

impl LayoutUpdate {
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y, self.z)
    }
}

/// Outcome of applying a layout batch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LayoutResult {
    pub updated: usize,
}

// --- Validation ---

/// Trims and checks a title. Returns the stored form.
pub fn validate_title(title: &str) -> Result<String, String> {
    let title = title.trim();
    if title.is_empty() {
        return Err("title must not be empty".to_string());
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(format!("title must be at most {} characters", MAX_TITLE_LEN));
    }
    Ok(title.to_string())
}

/// Checks a URL: http(s) scheme, bounded length, no whitespace.
pub fn validate_url(url: &str) -> Result<String, String> {
    let url = url.trim();
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or_else(|| "url must start with http:// or https://".to_string())?;
    if rest.is_empty() {
        return Err("url must include a host".to_string());
    }
    if url.chars().count() > MAX_URL_LEN {
        return Err(format!("url must be at most {} characters", MAX_URL_LEN));
    }
    if url.chars().any(char::is_whitespace) {
        return Err("url must not contain whitespace".to_string());
    }
    Ok(url.to_string())
}

/// Trims and checks a category. Blank input falls back to the default.
pub fn validate_category(category: Option<&str>) -> Result<String, String> {
    let category = category.map(str::trim).unwrap_or("");
    if category.is_empty() {
        return Ok(DEFAULT_CATEGORY.to_string());
    }
    if category.chars().count() > MAX_CATEGORY_LEN {
        return Err(format!(
            "category must be at most {} characters",
            MAX_CATEGORY_LEN
        ));
    }
    Ok(category.to_string())
}

pub fn validate_scale(scale: f64) -> Result<f64, String> {
    if !scale.is_finite() || !(MIN_SCALE..=MAX_SCALE).contains(&scale) {
        return Err(format!(
            "scale must be between {} and {}, got {}",
            MIN_SCALE, MAX_SCALE, scale
        ));
    }
    Ok(scale)
}

pub fn validate_position(position: &Position) -> Result<(), String> {
    for (axis, value) in [("x", position.x), ("y", position.y), ("z", position.z)] {
        if !value.is_finite() || value.abs() > COORD_LIMIT {
            return Err(format!(
                "{} must be a finite number within +/-{}, got {}",
                axis, COORD_LIMIT, value
            ));
        }
    }
    Ok(())
}

/// Validates a whole layout batch. Any failing entry rejects the batch.
pub fn validate_layout_batch(batch: &[LayoutUpdate]) -> Result<(), String> {
    if batch.is_empty() {
        return Err("layout batch must not be empty".to_string());
    }
    if batch.len() > MAX_LAYOUT_BATCH {
        return Err(format!(
            "layout batch must contain at most {} entries",
            MAX_LAYOUT_BATCH
        ));
    }
    let mut seen = std::collections::HashSet::with_capacity(batch.len());
    for (index, update) in batch.iter().enumerate() {
        if update.id.trim().is_empty() {
            return Err(format!("entry {}: id must not be empty", index));
        }
        if !seen.insert(update.id.as_str()) {
            return Err(format!("entry {}: duplicate id {}", index, update.id));
        }
        validate_position(&update.position()).map_err(|e| format!("entry {}: {}", index, e))?;
        validate_scale(update.scale).map_err(|e| format!("entry {}: {}", index, e))?;
    }
    Ok(())
}
