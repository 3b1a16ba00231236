//! Common API types and utilities

use utoipa::{ToSchema, IntoParams};
use serde::{Deserialize, Serialize};

pub(crate) mod string_or_number {
    use serde::{Deserialize, Deserializer, de};

    /// Query strings deliver numbers as text; JSON bodies deliver them as numbers.
    pub fn deserialize_u32_opt<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum StringOrNum {
            Num(u32),
            Str(String),
        }

        match Option::<StringOrNum>::deserialize(deserializer)? {
            Some(StringOrNum::Num(n)) => Ok(Some(n)),
            Some(StringOrNum::Str(s)) if s.trim().is_empty() => Ok(None),
            Some(StringOrNum::Str(s)) => s.trim().parse().map(Some).map_err(de::Error::custom),
            None => Ok(None),
        }
    }
}

/// Standard API error response
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiError {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Pagination parameters (`page` is 0-based)
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    #[serde(default, deserialize_with = "string_or_number::deserialize_u32_opt")]
    page: Option<u32>,
    #[serde(default, alias = "limit", deserialize_with = "string_or_number::deserialize_u32_opt")]
    size: Option<u32>,
}

impl PaginationParams {
    pub const MAX_SIZE: u32 = 500;

    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page: Some(page),
            size: Some(size),
        }
    }

    pub fn page(&self) -> u32 {
        self.page.unwrap_or(0)
    }

    /// Requested page size, falling back to `default_size`, capped at [`Self::MAX_SIZE`]
    pub fn size_or(&self, default_size: u32) -> u32 {
        self.size
            .filter(|s| *s > 0)
            .unwrap_or(default_size)
            .min(Self::MAX_SIZE)
    }

    pub fn offset(&self, default_size: u32) -> u64 {
        (self.page() as u64) * (self.size_or(default_size) as u64)
    }
}

/// Paginated response wrapper
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: u32, size: u32, total: u64) -> Self {
        let total_pages = if size == 0 {
            0
        } else {
            total.div_ceil(size as u64) as u32
        };
        Self {
            data,
            page,
            size,
            total,
            total_pages,
        }
    }
}
