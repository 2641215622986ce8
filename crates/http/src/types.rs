//! Wire types for the events API
//!
//! Field names on the wire are the API's own (`titulo`, `fecha`, ...); the
//! Rust side uses English names through serde renames.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Event category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Scheduled event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "fecha")]
    pub date: NaiveDate,
    #[serde(rename = "hora")]
    pub time: NaiveTime,
    #[serde(rename = "ubicacion")]
    pub location: String,
    #[serde(rename = "descripcion", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Category id
    #[serde(rename = "categoria")]
    pub category: u64,
}

/// Person signed up for an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "correo")]
    pub email: String,
    /// Event id
    #[serde(rename = "evento")]
    pub event: u64,
}

/// Paginated list envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// A list response, paginated or not depending on server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Page(Page<T>),
    All(Vec<T>),
}

impl<T> Listing<T> {
    /// Items in this response
    pub fn items(&self) -> &[T] {
        match self {
            Self::Page(page) => &page.results,
            Self::All(items) => items,
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::Page(page) => page.results,
            Self::All(items) => items,
        }
    }

    /// Total number of matching items on the server
    pub fn total(&self) -> u64 {
        match self {
            Self::Page(page) => page.count,
            Self::All(items) => items.len() as u64,
        }
    }

    /// Whether another page follows this one
    pub fn has_next(&self) -> bool {
        matches!(self, Self::Page(Page { next: Some(_), .. }))
    }
}

/// Query parameters understood by the events collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub page: Option<u32>,
    pub category: Option<u64>,
    pub date: Option<NaiveDate>,
}

impl EventFilter {
    /// Render as query-string pairs, skipping unset fields
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(page) = self.page {
            params.push(("page".to_string(), page.to_string()));
        }
        if let Some(category) = self.category {
            params.push(("categoria".to_string(), category.to_string()));
        }
        if let Some(date) = self.date {
            params.push(("fecha".to_string(), date.format("%Y-%m-%d").to_string()));
        }
        params
    }
}

/// Username and password exchanged for a token pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Tokens issued by the API on login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Account creation payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}
