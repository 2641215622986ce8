//! Per-collection CRUD wrappers

use super::{ApiClient, ClientError, OutgoingRequest, paths};
use crate::types::{Category, Event, Listing, Participant};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

/// List, get, create, update and delete for one REST collection
///
/// Each method is exactly one call through the client's gateway.
pub struct Resource<'a, T> {
    client: &'a ApiClient,
    collection: &'static str,
    _item: PhantomData<fn() -> T>,
}

impl<'a, T> Resource<'a, T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(client: &'a ApiClient, collection: &'static str) -> Self {
        Self {
            client,
            collection,
            _item: PhantomData,
        }
    }

    /// Collection path, e.g. `eventos/`
    pub fn collection(&self) -> &'static str {
        self.collection
    }

    fn item_path(&self, id: u64) -> String {
        format!("{}{id}/", self.collection)
    }

    /// `GET collection/` with optional filter or pagination parameters
    pub async fn list(&self, params: &[(String, String)]) -> Result<Listing<T>, ClientError> {
        let request = OutgoingRequest::get(self.collection).params(params.iter().cloned());
        self.client.execute(&request).await
    }

    /// `GET collection/{id}/`
    pub async fn get(&self, id: u64) -> Result<T, ClientError> {
        self.client
            .execute(&OutgoingRequest::get(self.item_path(id)))
            .await
    }

    /// `POST collection/`
    pub async fn create(&self, item: &T) -> Result<T, ClientError> {
        let request = OutgoingRequest::post(self.collection).json(item)?;
        self.client.execute(&request).await
    }

    /// `PUT collection/{id}/`
    pub async fn update(&self, id: u64, item: &T) -> Result<T, ClientError> {
        let request = OutgoingRequest::put(self.item_path(id)).json(item)?;
        self.client.execute(&request).await
    }

    /// `DELETE collection/{id}/`
    pub async fn delete(&self, id: u64) -> Result<(), ClientError> {
        self.client
            .execute_empty(&OutgoingRequest::delete(self.item_path(id)))
            .await
    }
}

impl ApiClient {
    /// Events collection
    pub fn events(&self) -> Resource<'_, Event> {
        Resource::new(self, paths::EVENTS)
    }

    /// Categories collection
    pub fn categories(&self) -> Resource<'_, Category> {
        Resource::new(self, paths::CATEGORIES)
    }

    /// Participants collection
    pub fn participants(&self) -> Resource<'_, Participant> {
        Resource::new(self, paths::PARTICIPANTS)
    }
}
