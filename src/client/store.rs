use crate::client::api::{ClientError, EditableApi, ResourceApi};
use crate::client::remote::RemoteData;

/// List and detail state for one resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSlice<T> {
    pub list: RemoteData<Vec<T>>,
    pub details: RemoteData<T>,
}

impl<T> Default for ResourceSlice<T> {
    fn default() -> Self {
        Self {
            list: RemoteData::Idle,
            details: RemoteData::Idle,
        }
    }
}

impl<T> ResourceSlice<T> {
    pub fn is_loading(&self) -> bool {
        self.list.is_loading() || self.details.is_loading()
    }

    pub fn items(&self) -> &[T] {
        self.list.items()
    }

    pub fn detail(&self) -> Option<&T> {
        self.details.ready()
    }
}

/// Holds a [`ResourceSlice`] and drives it through a [`ResourceApi`].
///
/// Mutations hand their outcome back to the caller and refresh the list
/// when they succeed.
pub struct ResourceStore<A: ResourceApi> {
    api: A,
    slice: ResourceSlice<A::Item>,
}

impl<A: ResourceApi> ResourceStore<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            slice: ResourceSlice::default(),
        }
    }

    pub fn slice(&self) -> &ResourceSlice<A::Item> {
        &self.slice
    }

    pub async fn fetch_all(&mut self) -> &RemoteData<Vec<A::Item>> {
        self.slice.list = RemoteData::Loading;
        let result = self.api.fetch_all().await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "list fetch failed");
        }
        self.slice.list = RemoteData::settle(result);
        &self.slice.list
    }

    pub async fn fetch_details(&mut self, id: &str) -> &RemoteData<A::Item> {
        self.slice.details = RemoteData::Loading;
        let result = self.api.fetch_one(id).await;
        self.slice.details = RemoteData::settle(result);
        &self.slice.details
    }

    pub async fn create(&mut self, draft: A::Draft) -> Result<A::Item, ClientError> {
        let result = self.api.create(draft).await;
        if result.is_ok() {
            self.fetch_all().await;
        }
        result
    }

    pub async fn remove(&mut self, id: &str) -> Result<(), ClientError> {
        let result = self.api.remove(id).await;
        if result.is_ok() {
            self.fetch_all().await;
        }
        result
    }
}

impl<A: EditableApi> ResourceStore<A> {
    pub async fn update(&mut self, id: &str, patch: A::Patch) -> Result<A::Item, ClientError> {
        let result = self.api.update(id, patch).await;
        if result.is_ok() {
            self.fetch_all().await;
        }
        result
    }
}
