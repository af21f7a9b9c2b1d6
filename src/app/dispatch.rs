//! Runs app commands against the gateway off the UI thread.

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;

use crate::api::{Campaign, Category, Entity, Gateway, LoadedPage, Menu, MenuItem, ResourceKind};
use crate::error::MenuboardError;
use crate::paging::FetchRequest;

use super::{AppEvent, Command, Mutation};

/// Spawns one task per command; results come back as [`AppEvent`]s.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    gateway: Gateway,
    events: UnboundedSender<AppEvent>,
    handle: Handle,
}

impl Dispatcher {
    pub fn new(gateway: Gateway, events: UnboundedSender<AppEvent>, handle: Handle) -> Self {
        Self {
            gateway,
            events,
            handle,
        }
    }

    #[cfg(test)]
    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Start a command. Never blocks.
    pub fn dispatch(&self, command: Command) {
        match command {
            Command::FetchPage(request) => {
                let gateway = self.gateway.clone();
                let events = self.events.clone();
                self.handle.spawn(async move {
                    let result = fetch_page(&gateway, request).await;
                    send(&events, AppEvent::PageLoaded { request, result });
                });
            }
            Command::Mutate { kind, mutation } => {
                let gateway = self.gateway.clone();
                let events = self.events.clone();
                let mutation_kind = mutation.kind();
                self.handle.spawn(async move {
                    let result = match kind {
                        ResourceKind::Campaigns => mutate::<Campaign>(&gateway, mutation).await,
                        ResourceKind::Menus => mutate::<Menu>(&gateway, mutation).await,
                        ResourceKind::Categories => mutate::<Category>(&gateway, mutation).await,
                        ResourceKind::Items => mutate::<MenuItem>(&gateway, mutation).await,
                    };
                    send(
                        &events,
                        AppEvent::MutationSettled {
                            kind,
                            mutation: mutation_kind,
                            result,
                        },
                    );
                });
            }
            Command::Invalidate(kind) => {
                let dropped = self.gateway.cache().invalidate(kind);
                tracing::debug!(resource = kind.path(), dropped, "cache invalidated");
            }
            Command::TrackQr => {
                let gateway = self.gateway.clone();
                self.handle.spawn(async move {
                    match gateway.track_qr().await {
                        Ok(()) => tracing::info!("QR scan tracked"),
                        Err(e) => tracing::warn!(error = %e, "QR tracking failed"),
                    }
                });
            }
        }
    }
}

fn send(events: &UnboundedSender<AppEvent>, event: AppEvent) {
    // The receiver is gone once the UI has exited
    if events.send(event).is_err() {
        tracing::trace!("event dropped after shutdown");
    }
}

async fn fetch_page(gateway: &Gateway, request: FetchRequest) -> Result<LoadedPage, MenuboardError> {
    if !request.delay.is_zero() {
        tokio::time::sleep(request.delay).await;
    }
    match request.kind {
        ResourceKind::Campaigns => fetch::<Campaign>(gateway, request).await,
        ResourceKind::Menus => fetch::<Menu>(gateway, request).await,
        ResourceKind::Categories => fetch::<Category>(gateway, request).await,
        ResourceKind::Items => fetch::<MenuItem>(gateway, request).await,
    }
}

async fn fetch<T: Entity>(
    gateway: &Gateway,
    request: FetchRequest,
) -> Result<LoadedPage, MenuboardError> {
    gateway
        .list::<T>(request.page_index, request.page_size)
        .await
        .map(T::into_loaded)
}

async fn mutate<T: Entity>(gateway: &Gateway, mutation: Mutation) -> Result<(), MenuboardError> {
    match mutation {
        Mutation::Create(draft) => gateway.create::<T>(&draft).await.map(drop),
        Mutation::Update { id, draft } => gateway.update::<T>(id, &draft).await.map(drop),
        Mutation::Delete { id } => gateway.delete(T::KIND, id).await,
    }
}
