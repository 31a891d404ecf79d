//! App installation (spec §4.6's sibling service), grounded in
//! `examples/original_source/libpebble2/services/install.py`'s
//! `AppInstaller`. The Python original branches on firmware generation
//! (`_install_legacy2` vs. the BlobDB/PutBytes path); only the modern path
//! is implemented here, since the legacy 2.x bank-based installer needs a
//! watch-side "pick a free bank" negotiation the retrieved sources never
//! describe on the wire (see DESIGN.md).

use uuid::Uuid;

use crate::connection::Connection;
use crate::endpoint;
use crate::error::{Error, ProtocolError};
use crate::event_bus::{Event, EventKey};
use crate::packets::app_fetch::{AppFetchResponse, AppFetchStatus, AppMetadata};
use crate::packets::app_run_state::AppRunState;
use crate::packets::blobdb::BlobDatabaseId;
use crate::packets::putbytes::{ObjectType, PutBytesTarget};
use crate::registry::{PacketKind, WatchEvent};
use crate::services::blobdb::BlobDbClient;
use crate::services::putbytes::{PutBytesClient, PutBytesProgress};
use tokio::time::Duration;

/// The parts of an app bundle this installer can push. `resources` and
/// `worker` are optional; `binary` is not, matching `_send_app_binary`'s
/// unconditional upload versus `_send_app_resources`/`_send_worker_binary`'s
/// size-zero skip in the original.
pub struct AppParts<'a> {
    pub metadata: AppMetadata,
    pub binary: &'a [u8],
    pub resources: Option<&'a [u8]>,
    pub worker: Option<&'a [u8]>,
}

pub struct AppInstaller {
    conn: Connection,
    blobdb: BlobDbClient,
    putbytes: PutBytesClient,
}

impl AppInstaller {
    pub fn new(conn: Connection, blobdb: BlobDbClient, putbytes: PutBytesClient) -> Self {
        Self { conn, blobdb, putbytes }
    }

    /// Installs `parts` onto 3.x-and-later firmware: registers the app's
    /// metadata row, tells the watch it's runnable, waits for the watch to
    /// fetch it, and uploads whichever parts it asked for. Mirrors
    /// `_install`/`_handle_app_fetch_request` end to end.
    pub async fn install(&self, parts: &AppParts<'_>, timeout: Duration) -> Result<(), Error> {
        let uuid = parts.metadata.uuid;

        let mut key = Vec::with_capacity(16);
        key.extend_from_slice(uuid.as_bytes());
        let mut value = pebble_wire::Writer::new();
        parts.metadata.encode(&mut value);
        self.blobdb.insert(BlobDatabaseId::App, key, value.into_vec()).await?;

        let waiter = self
            .conn
            .event_bus()
            .wait_for_event(EventKey::Watch(PacketKind::AppFetchRequest), timeout);
        self.conn
            .send_packet(endpoint::APP_RUN_STATE, &AppRunState::Start { uuid })
            .await?;

        let event = waiter.await?;
        let Event::Watch(WatchEvent::AppFetchRequest(request)) = event else {
            unreachable!("wait_for_event only returns events matching its key");
        };

        if request.uuid != uuid {
            self.respond(AppFetchStatus::InvalidUuid).await?;
            return Err(ProtocolError::AppInstall(format!(
                "watch fetched {} but install is for {uuid}",
                request.uuid
            ))
            .into());
        }

        self.respond(AppFetchStatus::Start).await?;

        let app_id = request.app_id as u32;
        let mut on_progress = |_: PutBytesProgress| {};

        self.putbytes
            .upload(
                ObjectType::AppBinary,
                PutBytesTarget::App { app_id },
                parts.binary,
                timeout,
                &mut on_progress,
            )
            .await?;

        if let Some(resources) = parts.resources {
            self.putbytes
                .upload(
                    ObjectType::AppResources,
                    PutBytesTarget::App { app_id },
                    resources,
                    timeout,
                    &mut on_progress,
                )
                .await?;
        }

        if let Some(worker) = parts.worker {
            self.putbytes
                .upload(
                    ObjectType::Worker,
                    PutBytesTarget::App { app_id },
                    worker,
                    timeout,
                    &mut on_progress,
                )
                .await?;
        }

        Ok(())
    }

    /// Removes an installed app's metadata row and marks it stopped.
    /// Mirrors `AppInstaller.remove_app`: no PutBytes traffic, just the
    /// BlobDB delete plus a stop notification.
    pub async fn remove(&self, uuid: Uuid) -> Result<(), Error> {
        self.blobdb.delete(BlobDatabaseId::App, uuid.as_bytes().to_vec()).await?;
        self.conn
            .send_packet(endpoint::APP_RUN_STATE, &AppRunState::Stop { uuid })
            .await
    }

    async fn respond(&self, status: AppFetchStatus) -> Result<(), Error> {
        self.conn
            .send_packet(endpoint::APP_FETCH, &AppFetchResponse { response: status })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_parts_without_optional_parts_has_none_slots() {
        let metadata = AppMetadata {
            uuid: Uuid::from_u128(1),
            flags: 0,
            icon: 0,
            app_version_major: 1,
            app_version_minor: 0,
            sdk_version_major: 4,
            sdk_version_minor: 3,
            app_face_bg_color: 0,
            app_face_template_id: 0,
            app_name: "Test".to_owned(),
        };
        let parts = AppParts {
            metadata,
            binary: &[1, 2, 3],
            resources: None,
            worker: None,
        };
        assert!(parts.resources.is_none());
        assert!(parts.worker.is_none());
    }
}
