//! Track streaming and the radio relay

use axum::response::Response;
use core_streaming::{serve, FeedStream, StreamableResource};
use tracing::instrument;

use crate::error::Result;
use crate::CoreService;

impl CoreService {
    /// Serve the processed audio of one of the owner's tracks.
    ///
    /// Lookup failures are returned as errors. Once the track is resolved the
    /// response, including 416 for a bad `Range`, comes from
    /// [`core_streaming::serve`].
    #[instrument(skip(self))]
    pub async fn stream_track(
        &self,
        owner_id: &str,
        track_id: &str,
        range: Option<&str>,
    ) -> Result<Response> {
        let track = self.get_track(owner_id, track_id).await?;
        let store = self.deps.object_store.as_ref();
        let resource = StreamableResource::from_store(store, &track.storage_key, &track.name).await?;
        Ok(serve(store, &resource, range).await)
    }

    /// Open the upstream radio feed.
    pub async fn open_radio(&self) -> Result<FeedStream> {
        Ok(self.deps.feed.open().await?)
    }
}
