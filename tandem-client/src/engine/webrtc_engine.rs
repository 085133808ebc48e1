use crate::engine::{EngineEvent, EngineEvents, EngineFactory, NegotiationEngine};
use crate::media::MediaStream;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tandem_core::{IceCandidate, IceServerConfig, SdpKind, SessionDescription};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8, MediaEngine};
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::rtp_transceiver::RTCRtpTransceiver;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;
use webrtc::track::track_remote::TrackRemote;

/// Builds one [`WebRtcEngine`] per session.
#[derive(Debug, Clone)]
pub struct WebRtcEngineFactory {
    ice_servers: Vec<IceServerConfig>,
}

impl WebRtcEngineFactory {
    pub fn new(ice_servers: Vec<IceServerConfig>) -> Self {
        Self { ice_servers }
    }
}

#[async_trait]
impl EngineFactory for WebRtcEngineFactory {
    async fn create(
        &self,
        local_stream: Arc<dyn MediaStream>,
        events: EngineEvents,
    ) -> Result<Arc<dyn NegotiationEngine>> {
        let engine = WebRtcEngine::new(&self.ice_servers, local_stream.as_ref(), events).await?;
        Ok(Arc::new(engine))
    }
}

/// [`NegotiationEngine`] backed by a webrtc-rs peer connection.
pub struct WebRtcEngine {
    peer_connection: Arc<RTCPeerConnection>,
    data_channel: Arc<Mutex<Option<Arc<RTCDataChannel>>>>,
    events: EngineEvents,
}

impl WebRtcEngine {
    pub async fn new(
        ice_servers: &[IceServerConfig],
        local_stream: &dyn MediaStream,
        events: EngineEvents,
    ) -> Result<Self> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: ice_servers
                .iter()
                .map(|s| RTCIceServer {
                    urls: s.urls.clone(),
                    username: s.username.clone().unwrap_or_default(),
                    credential: s.credential.clone().unwrap_or_default(),
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);
        add_local_tracks(&peer_connection, local_stream.id()).await?;

        let data_channel = Arc::new(Mutex::new(None));
        let engine = Self {
            peer_connection,
            data_channel,
            events,
        };
        engine.register_callbacks();

        info!(
            "Peer connection created for session {}",
            engine.events.session()
        );
        Ok(engine)
    }

    fn register_callbacks(&self) {
        let session = self.events.session();
        self.peer_connection
            .on_peer_connection_state_change(Box::new(move |s: RTCPeerConnectionState| {
                info!("Peer Connection State changed for session {}: {:?}", session, s);
                Box::pin(async {})
            }));

        let ice_events = self.events.clone();
        self.peer_connection
            .on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
                let events = ice_events.clone();
                Box::pin(async move {
                    let Some(candidate) = c else {
                        events.emit(EngineEvent::LocalCandidate(None));
                        return;
                    };
                    match candidate.to_json() {
                        Ok(init) => {
                            events.emit(EngineEvent::LocalCandidate(Some(IceCandidate {
                                candidate: init.candidate,
                                sdp_mid: init.sdp_mid,
                                sdp_m_line_index: init.sdp_mline_index,
                            })));
                        }
                        Err(e) => warn!("Could not serialize local candidate: {}", e),
                    }
                })
            }));

        let track_events = self.events.clone();
        self.peer_connection.on_track(Box::new(
            move |track: Arc<TrackRemote>, _: Arc<RTCRtpReceiver>, _: Arc<RTCRtpTransceiver>| {
                let events = track_events.clone();
                Box::pin(async move {
                    debug!("Remote {} track on stream {}", track.kind(), track.stream_id());
                    let stream = RemoteTrackStream::new(track.stream_id());
                    events.emit(EngineEvent::RemoteTrack(Arc::new(stream)));
                })
            },
        ));

        let dc_events = self.events.clone();
        let dc_slot = self.data_channel.clone();
        self.peer_connection
            .on_data_channel(Box::new(move |dc: Arc<RTCDataChannel>| {
                let events = dc_events.clone();
                let slot = dc_slot.clone();
                Box::pin(async move {
                    let label = dc.label().to_owned();
                    debug!("New DataChannel '{}' for session {}", label, events.session());

                    let mut slot = slot.lock().await;
                    if slot.is_some() {
                        warn!("Ignoring extra DataChannel '{}'", label);
                        return;
                    }
                    events.emit(EngineEvent::RemoteDataChannel { label });
                    register_channel(&dc, &events);
                    *slot = Some(dc);
                })
            }));
    }
}

#[async_trait]
impl NegotiationEngine for WebRtcEngine {
    async fn create_offer(&self) -> Result<SessionDescription> {
        let offer = self.peer_connection.create_offer(None).await?;
        Ok(SessionDescription::offer(offer.sdp))
    }

    async fn create_answer(&self) -> Result<SessionDescription> {
        let answer = self.peer_connection.create_answer(None).await?;
        Ok(SessionDescription::answer(answer.sdp))
    }

    async fn set_local_description(&self, description: SessionDescription) -> Result<()> {
        let desc = to_rtc(description)?;
        self.peer_connection.set_local_description(desc).await?;
        Ok(())
    }

    async fn set_remote_description(&self, description: SessionDescription) -> Result<()> {
        let desc = to_rtc(description)?;
        self.peer_connection.set_remote_description(desc).await?;
        Ok(())
    }

    async fn add_remote_candidate(&self, candidate: IceCandidate) -> Result<()> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_m_line_index,
            username_fragment: None,
        };
        self.peer_connection
            .add_ice_candidate(init)
            .await
            .context("Failed to add remote ICE candidate")?;
        Ok(())
    }

    async fn create_data_channel(&self, label: &str) -> Result<()> {
        let mut slot = self.data_channel.lock().await;
        if slot.is_some() {
            bail!("data channel already exists");
        }
        let dc = self.peer_connection.create_data_channel(label, None).await?;
        register_channel(&dc, &self.events);
        *slot = Some(dc);
        Ok(())
    }

    async fn send_text(&self, text: &str) -> Result<()> {
        let slot = self.data_channel.lock().await;
        let Some(dc) = slot.as_ref() else {
            bail!("no data channel");
        };
        dc.send_text(text.to_owned()).await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        if let Some(dc) = self.data_channel.lock().await.take() {
            if let Err(e) = dc.close().await {
                debug!("DataChannel close: {}", e);
            }
        }
        self.peer_connection.close().await?;
        Ok(())
    }
}

/// Remote media arriving on the peer connection.
#[derive(Debug)]
struct RemoteTrackStream {
    id: String,
    stopped: AtomicBool,
}

impl RemoteTrackStream {
    fn new(id: String) -> Self {
        Self {
            id,
            stopped: AtomicBool::new(false),
        }
    }
}

impl MediaStream for RemoteTrackStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn stop_all_tracks(&self) {
        // Tracks end with the peer connection.
        if !self.stopped.swap(true, Ordering::SeqCst) {
            debug!("Remote stream {} stopped", self.id);
        }
    }
}

async fn add_local_tracks(pc: &RTCPeerConnection, stream_id: &str) -> Result<()> {
    for (mime_type, kind) in [(MIME_TYPE_OPUS, "audio"), (MIME_TYPE_VP8, "video")] {
        let track = Arc::new(TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: mime_type.to_owned(),
                ..Default::default()
            },
            kind.to_owned(),
            stream_id.to_owned(),
        ));
        pc.add_track(track as Arc<dyn TrackLocal + Send + Sync>)
            .await
            .with_context(|| format!("Failed to add local {} track", kind))?;
    }
    Ok(())
}

fn register_channel(dc: &Arc<RTCDataChannel>, events: &EngineEvents) {
    let open_events = events.clone();
    let label = dc.label().to_owned();
    dc.on_open(Box::new(move || {
        Box::pin(async move {
            info!("DataChannel '{}' open", label);
            open_events.emit(EngineEvent::DataChannelOpen);
        })
    }));

    let msg_events = events.clone();
    dc.on_message(Box::new(move |msg: DataChannelMessage| {
        let events = msg_events.clone();
        Box::pin(async move {
            if !msg.is_string {
                debug!("Ignoring binary DataChannel message ({} bytes)", msg.data.len());
                return;
            }
            let text = String::from_utf8_lossy(&msg.data).into_owned();
            events.emit(EngineEvent::DataChannelMessage(text));
        })
    }));
}

fn to_rtc(description: SessionDescription) -> Result<RTCSessionDescription> {
    let desc = match description.kind {
        SdpKind::Offer => RTCSessionDescription::offer(description.sdp)?,
        SdpKind::Answer => RTCSessionDescription::answer(description.sdp)?,
    };
    Ok(desc)
}
