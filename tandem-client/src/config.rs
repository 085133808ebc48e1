use tandem_core::IceServerConfig;
use tandem_core::utils::{DEFAULT_DATA_CHANNEL_LABEL, READY_MARKER, default_stun_urls};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket endpoint of the relay server.
    pub signaling_url: String,
    pub ice_servers: Vec<IceServerConfig>,
    pub data_channel_label: String,
    pub ready_marker: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            signaling_url: "ws://127.0.0.1:3000/ws".to_owned(),
            ice_servers: vec![IceServerConfig {
                urls: default_stun_urls(),
                username: None,
                credential: None,
            }],
            data_channel_label: DEFAULT_DATA_CHANNEL_LABEL.to_owned(),
            ready_marker: READY_MARKER.to_owned(),
        }
    }
}
