/// What a WebSocket connection is for, decided from its handshake path.
///
/// The remainder of the path after the prefix is the topic key, taken as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/listen/<key>`: receive everything published to `key`.
    Listen(String),
    /// `/broadcast/<key>`: every data frame is published to `key`.
    Broadcast(String),
}

const LISTEN_PREFIX: &str = "/listen/";
const BROADCAST_PREFIX: &str = "/broadcast/";

impl Route {
    pub fn parse(path: &str) -> Option<Self> {
        if let Some(key) = path.strip_prefix(LISTEN_PREFIX) {
            Some(Route::Listen(key.to_string()))
        } else {
            path.strip_prefix(BROADCAST_PREFIX)
                .map(|key| Route::Broadcast(key.to_string()))
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Listen(key) => format!("{LISTEN_PREFIX}{key}"),
            Route::Broadcast(key) => format!("{BROADCAST_PREFIX}{key}"),
        }
    }
}
