//! Request context attached to audit entries.

use serde::{Deserialize, Serialize};

/// Client details captured by the transport for the current request.
/// Both fields are optional; absence is recorded as `NONE`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestContext {
    pub fn new(client_ip: Option<String>, user_agent: Option<String>) -> Self {
        Self {
            client_ip,
            user_agent,
        }
    }
}
