use mandra_auth::ClientIdentity;

/// Resolved client context for a request.
///
/// Inserted by the auth middleware; immutable and present on every protected
/// route. Also attached to the response so the audit layer can attribute the
/// outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientContext {
    client: ClientIdentity,
}

impl ClientContext {
    pub fn new(client: ClientIdentity) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ClientIdentity {
        &self.client
    }

    pub fn client_name(&self) -> &str {
        &self.client.name
    }
}

/// Per-request trace identifier, generated before anything else runs and
/// echoed in every error response for log correlation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    trace_id: String,
}

impl TraceContext {
    pub fn new() -> Self {
        Self {
            trace_id: uuid::Uuid::now_v7().simple().to_string(),
        }
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }
}

impl Default for TraceContext {
    fn default() -> Self {
        Self::new()
    }
}
