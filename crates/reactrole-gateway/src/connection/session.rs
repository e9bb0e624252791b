//! Session management
//!
//! Tracks what is needed to resume a dropped gateway session.

use crate::protocol::ResumePayload;

/// Resume state of the current gateway session
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    session_id: Option<String>,
    resume_url: Option<String>,
    sequence: Option<u64>,
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the session handed out by READY
    pub fn record_ready(&mut self, session_id: String, resume_url: Option<String>) {
        tracing::info!(session_id = %session_id, "Gateway session established");
        self.session_id = Some(session_id);
        self.resume_url = resume_url;
    }

    /// Record the sequence number of a dispatch
    pub fn record_sequence(&mut self, sequence: u64) {
        self.sequence = Some(self.sequence.map_or(sequence, |s| s.max(sequence)));
    }

    /// Last sequence number seen, for heartbeats
    pub fn sequence(&self) -> Option<u64> {
        self.sequence
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Check if a Resume can be attempted instead of a fresh Identify
    pub fn can_resume(&self) -> bool {
        self.session_id.is_some() && self.sequence.is_some()
    }

    /// Build the Resume payload, if the session is resumable
    pub fn resume_payload(&self, token: &str) -> Option<ResumePayload> {
        Some(ResumePayload {
            token: token.to_string(),
            session_id: self.session_id.clone()?,
            seq: self.sequence?,
        })
    }

    /// URL to connect to: the resume URL while resuming, else `default_url`
    ///
    /// The resume URL is handed out bare, so the query of `default_url`
    /// (version and encoding) is carried over.
    pub fn connect_url(&self, default_url: &str) -> String {
        match (&self.resume_url, self.can_resume()) {
            (Some(resume), true) => {
                let query = default_url.split_once('?').map(|(_, q)| q);
                let base = resume.trim_end_matches('/');
                match query {
                    Some(q) => format!("{base}/?{q}"),
                    None => base.to_string(),
                }
            }
            _ => default_url.to_string(),
        }
    }

    /// Forget the session; the next connection identifies from scratch
    pub fn reset(&mut self) {
        if let Some(session_id) = self.session_id.take() {
            tracing::debug!(session_id = %session_id, "Gateway session discarded");
        }
        self.resume_url = None;
        self.sequence = None;
    }
}
