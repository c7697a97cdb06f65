//! The per-request authentication state.

use crate::session::SessionStatus;

/// Who is making the request, as resolved once by the authorization gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Identity {
  #[default]
  Anonymous,
  Authenticated { subject_id: i64 },
}

impl Identity {
  pub fn is_authenticated(&self) -> bool { matches!(self, Self::Authenticated { .. }) }

  pub fn subject_id(&self) -> Option<i64> {
    match self {
      Self::Authenticated { subject_id } => Some(*subject_id),
      Self::Anonymous => None,
    }
  }
}

impl From<SessionStatus> for Identity {
  fn from(status: SessionStatus) -> Self {
    match status.subject_id() {
      Some(subject_id) => Self::Authenticated { subject_id },
      None => Self::Anonymous,
    }
  }
}
