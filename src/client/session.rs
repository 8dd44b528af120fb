// self
use crate::{
	_prelude::*,
	error::{ConnectionError, TransportError},
	http::{HttpConnector, HttpTransport},
};

/// Observable lifecycle of the HTTP session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
	/// No request has been sent yet.
	Idle,
	/// A transport is open and reused by every request.
	Open,
	/// [`ApiClient::close`](crate::client::ApiClient::close) was called.
	Closed,
}

enum SessionState {
	Idle,
	Open(Arc<dyn HttpTransport>),
	Closed,
}

/// Lazily opened, closable transport slot.
pub(crate) struct Session {
	connector: Arc<dyn HttpConnector>,
	timeout: StdDuration,
	state: Mutex<SessionState>,
}
impl Session {
	pub(crate) fn new(connector: Arc<dyn HttpConnector>, timeout: StdDuration) -> Self {
		Self { connector, timeout, state: Mutex::new(SessionState::Idle) }
	}

	/// Returns the open transport, connecting on first use.
	pub(crate) fn transport(&self) -> Result<Arc<dyn HttpTransport>> {
		let mut state = self.state.lock();

		match &*state {
			SessionState::Open(transport) => Ok(transport.clone()),
			SessionState::Closed =>
				Err(ConnectionError { attempts: 0, source: TransportError::Closed }.into()),
			SessionState::Idle => {
				let transport = self.connector.connect(self.timeout)?;

				*state = SessionState::Open(transport.clone());

				Ok(transport)
			},
		}
	}

	/// Closes the session; returns `false` when it was already closed.
	pub(crate) fn close(&self) -> bool {
		let mut state = self.state.lock();

		!matches!(std::mem::replace(&mut *state, SessionState::Closed), SessionState::Closed)
	}

	pub(crate) fn status(&self) -> SessionStatus {
		match &*self.state.lock() {
			SessionState::Idle => SessionStatus::Idle,
			SessionState::Open(_) => SessionStatus::Open,
			SessionState::Closed => SessionStatus::Closed,
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::_preludet::{ScriptedTransport, json_response};

	#[test]
	fn opens_lazily_and_refuses_after_close() {
		let session = Session::new(
			Arc::new(ScriptedTransport::new(|_| Ok(json_response(200, "{}")))),
			StdDuration::from_secs(1),
		);

		assert_eq!(session.status(), SessionStatus::Idle);

		session.transport().expect("Idle session should open.");

		assert_eq!(session.status(), SessionStatus::Open);
		assert!(session.close());
		assert!(!session.close(), "Second close should be a no-op.");
		assert!(matches!(
			session.transport(),
			Err(Error::Connection(ConnectionError { attempts: 0, source: TransportError::Closed }))
		));
	}
}
