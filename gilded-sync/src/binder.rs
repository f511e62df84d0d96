//! Context binding for remote calls.
//!
//! Every remote operation is reached through [`Client::method`]. The call's
//! outcome is handed to a completion together with the client itself, so the
//! completion can log, read options and record ids without capturing the
//! client. Arguments reach the remote exactly as given.

use crate::client::Client;
use crate::error::SyncError;
use crate::remote::{RemoteApi, RemoteError, RemoteValue};

/// Completion of a bound call: runs with the client as context.
pub type Completion<'c, R, U> =
    Box<dyn FnOnce(&mut Client<R>, Result<RemoteValue, RemoteError>) -> Result<U, SyncError> + 'c>;

/// A remote method bound to a client.
pub struct BoundMethod<'c, R> {
    client: &'c mut Client<R>,
    name: &'c str,
}

impl<'c, R: RemoteApi> BoundMethod<'c, R> {
    pub(crate) fn new(client: &'c mut Client<R>, name: &'c str) -> Self {
        Self { client, name }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    /// Call the method with `args` and pass the outcome to `complete`.
    pub fn call<U>(
        self,
        args: Vec<RemoteValue>,
        complete: impl FnOnce(&mut Client<R>, Result<RemoteValue, RemoteError>) -> Result<U, SyncError>,
    ) -> Result<U, SyncError> {
        tracing::debug!("calling {} with {} argument(s)", self.name, args.len());
        let outcome = self.client.remote.authenticated_call(self.name, &args);
        complete(self.client, outcome)
    }

    /// Call with an optional completion.
    ///
    /// - no arguments and no completion: nothing happens, the remote is not contacted;
    /// - arguments but no completion: the call is made, its value dropped, a failure returned;
    /// - a completion: same as [`BoundMethod::call`].
    pub fn call_with<U>(
        self,
        args: Vec<RemoteValue>,
        complete: Option<Completion<'_, R, U>>,
    ) -> Result<Option<U>, SyncError> {
        match complete {
            Some(complete) => self.call(args, complete).map(Some),
            None if args.is_empty() => {
                tracing::trace!("ignoring argument-less call to {}", self.name);
                Ok(None)
            }
            None => {
                tracing::debug!("calling {} without completion", self.name);
                self.client.remote.authenticated_call(self.name, &args)?;
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use gilded_core::ClientOptions;

    use super::*;

    #[derive(Default)]
    struct CountingRemote {
        calls: Vec<(String, Vec<RemoteValue>)>,
    }

    impl RemoteApi for CountingRemote {
        fn authenticated_call(
            &mut self,
            method: &str,
            args: &[RemoteValue],
        ) -> Result<RemoteValue, RemoteError> {
            self.calls.push((method.to_string(), args.to_vec()));
            if method == "fail" {
                return Err(RemoteError::fault(500, "boom"));
            }
            Ok(RemoteValue::from("ok"))
        }
    }

    fn client() -> Client<CountingRemote> {
        Client::new(ClientOptions::new("/srv/content").verbose(true), CountingRemote::default())
    }

    #[test]
    fn completion_receives_client_and_outcome() {
        let mut client = client();
        let seen = client
            .method("echo")
            .call(vec![RemoteValue::Int(1), "two".into()], |client, outcome| {
                assert!(client.verbose());
                Ok(outcome?.as_str().map(str::to_owned))
            })
            .unwrap();
        assert_eq!(seen.as_deref(), Some("ok"));

        let calls = &client.remote().calls;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "echo");
        assert_eq!(calls[0].1, vec![RemoteValue::Int(1), RemoteValue::from("two")]);
    }

    #[test]
    fn bound_method_keeps_its_name() {
        let mut client = client();
        let method = client.method("gw.getVersion");
        assert_eq!(method.name(), "gw.getVersion");
        let name = method.call(vec![RemoteValue::Int(0)], |client, _| {
            Ok(client.remote().calls[0].0.clone())
        });
        assert_eq!(name.unwrap(), "gw.getVersion");
    }

    #[test]
    fn argument_less_call_without_completion_is_inert() {
        let mut client = client();
        let result: Result<Option<()>, SyncError> = client.method("echo").call_with(Vec::new(), None);
        assert!(matches!(result, Ok(None)));
        assert!(client.remote().calls.is_empty());
    }

    #[test]
    fn call_without_completion_still_reaches_remote() {
        let mut client = client();
        let result: Result<Option<()>, SyncError> =
            client.method("echo").call_with(vec!["x".into()], None);
        assert!(matches!(result, Ok(None)));
        assert_eq!(client.remote().calls.len(), 1);
    }

    #[test]
    fn call_without_completion_surfaces_failure() {
        let mut client = client();
        let result: Result<Option<()>, SyncError> =
            client.method("fail").call_with(vec!["x".into()], None);
        assert!(matches!(result, Err(SyncError::Remote(_))));
    }

    #[test]
    fn boxed_completion_runs_once() {
        let mut client = client();
        let result = client.method("echo").call_with(
            Vec::new(),
            Some(Box::new(|_: &mut Client<CountingRemote>, outcome: Result<RemoteValue, RemoteError>| {
                outcome.map(|_| 7).map_err(SyncError::from)
            })),
        );
        assert!(matches!(result, Ok(Some(7))));
        assert_eq!(client.remote().calls.len(), 1);
    }
}
