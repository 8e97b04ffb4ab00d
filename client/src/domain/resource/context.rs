//! Shared plumbing for remote actions.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::policy::{AuthFailurePolicy, SoftFailurePolicy, StorePolicy};
use crate::domain::envelope::{EnvelopeVerdict, error_from_transport, soft_failure_error};
use crate::domain::error::{DomainError, ErrorCode};
use crate::domain::ports::{ApiRequest, Notice, Notifier, RemoteApi};
use crate::domain::session::SessionStore;

/// What an action does, for logs and fallback notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verb {
    Listed,
    Loaded,
    Created,
    Updated,
    Deleted,
    Processed,
    Purchased,
}

impl Verb {
    const fn past_tense(self) -> &'static str {
        match self {
            Self::Listed | Self::Loaded => "loaded",
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::Processed => "processed",
            Self::Purchased => "purchased",
        }
    }
}

/// One remote action: which entity label it concerns and what it does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Action {
    label: &'static str,
    verb: Verb,
}

impl Action {
    pub(crate) const fn new(label: &'static str, verb: Verb) -> Self {
        Self { label, verb }
    }

    fn fallback_message(self) -> String {
        let subject = if matches!(self.verb, Verb::Listed) {
            format!("{} list", self.label)
        } else {
            self.label.to_owned()
        };
        format!("{subject} {} successfully.", self.verb.past_tense())
    }

    const fn accepts_created(self) -> bool {
        matches!(self.verb, Verb::Created | Verb::Purchased)
    }
}

/// Ports and policies shared by every store.
#[derive(Clone)]
pub struct StoreContext {
    api: Arc<dyn RemoteApi>,
    session: Arc<SessionStore>,
    notifier: Arc<dyn Notifier>,
    policy: StorePolicy,
}

impl StoreContext {
    /// Context with default policies.
    pub fn new(
        api: Arc<dyn RemoteApi>,
        session: Arc<SessionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            api,
            session,
            notifier,
            policy: StorePolicy::default(),
        }
    }

    /// Replace the failure policies.
    #[must_use]
    pub const fn with_policy(mut self, policy: StorePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Session whose token is attached to every request.
    pub const fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Failure policies in force.
    pub const fn policy(&self) -> StorePolicy {
        self.policy
    }

    /// Send `request` with the current token and judge the reply.
    ///
    /// Success and soft-failure notices are emitted here. Under
    /// [`SoftFailurePolicy::Reject`] a soft failure is returned as an error
    /// without a notice; the caller reports it through
    /// [`Self::report_failure`].
    pub(crate) async fn exchange<T: DeserializeOwned>(
        &self,
        action: Action,
        request: ApiRequest,
    ) -> Result<Option<T>, DomainError> {
        let request = request.with_bearer(self.session.token());
        debug!(
            method = request.method().as_str(),
            path = request.path(),
            authenticated = request.bearer().is_some(),
            "dispatching remote action"
        );
        let reply = self
            .api
            .send(request)
            .await
            .map_err(|failure| error_from_transport(&failure))?;

        let verdict =
            EnvelopeVerdict::judge(&reply, action.accepts_created(), &action.fallback_message());
        if let EnvelopeVerdict::SoftFailure { status, message } = &verdict {
            if self.policy.soft_failure == SoftFailurePolicy::Reject {
                return Err(soft_failure_error(*status, message));
            }
        }
        self.notifier.notify(verdict.notice());
        decode_data(action, reply.envelope.data)
    }

    /// Surface a failed action and apply the auth-failure policy.
    pub(crate) fn report_failure(&self, error: &DomainError) {
        warn!(
            code = ?error.code(),
            status = ?error.status(),
            message = error.message(),
            "remote action failed"
        );
        self.notifier.notify(Notice::error(error.message()));
        if error.code() == ErrorCode::Unauthorized
            && self.policy.auth_failure == AuthFailurePolicy::ForceLogout
        {
            self.session.expire();
        }
    }
}

fn decode_data<T: DeserializeOwned>(
    action: Action,
    data: Option<Value>,
) -> Result<Option<T>, DomainError> {
    match data {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value).map(Some).map_err(|error| {
            DomainError::invalid_response(format!(
                "Unexpected {} data from server: {error}",
                action.label
            ))
        }),
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Verb::Listed, "Activity list loaded successfully.")]
    #[case(Verb::Loaded, "Activity loaded successfully.")]
    #[case(Verb::Created, "Activity created successfully.")]
    #[case(Verb::Deleted, "Activity deleted successfully.")]
    fn fallback_messages_name_the_entity(#[case] verb: Verb, #[case] expected: &str) {
        assert_eq!(Action::new("Activity", verb).fallback_message(), expected);
    }

    #[rstest]
    fn null_data_decodes_as_absent() {
        let action = Action::new("Coupon", Verb::Loaded);
        let decoded: Option<Vec<String>> =
            decode_data(action, Some(Value::Null)).expect("null is absent");
        assert!(decoded.is_none());
    }

    #[rstest]
    fn mismatched_data_is_an_invalid_response() {
        let action = Action::new("Coupon", Verb::Loaded);
        let error = decode_data::<Vec<String>>(action, Some(Value::Bool(true)))
            .expect_err("bool is not a list");
        assert_eq!(error.code(), ErrorCode::InvalidResponse);
    }
}
