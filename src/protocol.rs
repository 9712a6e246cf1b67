//! The wire protocol table: one entry per manager operation.
//!
//! [`classify`] is the single source of truth for mapping a response status
//! to a domain outcome. It is pure data over `(operation, status)` so the
//! whole vocabulary can be audited and tested without any I/O.

use reqwest::{Method, StatusCode};

use crate::error::ClientError;

/// The operations this client performs against the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operation {
    /// `DELETE /admin/templates`
    ResetAllTracking,
    /// `POST /templates`
    InitializeTemplate,
    /// `PUT /templates/{hash}`
    FinalizeTemplate,
    /// `DELETE /templates/{hash}`
    DiscardTemplate,
    /// `GET /templates/{hash}/tests`
    GetTestDatabase,
    /// `DELETE /templates/{hash}/tests/{id}`
    ReturnTestDatabase,
}

impl Operation {
    /// HTTP method for this operation.
    pub(crate) fn method(self) -> Method {
        match self {
            Self::ResetAllTracking => Method::DELETE,
            Self::InitializeTemplate => Method::POST,
            Self::FinalizeTemplate => Method::PUT,
            Self::DiscardTemplate => Method::DELETE,
            Self::GetTestDatabase => Method::GET,
            Self::ReturnTestDatabase => Method::DELETE,
        }
    }
}

/// Map a response status to the domain outcome for one operation.
///
/// `Ok(())` means the documented success status for that operation; every
/// documented error status maps to its error kind, and anything else is
/// [`ClientError::UnexpectedStatus`]. [`Operation::ResetAllTracking`] is
/// not covered here: its failure carries the response body as diagnostic
/// text, which a pure status table cannot supply.
pub(crate) fn classify(op: Operation, status: StatusCode) -> Result<(), ClientError> {
    match (op, status.as_u16()) {
        (Operation::InitializeTemplate, 200) => Ok(()),
        (Operation::InitializeTemplate, 423) => Err(ClientError::TemplateAlreadyInitialized),
        (Operation::InitializeTemplate, 503) => Err(ClientError::ManagerNotReady),

        (Operation::FinalizeTemplate, 204) => Ok(()),
        (Operation::FinalizeTemplate, 404) => Err(ClientError::TemplateNotFound),
        (Operation::FinalizeTemplate, 503) => Err(ClientError::ManagerNotReady),

        (Operation::DiscardTemplate, 204) => Ok(()),
        (Operation::DiscardTemplate, 404) => Err(ClientError::TemplateNotFound),
        (Operation::DiscardTemplate, 503) => Err(ClientError::ManagerNotReady),

        (Operation::GetTestDatabase, 200) => Ok(()),
        (Operation::GetTestDatabase, 404) => Err(ClientError::TemplateNotFound),
        (Operation::GetTestDatabase, 410) => Err(ClientError::DatabaseDiscarded),
        (Operation::GetTestDatabase, 503) => Err(ClientError::ManagerNotReady),

        // The manager reports a missing test instance with the same 404 as
        // a missing template, so both map to TemplateNotFound.
        (Operation::ReturnTestDatabase, 204) => Ok(()),
        (Operation::ReturnTestDatabase, 404) => Err(ClientError::TemplateNotFound),
        (Operation::ReturnTestDatabase, 503) => Err(ClientError::ManagerNotReady),

        _ => Err(ClientError::UnexpectedStatus { status }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_outcomes() {
        assert!(classify(Operation::InitializeTemplate, StatusCode::OK).is_ok());
        assert!(matches!(
            classify(Operation::InitializeTemplate, StatusCode::LOCKED),
            Err(ClientError::TemplateAlreadyInitialized)
        ));
        assert!(matches!(
            classify(Operation::InitializeTemplate, StatusCode::SERVICE_UNAVAILABLE),
            Err(ClientError::ManagerNotReady)
        ));
    }

    #[test]
    fn finalize_and_discard_share_a_vocabulary() {
        for op in [Operation::FinalizeTemplate, Operation::DiscardTemplate] {
            assert!(classify(op, StatusCode::NO_CONTENT).is_ok());
            assert!(matches!(
                classify(op, StatusCode::NOT_FOUND),
                Err(ClientError::TemplateNotFound)
            ));
            assert!(matches!(
                classify(op, StatusCode::SERVICE_UNAVAILABLE),
                Err(ClientError::ManagerNotReady)
            ));
        }
    }

    #[test]
    fn get_test_database_distinguishes_gone_from_not_found() {
        assert!(matches!(
            classify(Operation::GetTestDatabase, StatusCode::NOT_FOUND),
            Err(ClientError::TemplateNotFound)
        ));
        assert!(matches!(
            classify(Operation::GetTestDatabase, StatusCode::GONE),
            Err(ClientError::DatabaseDiscarded)
        ));
    }

    #[test]
    fn return_test_database_maps_not_found_to_template_not_found() {
        assert!(classify(Operation::ReturnTestDatabase, StatusCode::NO_CONTENT).is_ok());
        assert!(matches!(
            classify(Operation::ReturnTestDatabase, StatusCode::NOT_FOUND),
            Err(ClientError::TemplateNotFound)
        ));
    }

    #[test]
    fn undocumented_statuses_carry_the_raw_code() {
        let err = classify(Operation::InitializeTemplate, StatusCode::IM_A_TEAPOT).unwrap_err();
        match err {
            ClientError::UnexpectedStatus { status } => {
                assert_eq!(status, StatusCode::IM_A_TEAPOT);
            }
            other => panic!("expected UnexpectedStatus, got {other:?}"),
        }
    }

    #[test]
    fn success_status_of_one_operation_is_unexpected_for_another() {
        // 200 is success for get, but finalize only succeeds on 204.
        assert!(matches!(
            classify(Operation::FinalizeTemplate, StatusCode::OK),
            Err(ClientError::UnexpectedStatus { .. })
        ));
        assert!(matches!(
            classify(Operation::GetTestDatabase, StatusCode::NO_CONTENT),
            Err(ClientError::UnexpectedStatus { .. })
        ));
    }

    #[test]
    fn methods_match_the_endpoint_table() {
        assert_eq!(Operation::ResetAllTracking.method(), Method::DELETE);
        assert_eq!(Operation::InitializeTemplate.method(), Method::POST);
        assert_eq!(Operation::FinalizeTemplate.method(), Method::PUT);
        assert_eq!(Operation::DiscardTemplate.method(), Method::DELETE);
        assert_eq!(Operation::GetTestDatabase.method(), Method::GET);
        assert_eq!(Operation::ReturnTestDatabase.method(), Method::DELETE);
    }
}
