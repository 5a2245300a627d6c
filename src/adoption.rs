//! Adoption-request state machine
//!
//! `pending` is the only live state; `accepted` and `rejected` are
//! terminal. Only the stored owner of the request may decide it, and the
//! decision is a compare-and-swap on the `pending` state so concurrent
//! accept/reject of the same request cannot both win.
//!
//! Accepting is a two-document operation: the request flips to `accepted`
//! and the referenced animal to `in_progress`. The two writes form a saga:
//! if the animal write fails, the request is compensated back to `pending`
//! and the caller gets a retryable error. "Accepted but animal untouched"
//! is never an observable terminal state.

use bson::{doc, oid::ObjectId};
use tracing::{error, info, warn};

use crate::db::schemas::{
    AdoptionRequestDoc, AdoptionStatus, AnimalDoc, AnimalStatus,
};
use crate::db::MongoCollection;
use crate::error::RefugeError;

/// Decision applied to a pending request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdoptionAction {
    Accept,
    Reject,
}

impl AdoptionAction {
    /// Parse from the wire form (`{"action": "accept"}`)
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "accept" => Some(AdoptionAction::Accept),
            "reject" => Some(AdoptionAction::Reject),
            _ => None,
        }
    }

    fn target(&self) -> AdoptionStatus {
        match self {
            AdoptionAction::Accept => AdoptionStatus::Accepted,
            AdoptionAction::Reject => AdoptionStatus::Rejected,
        }
    }
}

/// Guard table for a transition attempt.
///
/// Ownership is checked before state: a non-owner probing a foreign
/// request learns nothing about its state.
pub(crate) fn check_transition(
    request: &AdoptionRequestDoc,
    caller_id: ObjectId,
) -> Result<(), RefugeError> {
    if request.owner_id != caller_id {
        return Err(RefugeError::Authorization(
            "only the animal's owner may decide this request".into(),
        ));
    }

    match request.status {
        AdoptionStatus::Pending => Ok(()),
        AdoptionStatus::Accepted => Err(RefugeError::Conflict(
            "request is already accepted".into(),
        )),
        AdoptionStatus::Rejected => Err(RefugeError::Conflict(
            "request is already rejected".into(),
        )),
    }
}

/// Apply a decision to a request.
///
/// Returns the post-transition request document.
pub async fn transition(
    requests: &MongoCollection<AdoptionRequestDoc>,
    animals: &MongoCollection<AnimalDoc>,
    caller_id: ObjectId,
    request_id: ObjectId,
    action: AdoptionAction,
) -> Result<AdoptionRequestDoc, RefugeError> {
    let request = requests
        .find_by_id(request_id)
        .await?
        .ok_or_else(|| RefugeError::NotFound(format!("adoption request {}", request_id.to_hex())))?;

    check_transition(&request, caller_id)?;

    // CAS: the update only lands if the request is still pending and still
    // owned by the caller. A miss means a concurrent decision won.
    let target = action.target();
    let updated = requests
        .find_one_and_update(
            doc! {
                "_id": request_id,
                "owner_id": caller_id,
                "status": AdoptionStatus::Pending.as_str(),
                "metadata.is_deleted": { "$ne": true },
            },
            doc! { "$set": { "status": target.as_str() } },
        )
        .await?
        .ok_or_else(|| {
            RefugeError::Conflict("request was decided concurrently".into())
        })?;

    info!(
        request = %request_id.to_hex(),
        animal = %updated.animal_id.to_hex(),
        status = target.as_str(),
        "adoption request decided"
    );

    if action == AdoptionAction::Accept {
        if let Err(err) = mark_animal_in_progress(animals, updated.animal_id).await {
            compensate(requests, request_id).await;
            return Err(err);
        }
    }

    Ok(updated)
}

/// Second half of the accept saga: move the animal to `in_progress`.
async fn mark_animal_in_progress(
    animals: &MongoCollection<AnimalDoc>,
    animal_id: ObjectId,
) -> Result<(), RefugeError> {
    let result = animals
        .update_one(
            doc! { "_id": animal_id, "metadata.is_deleted": { "$ne": true } },
            doc! { "$set": { "status": AnimalStatus::InProgress.as_str() } },
        )
        .await?;

    if result.matched_count == 0 {
        return Err(RefugeError::DataIntegrity(format!(
            "accepted request references missing animal {}",
            animal_id.to_hex()
        )));
    }

    Ok(())
}

/// Compensating action: roll the request back to `pending` so the caller
/// can retry the whole accept.
async fn compensate(requests: &MongoCollection<AdoptionRequestDoc>, request_id: ObjectId) {
    warn!(
        request = %request_id.to_hex(),
        "animal update failed, rolling request back to pending"
    );

    match requests
        .update_one(
            doc! { "_id": request_id },
            doc! { "$set": { "status": AdoptionStatus::Pending.as_str() } },
        )
        .await
    {
        Ok(_) => {}
        Err(err) => {
            // Both halves failed; the request is stuck in `accepted` with
            // an untouched animal. Loud log so the incident is actionable;
            // the caller still receives the original error, never success.
            error!(
                request = %request_id.to_hex(),
                error = %err,
                "compensation failed: request left accepted without animal update"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schemas::Metadata;

    fn request(status: AdoptionStatus, owner: ObjectId) -> AdoptionRequestDoc {
        AdoptionRequestDoc {
            _id: Some(ObjectId::new()),
            metadata: Metadata::new(),
            requester_id: ObjectId::new(),
            owner_id: owner,
            animal_id: ObjectId::new(),
            message: String::new(),
            status,
        }
    }

    #[test]
    fn test_owner_may_decide_pending() {
        let owner = ObjectId::new();
        assert!(check_transition(&request(AdoptionStatus::Pending, owner), owner).is_ok());
    }

    #[test]
    fn test_non_owner_is_rejected_before_state_is_revealed() {
        let owner = ObjectId::new();
        let stranger = ObjectId::new();
        // Even on an already-accepted request, a stranger sees 403, not 409.
        let err = check_transition(&request(AdoptionStatus::Accepted, owner), stranger).unwrap_err();
        assert!(matches!(err, RefugeError::Authorization(_)));
    }

    #[test]
    fn test_re_deciding_terminal_request_is_conflict() {
        let owner = ObjectId::new();
        let err = check_transition(&request(AdoptionStatus::Accepted, owner), owner).unwrap_err();
        assert!(matches!(err, RefugeError::Conflict(_)));

        let err = check_transition(&request(AdoptionStatus::Rejected, owner), owner).unwrap_err();
        assert!(matches!(err, RefugeError::Conflict(_)));
    }

    #[test]
    fn test_action_parse() {
        assert_eq!(AdoptionAction::parse("accept"), Some(AdoptionAction::Accept));
        assert_eq!(AdoptionAction::parse("reject"), Some(AdoptionAction::Reject));
        assert_eq!(AdoptionAction::parse("cancel"), None);
    }

    #[test]
    fn test_action_targets() {
        assert_eq!(AdoptionAction::Accept.target(), AdoptionStatus::Accepted);
        assert_eq!(AdoptionAction::Reject.target(), AdoptionStatus::Rejected);
    }
}
