use crate::error::RemovalError;
use crate::removal::RemovalOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Delete,
    Connect,
}

impl Operation {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "CREATE",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
            Operation::Connect => "CONNECT",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The parts of an admission request the gate looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionRequest {
    pub uid: String,
    pub operation: Operation,
    /// Kind of the target object, e.g. `Pod`.
    pub kind: String,
    pub name: String,
    pub namespace: Option<String>,
    pub username: Option<String>,
    pub groups: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Decision::Allow => "allow",
            Decision::Deny => "deny",
        }
    }
}

/// Why the gate decided the way it did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Not a pod deletion.
    PassThrough,
    /// Requested by a member of the reserved group.
    ReservedGroup,
    Removed(RemovalOutcome),
    Blocked(RemovalError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub decision: Decision,
    pub verdict: Verdict,
}

impl Evaluation {
    pub fn allow(verdict: Verdict) -> Self {
        Self {
            decision: Decision::Allow,
            verdict,
        }
    }

    pub fn deny(error: RemovalError) -> Self {
        Self {
            decision: Decision::Deny,
            verdict: Verdict::Blocked(error),
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.decision.is_allowed()
    }

    /// Human-readable detail for the admission response, if any.
    pub fn message(&self) -> Option<String> {
        match &self.verdict {
            Verdict::Blocked(e) => Some(format!("graceful member removal failed: {}", e)),
            Verdict::Removed(outcome) => outcome
                .cleanup_error()
                .map(|e| format!("member removed; {}", e)),
            _ => None,
        }
    }
}
