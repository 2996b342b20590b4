//! Registrations slice. Holds whatever set the last query returned, not the
//! full collection.

use serde::Serialize;

use crate::models::{Id, Registration};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationsOp {
    Fetch,
    Register,
    Cancel,
}

impl RegistrationsOp {
    const fn prefix(self) -> &'static str {
        match self {
            Self::Fetch => "registrations/fetchRegistrations",
            Self::Register => "registrations/registerForEvent",
            Self::Cancel => "registrations/cancelRegistration",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationsAction {
    Started(RegistrationsOp),
    Failed(RegistrationsOp, String),
    Fetched(Vec<Registration>),
    Registered(Registration),
    Cancelled(Id),
}

impl RegistrationsAction {
    pub fn name(&self) -> String {
        match self {
            Self::Started(op) => format!("{}Start", op.prefix()),
            Self::Failed(op, _) => format!("{}Failure", op.prefix()),
            Self::Fetched(_) => format!("{}Success", RegistrationsOp::Fetch.prefix()),
            Self::Registered(_) => format!("{}Success", RegistrationsOp::Register.prefix()),
            Self::Cancelled(_) => format!("{}Success", RegistrationsOp::Cancel.prefix()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistrationsState {
    pub registrations: Vec<Registration>,
    pub loading: bool,
    pub error: Option<String>,
}

impl RegistrationsState {
    #[must_use]
    pub fn reduce(mut self, action: &RegistrationsAction) -> Self {
        match action {
            RegistrationsAction::Started(_) => {
                self.loading = true;
                self.error = None;
                return self;
            }
            RegistrationsAction::Failed(_, message) => {
                self.error = Some(message.clone());
            }
            RegistrationsAction::Fetched(registrations) => {
                self.registrations.clone_from(registrations);
            }
            RegistrationsAction::Registered(registration) => {
                self.registrations.push(registration.clone());
            }
            RegistrationsAction::Cancelled(id) => {
                self.registrations.retain(|r| &r.id != id);
            }
        }
        self.loading = false;
        self
    }
}
