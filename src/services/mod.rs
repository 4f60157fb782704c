pub mod invitations;
pub mod membership;
pub mod security;
pub mod settings;

pub use invitations::{InvalidReason, InvitationOptions, InvitationService, TokenStatus};
pub use membership::{Applicant, MembershipService, SignupOutcome};
pub use security::*;
