//! Role-based access policy.
//!
//! Every route handler checks capabilities through this table instead of
//! matching on roles inline, so the whole policy is auditable in one place.
//! Admin inherits everything staff can do.

use crate::models::user::UserRole;

/// Actions that require a role check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    // Student-facing
    RegisterCourse,
    CancelOwnRegistration,
    ViewOwnRegistrations,
    RegisterActivity,
    UseWallet,
    Checkout,
    // Staff
    ApproveParticipation,
    ConfirmParticipation,
    ManageRegistrations,
    ViewDashboard,
    // Admin
    ManageSemesters,
    ManageCatalog,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::RegisterCourse => "register_course",
            Capability::CancelOwnRegistration => "cancel_own_registration",
            Capability::ViewOwnRegistrations => "view_own_registrations",
            Capability::RegisterActivity => "register_activity",
            Capability::UseWallet => "use_wallet",
            Capability::Checkout => "checkout",
            Capability::ApproveParticipation => "approve_participation",
            Capability::ConfirmParticipation => "confirm_participation",
            Capability::ManageRegistrations => "manage_registrations",
            Capability::ViewDashboard => "view_dashboard",
            Capability::ManageSemesters => "manage_semesters",
            Capability::ManageCatalog => "manage_catalog",
        }
    }
}

/// Returns true when `role` may perform `capability`.
pub fn is_allowed(role: UserRole, capability: Capability) -> bool {
    use Capability::*;
    match role {
        UserRole::Student => matches!(
            capability,
            RegisterCourse
                | CancelOwnRegistration
                | ViewOwnRegistrations
                | RegisterActivity
                | UseWallet
                | Checkout
        ),
        UserRole::Teacher => matches!(capability, ViewOwnRegistrations),
        UserRole::Staff => matches!(
            capability,
            ApproveParticipation | ConfirmParticipation | ManageRegistrations | ViewDashboard
        ),
        UserRole::Admin => !matches!(
            capability,
            RegisterCourse | CancelOwnRegistration | RegisterActivity | UseWallet | Checkout
        ),
    }
}

/// Error returned when a role lacks a capability.
#[derive(Debug, Clone, thiserror::Error)]
#[error("role {role} may not {action}", role = .role.as_str(), action = .capability.as_str())]
pub struct AccessDenied {
    pub role: UserRole,
    pub capability: Capability,
}

/// Checks the policy table, producing an error suitable for a 403.
pub fn ensure(role: UserRole, capability: Capability) -> Result<(), AccessDenied> {
    if is_allowed(role, capability) {
        Ok(())
    } else {
        Err(AccessDenied { role, capability })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_capabilities() {
        assert!(is_allowed(UserRole::Student, Capability::RegisterCourse));
        assert!(is_allowed(UserRole::Student, Capability::Checkout));
        assert!(is_allowed(UserRole::Student, Capability::UseWallet));
        assert!(!is_allowed(UserRole::Student, Capability::ApproveParticipation));
        assert!(!is_allowed(UserRole::Student, Capability::ViewDashboard));
        assert!(!is_allowed(UserRole::Student, Capability::ManageSemesters));
    }

    #[test]
    fn test_staff_capabilities() {
        assert!(is_allowed(UserRole::Staff, Capability::ApproveParticipation));
        assert!(is_allowed(UserRole::Staff, Capability::ConfirmParticipation));
        assert!(is_allowed(UserRole::Staff, Capability::ManageRegistrations));
        assert!(is_allowed(UserRole::Staff, Capability::ViewDashboard));
        assert!(!is_allowed(UserRole::Staff, Capability::ManageSemesters));
        assert!(!is_allowed(UserRole::Staff, Capability::RegisterCourse));
    }

    #[test]
    fn test_admin_inherits_staff_but_not_student_actions() {
        assert!(is_allowed(UserRole::Admin, Capability::ApproveParticipation));
        assert!(is_allowed(UserRole::Admin, Capability::ViewDashboard));
        assert!(is_allowed(UserRole::Admin, Capability::ManageSemesters));
        assert!(is_allowed(UserRole::Admin, Capability::ManageCatalog));
        // Admins do not hold wallets or course seats.
        assert!(!is_allowed(UserRole::Admin, Capability::RegisterCourse));
        assert!(!is_allowed(UserRole::Admin, Capability::Checkout));
    }

    #[test]
    fn test_ensure_error_message() {
        let err = ensure(UserRole::Student, Capability::ViewDashboard).unwrap_err();
        assert_eq!(err.to_string(), "role student may not view_dashboard");
    }
}
