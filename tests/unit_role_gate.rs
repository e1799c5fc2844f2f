use cohortly::middleware::auth::AuthUser;
use cohortly::middleware::role::{STAFF, STUDENT_ONLY, TEACHER_ONLY, TEACHING_STAFF, check_any_role};
use cohortly::modules::auth::model::Claims;
use cohortly::modules::users::model::Role;

const ALL_ROLES: &[Role] = &[Role::Superadmin, Role::Admin, Role::Teacher, Role::Student];

fn auth_user(role: Role) -> AuthUser {
    AuthUser(Claims {
        sub: Some(1),
        role: role.as_str().to_string(),
        exp: 9999999999,
        iat: 1234567890,
    })
}

/// For each declared allowed-role set, every member passes and every other
/// role is rejected.
#[test]
fn test_role_gate_matrix() {
    let sets: &[&[Role]] = &[STAFF, TEACHING_STAFF, TEACHER_ONLY, STUDENT_ONLY];

    for allowed in sets {
        for role in ALL_ROLES {
            let result = check_any_role(&auth_user(*role), allowed);
            if allowed.contains(role) {
                assert!(result.is_ok(), "{role} should pass {allowed:?}");
                assert_eq!(result.unwrap(), *role);
            } else {
                assert!(result.is_err(), "{role} should be rejected by {allowed:?}");
            }
        }
    }
}

#[test]
fn test_staff_set_excludes_teaching_roles() {
    assert!(check_any_role(&auth_user(Role::Teacher), STAFF).is_err());
    assert!(check_any_role(&auth_user(Role::Student), STAFF).is_err());
}

#[test]
fn test_teaching_staff_includes_admins_and_teachers() {
    assert!(check_any_role(&auth_user(Role::Superadmin), TEACHING_STAFF).is_ok());
    assert!(check_any_role(&auth_user(Role::Admin), TEACHING_STAFF).is_ok());
    assert!(check_any_role(&auth_user(Role::Teacher), TEACHING_STAFF).is_ok());
    assert!(check_any_role(&auth_user(Role::Student), TEACHING_STAFF).is_err());
}

/// Approval capability is narrower than the staff gate: only superadmins
/// may approve a user into the admin role.
#[test]
fn test_approval_capability_is_narrower_than_staff_gate() {
    assert!(Role::Superadmin.can_approve_into(Role::Admin));
    assert!(!Role::Admin.can_approve_into(Role::Admin));

    for approver in [Role::Superadmin, Role::Admin] {
        assert!(approver.can_approve_into(Role::Teacher));
        assert!(approver.can_approve_into(Role::Student));
        assert!(!approver.can_approve_into(Role::Superadmin));
    }
}

#[test]
fn test_unknown_role_string_never_passes() {
    let impostor = AuthUser(Claims {
        sub: Some(1),
        role: "root".to_string(),
        exp: 9999999999,
        iat: 1234567890,
    });

    for allowed in [STAFF, TEACHING_STAFF, TEACHER_ONLY, STUDENT_ONLY] {
        assert!(check_any_role(&impostor, allowed).is_err());
    }
}
