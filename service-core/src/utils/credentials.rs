use subtle::ConstantTimeEq;

/// Compare a submitted secret against the expected one in constant time.
///
/// Length mismatches return early; only the contents are compared in
/// constant time.
pub fn secrets_match(expected: &str, submitted: &str) -> bool {
    let expected_bytes = expected.as_bytes();
    let submitted_bytes = submitted.as_bytes();

    if expected_bytes.len() != submitted_bytes.len() {
        return false;
    }

    expected_bytes.ct_eq(submitted_bytes).into()
}

/// Verify a username/password pair against the configured pair.
///
/// Both halves are always compared so a wrong username costs the same as a
/// wrong password.
pub fn verify_credentials(
    expected_user: &str,
    expected_pass: &str,
    username: &str,
    password: &str,
) -> bool {
    let user_ok = secrets_match(expected_user, username);
    let pass_ok = secrets_match(expected_pass, password);
    user_ok & pass_ok
}
