pub mod phone_validation;
pub use phone_validation::validate_phone_number;

/// Cap for upstream error bodies kept in errors and logs
pub const MAX_ERROR_BODY_LEN: usize = 500;

/// Truncate an upstream error body to [`MAX_ERROR_BODY_LEN`] bytes.
///
/// Cuts on a char boundary so multi-byte text never panics.
pub fn cap_error_body(body: String) -> String {
    if body.len() <= MAX_ERROR_BODY_LEN {
        return body;
    }

    let mut end = MAX_ERROR_BODY_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated)", &body[..end])
}
