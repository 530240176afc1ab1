use tally_core::error::{TallyError, TallyResult};

pub(crate) fn non_empty(field: &str, value: &str) -> TallyResult<()> {
    if value.trim().is_empty() {
        return Err(TallyError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Expects an already-normalized email.
pub(crate) fn email(value: &str) -> TallyResult<()> {
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(TallyError::validation(format!("invalid email: {value}"))),
    }
}
