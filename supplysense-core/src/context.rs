use crate::SupplySenseError;

/// The user on whose behalf an operation runs.
///
/// Every store read and write is filtered by this id, so it is passed
/// explicitly into each operation instead of living in shared state.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UserContext {
    user_id: String,
}

impl UserContext {
    pub fn new(user_id: impl Into<String>) -> Result<Self, SupplySenseError> {
        let user_id = user_id.into();
        if user_id.trim().is_empty() {
            return Err(SupplySenseError::InvalidRequest(
                "userId is required".to_string(),
            ));
        }
        Ok(Self { user_id })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_user_id_is_rejected() {
        let err = UserContext::new("   ").unwrap_err();
        assert_eq!(err.to_string(), "Invalid request: userId is required");
    }

    #[test]
    fn user_id_is_kept_verbatim() {
        let ctx = UserContext::new("user-1").unwrap();
        assert_eq!(ctx.user_id(), "user-1");
    }
}
