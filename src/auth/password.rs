use crate::error::{AppError, Result};

pub fn hash_password(password: &str) -> Result<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|_| AppError::InternalError)
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<()> {
    let matches = bcrypt::verify(password, password_hash)
        .map_err(|_| AppError::InternalError)?;

    if matches {
        Ok(())
    } else {
        Err(AppError::Unauthorized("Invalid credentials".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("hunter2!").unwrap();
        assert!(verify_password("hunter2!", &hash).is_ok());
        assert!(verify_password("hunter3!", &hash).is_err());
    }
}
